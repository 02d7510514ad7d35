use crate::models::transfer::Transfer;
use rust_decimal::Decimal;
use std::cmp::Ordering;

fn recency(a: &Transfer, b: &Transfer) -> Ordering {
    a.effective_at
        .cmp(&b.effective_at)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

fn latest_between<'t>(transfers: &'t [Transfer], from: &str, to: &str) -> Option<&'t Transfer> {
    transfers
        .iter()
        .filter(|t| t.from_currency.eq_ignore_ascii_case(from) && t.to_currency.eq_ignore_ascii_case(to))
        .max_by(|a, b| recency(a, b))
}

/// Rate to turn `source` amounts into `target` amounts, taken from the
/// user's most recent transfer between the two.
///
/// A transfer in the requested direction wins over the inverse of a
/// transfer in the opposite direction, regardless of which is newer.
/// Returns `None` when the pair was never transferred.
pub fn resolve_rate(transfers: &[Transfer], source: &str, target: &str) -> Option<Decimal> {
    if source.eq_ignore_ascii_case(target) {
        return Some(Decimal::ONE);
    }

    if let Some(direct) = latest_between(transfers, source, target) {
        return Some(direct.manual_rate);
    }

    latest_between(transfers, target, source).and_then(|inverse| Decimal::ONE.checked_div(inverse.manual_rate))
}
