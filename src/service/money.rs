use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Split `total_minor` into `parts` amounts that differ by at most one
/// minor unit and sum back to `total_minor`. Earlier parts receive the
/// remainder. Zero parts yields an empty split.
pub fn distribute_money(total_minor: i64, parts: usize) -> Vec<i64> {
    if parts == 0 {
        return Vec::new();
    }

    let divisor = parts as i64;
    let base = total_minor.div_euclid(divisor);
    let remainder = total_minor.rem_euclid(divisor) as usize;

    (0..parts).map(|index| if index < remainder { base + 1 } else { base }).collect()
}

/// Convert an amount with `rate`, rounding half away from zero to whole
/// minor units. Results outside the `i64` range saturate.
pub fn convert_money(amount_minor: i64, rate: Decimal) -> i64 {
    let saturated = || if (amount_minor < 0) != rate.is_sign_negative() { i64::MIN } else { i64::MAX };

    match Decimal::from(amount_minor).checked_mul(rate) {
        Some(product) => product
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or_else(saturated),
        None => saturated(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn distribute_gives_remainder_to_first_parts() {
        assert_eq!(distribute_money(100, 3), vec![34, 33, 33]);
        assert_eq!(distribute_money(10000, 3), vec![3334, 3333, 3333]);
        assert_eq!(distribute_money(101, 3), vec![34, 34, 33]);
    }

    #[test]
    fn distribute_zero_total() {
        assert_eq!(distribute_money(0, 3), vec![0, 0, 0]);
    }

    #[test]
    fn distribute_zero_parts_is_empty() {
        assert!(distribute_money(500, 0).is_empty());
    }

    #[test]
    fn distribute_negative_total_keeps_sum() {
        let parts = distribute_money(-100, 3);
        assert_eq!(parts.iter().sum::<i64>(), -100);
    }

    #[test]
    fn convert_rounds_half_away_from_zero() {
        assert_eq!(convert_money(10000, dec!(0.92)), 9200);
        assert_eq!(convert_money(5, dec!(0.5)), 3);
        assert_eq!(convert_money(-5, dec!(0.5)), -3);
        assert_eq!(convert_money(1, dec!(0.49)), 0);
    }

    #[test]
    fn convert_with_inverse_rate() {
        let inverse = Decimal::ONE / dec!(0.92);
        assert_eq!(convert_money(9200, inverse), 10000);
    }

    #[test]
    fn convert_saturates_on_overflow() {
        assert_eq!(convert_money(i64::MAX, dec!(2)), i64::MAX);
        assert_eq!(convert_money(i64::MIN, dec!(2)), i64::MIN);
        assert_eq!(convert_money(i64::MAX, dec!(-2)), i64::MIN);
    }

    proptest! {
        #[test]
        fn distribute_preserves_total_and_fairness(total in 0i64..1_000_000_000_000, parts in 1usize..64) {
            let split = distribute_money(total, parts);
            prop_assert_eq!(split.len(), parts);
            prop_assert_eq!(split.iter().sum::<i64>(), total);

            let max = split.iter().copied().max().unwrap_or_default();
            let min = split.iter().copied().min().unwrap_or_default();
            prop_assert!(max - min <= 1);
            prop_assert!(split.windows(2).all(|pair| pair[0] >= pair[1]));
        }

        #[test]
        fn convert_is_within_half_a_unit(amount in -1_000_000_000i64..1_000_000_000, rate_millis in 1i64..100_000) {
            let rate = Decimal::new(rate_millis, 3);
            let exact = Decimal::from(amount) * rate;
            let converted = Decimal::from(convert_money(amount, rate));
            prop_assert!((converted - exact).abs() <= dec!(0.5));
        }
    }
}
