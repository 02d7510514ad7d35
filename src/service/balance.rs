use crate::database::preferences::PreferencesRepository;
use crate::database::transaction::TransactionRepository;
use crate::database::transfer::TransferRepository;
use crate::error::app_error::AppError;
use crate::models::balance::{BucketBalances, ConvertedTotal, CurrencyBalance};
use crate::models::bucket::Bucket;
use crate::models::transaction::{Transaction, TransactionFilter};
use crate::models::transfer::Transfer;
use crate::service::exchange_rate::resolve_rate;
use crate::service::money::convert_money;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use uuid::Uuid;

type Ledger = BTreeMap<String, i64>;

fn post(ledger: &mut Ledger, currency: &str, amount: i64) {
    let entry = ledger.entry(currency.trim().to_ascii_uppercase()).or_insert(0);
    *entry = entry.saturating_add(amount);
}

fn visible_balances(ledger: Ledger, hidden: &BTreeSet<String>) -> Vec<CurrencyBalance> {
    ledger
        .into_iter()
        .filter(|(code, balance)| *balance != 0 && !hidden.contains(code))
        .map(|(currency_code, balance_minor)| CurrencyBalance { currency_code, balance_minor })
        .collect()
}

/// Per-bucket balances. Every bucket is present, in fixed order, even when
/// it has nothing to show. `hidden` must hold upper-cased codes.
pub fn bucket_balances(transactions: &[Transaction], transfers: &[Transfer], hidden: &BTreeSet<String>) -> Vec<BucketBalances> {
    let mut ledgers: BTreeMap<Bucket, Ledger> = Bucket::ALL.iter().map(|bucket| (*bucket, Ledger::new())).collect();

    for transaction in transactions {
        let ledger = ledgers.entry(transaction.bucket).or_default();
        post(ledger, &transaction.currency_code, transaction.signed_amount());
    }

    for transfer in transfers {
        let ledger = ledgers.entry(transfer.bucket).or_default();
        post(ledger, &transfer.from_currency, -transfer.from_amount_minor);
        post(ledger, &transfer.to_currency, transfer.to_amount_minor);
    }

    Bucket::ALL
        .iter()
        .map(|bucket| BucketBalances {
            bucket: *bucket,
            balances: visible_balances(ledgers.remove(bucket).unwrap_or_default(), hidden),
        })
        .collect()
}

/// Balances per currency across all buckets.
pub fn overall_balances(transactions: &[Transaction], transfers: &[Transfer], hidden: &BTreeSet<String>) -> Vec<CurrencyBalance> {
    let mut ledger = Ledger::new();

    for transaction in transactions {
        post(&mut ledger, &transaction.currency_code, transaction.signed_amount());
    }

    for transfer in transfers {
        post(&mut ledger, &transfer.from_currency, -transfer.from_amount_minor);
        post(&mut ledger, &transfer.to_currency, transfer.to_amount_minor);
    }

    visible_balances(ledger, hidden)
}

/// Folds balances into `base_currency` using the latest transfer rates.
/// Currencies without a rate are added unconverted and reported in
/// `unconverted_currencies`.
pub fn converted_total(balances: &[CurrencyBalance], base_currency: &str, transfers: &[Transfer]) -> ConvertedTotal {
    let base_currency = base_currency.trim().to_ascii_uppercase();
    let mut total_minor: i64 = 0;
    let mut unconverted_currencies = Vec::new();

    for balance in balances {
        let converted = if balance.currency_code == base_currency {
            balance.balance_minor
        } else if let Some(rate) = resolve_rate(transfers, &balance.currency_code, &base_currency) {
            convert_money(balance.balance_minor, rate)
        } else {
            unconverted_currencies.push(balance.currency_code.clone());
            balance.balance_minor
        };
        total_minor = total_minor.saturating_add(converted);
    }

    ConvertedTotal {
        base_currency,
        total_minor,
        unconverted_currencies,
    }
}

pub struct BalanceService<'a, R> {
    repository: &'a R,
}

impl<'a, R> BalanceService<'a, R>
where
    R: TransactionRepository + TransferRepository + PreferencesRepository + Sync,
{
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    async fn load(&self, user_id: &Uuid) -> Result<(Vec<Transaction>, Vec<Transfer>), AppError> {
        let transactions = self.repository.list_transactions(&TransactionFilter::default(), user_id).await?;
        let transfers = self.repository.list_transfers(None, user_id).await?;
        debug!(
            user_id = %user_id,
            transactions = transactions.len(),
            transfers = transfers.len(),
            "Loaded records for balance aggregation"
        );
        Ok((transactions, transfers))
    }

    pub async fn bucket_balances(&self, user_id: &Uuid) -> Result<Vec<BucketBalances>, AppError> {
        let preferences = self.repository.get_or_create_preferences(user_id).await?;
        let (transactions, transfers) = self.load(user_id).await?;
        Ok(bucket_balances(&transactions, &transfers, &preferences.hidden_currencies()))
    }

    pub async fn overall_balances(&self, user_id: &Uuid) -> Result<Vec<CurrencyBalance>, AppError> {
        let preferences = self.repository.get_or_create_preferences(user_id).await?;
        let (transactions, transfers) = self.load(user_id).await?;
        Ok(overall_balances(&transactions, &transfers, &preferences.hidden_currencies()))
    }

    pub async fn converted_total(&self, user_id: &Uuid) -> Result<ConvertedTotal, AppError> {
        let preferences = self.repository.get_or_create_preferences(user_id).await?;
        let (transactions, transfers) = self.load(user_id).await?;
        let balances = overall_balances(&transactions, &transfers, &preferences.hidden_currencies());
        let total = converted_total(&balances, &preferences.base_currency, &transfers);

        if !total.unconverted_currencies.is_empty() {
            debug!(
                user_id = %user_id,
                base_currency = %total.base_currency,
                unconverted = ?total.unconverted_currencies,
                "No exchange rate for some currencies; added 1:1"
            );
        }

        Ok(total)
    }
}
