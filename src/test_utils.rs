use crate::database::currency::{CurrencyRepository, CurrencyUsage};
use crate::database::income_split::IncomeSplitRepository;
use crate::database::preferences::PreferencesRepository;
use crate::database::transaction::TransactionRepository;
use crate::database::transfer::TransferRepository;
use crate::error::app_error::AppError;
use crate::models::bucket::{Bucket, TransactionType};
use crate::models::category::{Category, DEFAULT_INCOME_CATEGORY};
use crate::models::currency::{Currency, CurrencyRequest, DEFAULT_BASE_CURRENCY};
use crate::models::preferences::{UserPreferences, encode_hidden_currencies};
use crate::models::transaction::{NewTransaction, Transaction, TransactionFilter};
use crate::models::transfer::{Transfer, TransferRequest};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

pub fn sample_transaction(bucket: Bucket, transaction_type: TransactionType, amount_minor: i64, currency_code: &str) -> Transaction {
    let at = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
    Transaction {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        category_id: Uuid::new_v4(),
        bucket,
        transaction_type,
        amount_minor,
        currency_code: currency_code.to_string(),
        effective_at: at,
        note: None,
        created_at: at,
        updated_at: at,
    }
}

pub fn sample_transfer(from: &str, to: &str, from_amount_minor: i64, to_amount_minor: i64, manual_rate: Decimal) -> Transfer {
    let at = Utc.with_ymd_and_hms(2025, 1, 20, 12, 0, 0).unwrap();
    Transfer {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        bucket: Bucket::Personal,
        from_currency: from.to_string(),
        to_currency: to.to_string(),
        from_amount_minor,
        to_amount_minor,
        manual_rate,
        effective_at: at,
        note: None,
        created_at: at,
    }
}

pub fn sample_category(user_id: &Uuid, bucket: Bucket, name: &str, category_type: TransactionType) -> Category {
    Category {
        id: Uuid::new_v4(),
        user_id: *user_id,
        bucket,
        name: name.to_string(),
        category_type,
        created_at: Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap(),
    }
}

#[derive(Default)]
struct MockState {
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
    transfers: Vec<Transfer>,
    currencies: Vec<Currency>,
    preferences: HashMap<Uuid, UserPreferences>,
    fail_next_insert: bool,
}

impl MockState {
    fn preferences_for(&mut self, user_id: &Uuid) -> &mut UserPreferences {
        self.preferences.entry(*user_id).or_insert_with(|| {
            let now = Utc::now();
            UserPreferences {
                user_id: *user_id,
                base_currency: DEFAULT_BASE_CURRENCY.to_string(),
                hidden_currencies: None,
                created_at: now,
                updated_at: now,
            }
        })
    }

    fn owns_category(&self, category_id: &Uuid, user_id: &Uuid) -> bool {
        self.categories.iter().any(|c| c.id == *category_id && c.user_id == *user_id)
    }
}

fn materialize(draft: &NewTransaction, user_id: &Uuid) -> Transaction {
    let now = Utc::now();
    Transaction {
        id: Uuid::new_v4(),
        user_id: *user_id,
        category_id: draft.category_id,
        bucket: draft.bucket,
        transaction_type: draft.transaction_type,
        amount_minor: draft.amount_minor,
        currency_code: draft.currency_code.clone(),
        effective_at: draft.effective_at,
        note: draft.note.clone(),
        created_at: now,
        updated_at: now,
    }
}

/// In-memory stand-in for `PostgresRepository`, scoped per user like the
/// real queries.
#[derive(Default)]
pub struct MockRepository {
    state: Mutex<MockState>,
}

impl MockRepository {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state lock")
    }

    pub fn push_transaction(&self, user_id: &Uuid, mut transaction: Transaction) {
        transaction.user_id = *user_id;
        self.state().transactions.push(transaction);
    }

    pub fn push_transfer(&self, user_id: &Uuid, mut transfer: Transfer) {
        transfer.user_id = *user_id;
        self.state().transfers.push(transfer);
    }

    pub fn push_category(&self, category: Category) {
        self.state().categories.push(category);
    }

    pub fn set_preferences(&self, user_id: &Uuid, base_currency: &str, hidden_currencies: Option<&str>) {
        let mut state = self.state();
        let preferences = state.preferences_for(user_id);
        preferences.base_currency = base_currency.to_string();
        preferences.hidden_currencies = hidden_currencies.map(str::to_string);
    }

    /// Makes the next atomic insert fail after its first row.
    pub fn fail_next_insert(&self) {
        self.state().fail_next_insert = true;
    }

    pub fn categories(&self) -> Vec<Category> {
        self.state().categories.clone()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state().transactions.clone()
    }
}

#[async_trait::async_trait]
impl TransactionRepository for MockRepository {
    async fn create_transaction(&self, draft: &NewTransaction, user_id: &Uuid) -> Result<Transaction, AppError> {
        let mut state = self.state();
        if !state.owns_category(&draft.category_id, user_id) {
            return Err(AppError::NotFound("Category not found".to_string()));
        }
        let transaction = materialize(draft, user_id);
        state.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn get_transaction_by_id(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<Transaction>, AppError> {
        Ok(self.state().transactions.iter().find(|t| t.id == *id && t.user_id == *user_id).cloned())
    }

    async fn list_transactions(&self, filter: &TransactionFilter, user_id: &Uuid) -> Result<Vec<Transaction>, AppError> {
        let mut transactions: Vec<Transaction> = self
            .state()
            .transactions
            .iter()
            .filter(|t| t.user_id == *user_id && filter.matches(t))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.effective_at.cmp(&a.effective_at));
        Ok(transactions)
    }

    async fn update_transaction(&self, id: &Uuid, draft: &NewTransaction, user_id: &Uuid) -> Result<Transaction, AppError> {
        let mut state = self.state();
        if !state.owns_category(&draft.category_id, user_id) {
            return Err(AppError::NotFound("Transaction or category not found".to_string()));
        }
        let existing = state
            .transactions
            .iter_mut()
            .find(|t| t.id == *id && t.user_id == *user_id)
            .ok_or_else(|| AppError::NotFound("Transaction or category not found".to_string()))?;

        let updated = Transaction {
            id: existing.id,
            created_at: existing.created_at,
            ..materialize(draft, user_id)
        };
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete_transaction(&self, id: &Uuid, user_id: &Uuid) -> Result<(), AppError> {
        let mut state = self.state();
        let before = state.transactions.len();
        state.transactions.retain(|t| !(t.id == *id && t.user_id == *user_id));
        if state.transactions.len() == before {
            return Err(AppError::NotFound("Transaction not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl TransferRepository for MockRepository {
    async fn create_transfer(&self, request: &TransferRequest, user_id: &Uuid) -> Result<Transfer, AppError> {
        let now = Utc::now();
        let transfer = Transfer {
            id: Uuid::new_v4(),
            user_id: *user_id,
            bucket: request.bucket,
            from_currency: request.from_currency.clone(),
            to_currency: request.to_currency.clone(),
            from_amount_minor: request.from_amount_minor,
            to_amount_minor: request.to_amount_minor,
            manual_rate: request.manual_rate,
            effective_at: request.effective_at.unwrap_or(now),
            note: request.note.clone(),
            created_at: now,
        };
        self.state().transfers.push(transfer.clone());
        Ok(transfer)
    }

    async fn list_transfers(&self, bucket: Option<Bucket>, user_id: &Uuid) -> Result<Vec<Transfer>, AppError> {
        Ok(self
            .state()
            .transfers
            .iter()
            .filter(|t| t.user_id == *user_id && bucket.is_none_or(|b| t.bucket == b))
            .cloned()
            .collect())
    }

    async fn delete_transfer(&self, id: &Uuid, user_id: &Uuid) -> Result<(), AppError> {
        let mut state = self.state();
        let before = state.transfers.len();
        state.transfers.retain(|t| !(t.id == *id && t.user_id == *user_id));
        if state.transfers.len() == before {
            return Err(AppError::NotFound("Transfer not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PreferencesRepository for MockRepository {
    async fn get_or_create_preferences(&self, user_id: &Uuid) -> Result<UserPreferences, AppError> {
        Ok(self.state().preferences_for(user_id).clone())
    }

    async fn update_base_currency(&self, base_currency: &str, user_id: &Uuid) -> Result<UserPreferences, AppError> {
        let mut state = self.state();
        let preferences = state.preferences_for(user_id);
        preferences.base_currency = base_currency.to_string();
        preferences.updated_at = Utc::now();
        Ok(preferences.clone())
    }

    async fn set_hidden_currencies(&self, hidden: &BTreeSet<String>, user_id: &Uuid) -> Result<UserPreferences, AppError> {
        let mut state = self.state();
        let preferences = state.preferences_for(user_id);
        preferences.hidden_currencies = Some(encode_hidden_currencies(hidden));
        preferences.updated_at = Utc::now();
        Ok(preferences.clone())
    }
}

#[async_trait::async_trait]
impl CurrencyRepository for MockRepository {
    async fn list_currencies(&self, user_id: &Uuid) -> Result<Vec<Currency>, AppError> {
        let mut currencies: Vec<Currency> = self.state().currencies.iter().filter(|c| c.user_id == *user_id).cloned().collect();
        currencies.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(currencies)
    }

    async fn get_currency_by_code(&self, code: &str, user_id: &Uuid) -> Result<Option<Currency>, AppError> {
        Ok(self.state().currencies.iter().find(|c| c.user_id == *user_id && c.code == code).cloned())
    }

    async fn create_currency(&self, request: &CurrencyRequest, user_id: &Uuid) -> Result<Currency, AppError> {
        let mut state = self.state();
        if state.currencies.iter().any(|c| c.user_id == *user_id && c.code == request.code) {
            return Err(AppError::Conflict("Currency already exists".to_string()));
        }
        let currency = Currency {
            id: Uuid::new_v4(),
            user_id: *user_id,
            code: request.code.clone(),
            name: request.name.clone(),
            symbol: request.symbol.clone(),
            created_at: Utc::now(),
        };
        state.currencies.push(currency.clone());
        Ok(currency)
    }

    async fn delete_currency(&self, code: &str, user_id: &Uuid) -> Result<(), AppError> {
        let mut state = self.state();
        let before = state.currencies.len();
        state.currencies.retain(|c| !(c.user_id == *user_id && c.code == code));
        if state.currencies.len() == before {
            return Err(AppError::NotFound("Currency not found".to_string()));
        }
        Ok(())
    }

    async fn currency_usage(&self, code: &str, user_id: &Uuid) -> Result<CurrencyUsage, AppError> {
        let state = self.state();
        let transactions = state
            .transactions
            .iter()
            .filter(|t| t.user_id == *user_id && t.currency_code == code)
            .count() as i64;
        let transfers = state
            .transfers
            .iter()
            .filter(|t| t.user_id == *user_id && (t.from_currency == code || t.to_currency == code))
            .count() as i64;
        Ok(CurrencyUsage { transactions, transfers })
    }
}

#[async_trait::async_trait]
impl IncomeSplitRepository for MockRepository {
    async fn income_category_for_bucket(&self, bucket: Bucket, user_id: &Uuid) -> Result<Category, AppError> {
        let mut state = self.state();
        let existing = state
            .categories
            .iter()
            .filter(|c| c.user_id == *user_id && c.bucket == bucket && c.category_type == TransactionType::Income)
            .min_by_key(|c| c.created_at)
            .cloned();

        if let Some(category) = existing {
            return Ok(category);
        }

        let category = Category {
            id: Uuid::new_v4(),
            user_id: *user_id,
            bucket,
            name: DEFAULT_INCOME_CATEGORY.to_string(),
            category_type: TransactionType::Income,
            created_at: Utc::now(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn create_transactions_atomically(&self, drafts: &[NewTransaction], user_id: &Uuid) -> Result<Vec<Transaction>, AppError> {
        let mut state = self.state();
        let mut staged = Vec::with_capacity(drafts.len());

        for (index, draft) in drafts.iter().enumerate() {
            if state.fail_next_insert && index > 0 {
                state.fail_next_insert = false;
                return Err(AppError::db("Simulated insert failure", sqlx::Error::PoolTimedOut));
            }
            if !state.owns_category(&draft.category_id, user_id) {
                return Err(AppError::NotFound("Category not found".to_string()));
            }
            staged.push(materialize(draft, user_id));
        }

        state.transactions.extend(staged.iter().cloned());
        Ok(staged)
    }
}
