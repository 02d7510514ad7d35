use crate::database::currency::CurrencyRepository;
use crate::database::preferences::PreferencesRepository;
use crate::error::app_error::AppError;
use crate::models::currency::{Currency, CurrencyRequest, CurrencyResponse, DEFAULT_CURRENCIES, is_default_currency, normalize_currency_code};
use std::collections::BTreeSet;
use tracing::info;
use uuid::Uuid;

/// What happened to a currency on delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyRemoval {
    Deleted,
    Hidden,
}

pub struct CurrencyService<'a, R> {
    repository: &'a R,
}

impl<'a, R> CurrencyService<'a, R>
where
    R: CurrencyRepository + PreferencesRepository + Sync,
{
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    pub async fn list_currencies(&self, user_id: &Uuid) -> Result<Vec<CurrencyResponse>, AppError> {
        let preferences = self.repository.get_or_create_preferences(user_id).await?;
        let custom = self.repository.list_currencies(user_id).await?;
        Ok(available_currencies(&custom, &preferences.hidden_currencies()))
    }

    pub async fn create_currency(&self, request: &CurrencyRequest, user_id: &Uuid) -> Result<CurrencyResponse, AppError> {
        if is_default_currency(&request.code) {
            return Err(AppError::Conflict("Currency code already exists in default currencies".to_string()));
        }

        if self.repository.get_currency_by_code(&request.code, user_id).await?.is_some() {
            return Err(AppError::Conflict("Currency already exists".to_string()));
        }

        let currency = self.repository.create_currency(request, user_id).await?;
        Ok(CurrencyResponse::from(&currency))
    }

    /// Deletes a custom currency or hides a default one. Either way the
    /// currency must not be referenced by any transaction or transfer.
    pub async fn remove_currency(&self, code: &str, user_id: &Uuid) -> Result<CurrencyRemoval, AppError> {
        let code = normalize_currency_code(code);

        let usage = self.repository.currency_usage(&code, user_id).await?;
        if usage.in_use() {
            return Err(AppError::Conflict(format!(
                "Currency {} is used in {} transaction(s) and {} transfer(s)",
                code, usage.transactions, usage.transfers
            )));
        }

        if is_default_currency(&code) {
            let preferences = self.repository.get_or_create_preferences(user_id).await?;
            let mut hidden = preferences.hidden_currencies();
            if hidden.insert(code.clone()) {
                self.repository.set_hidden_currencies(&hidden, user_id).await?;
            }
            info!(user_id = %user_id, currency = %code, "Hid default currency");
            return Ok(CurrencyRemoval::Hidden);
        }

        self.repository.delete_currency(&code, user_id).await?;
        info!(user_id = %user_id, currency = %code, "Deleted custom currency");
        Ok(CurrencyRemoval::Deleted)
    }
}

/// Defaults that are neither hidden nor overridden, followed by the
/// user's own currencies.
pub fn available_currencies(custom: &[Currency], hidden: &BTreeSet<String>) -> Vec<CurrencyResponse> {
    let custom_codes: BTreeSet<&str> = custom.iter().map(|c| c.code.as_str()).collect();

    DEFAULT_CURRENCIES
        .iter()
        .filter(|c| !custom_codes.contains(c.code) && !hidden.contains(c.code))
        .map(CurrencyResponse::from)
        .chain(custom.iter().map(CurrencyResponse::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bucket::{Bucket, TransactionType};
    use crate::test_utils::{MockRepository, sample_transaction};

    fn request(code: &str) -> CurrencyRequest {
        CurrencyRequest {
            code: code.to_string(),
            name: "Bitcoin".to_string(),
            symbol: "₿".to_string(),
        }
    }

    #[tokio::test]
    async fn lists_defaults_then_custom() {
        let user_id = Uuid::new_v4();
        let repository = MockRepository::default();
        let service = CurrencyService::new(&repository);
        service.create_currency(&request("BTC"), &user_id).await.unwrap();

        let currencies = service.list_currencies(&user_id).await.unwrap();
        assert_eq!(currencies.len(), 9);
        assert_eq!(currencies[0].code, "USD");
        assert!(currencies[0].is_default);
        let last = currencies.last().unwrap();
        assert_eq!(last.code, "BTC");
        assert!(!last.is_default);
    }

    #[tokio::test]
    async fn default_code_cannot_be_added() {
        let repository = MockRepository::default();
        let result = CurrencyService::new(&repository).create_currency(&request("EUR"), &Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn duplicate_custom_currency_conflicts() {
        let user_id = Uuid::new_v4();
        let repository = MockRepository::default();
        let service = CurrencyService::new(&repository);
        service.create_currency(&request("BTC"), &user_id).await.unwrap();

        let result = service.create_currency(&request("BTC"), &user_id).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn deleting_default_hides_it() {
        let user_id = Uuid::new_v4();
        let repository = MockRepository::default();
        let service = CurrencyService::new(&repository);

        let removal = service.remove_currency("gbp", &user_id).await.unwrap();
        assert_eq!(removal, CurrencyRemoval::Hidden);

        let currencies = service.list_currencies(&user_id).await.unwrap();
        assert!(currencies.iter().all(|c| c.code != "GBP"));
        assert_eq!(currencies.len(), 7);
    }

    #[tokio::test]
    async fn deleting_custom_currency_removes_it() {
        let user_id = Uuid::new_v4();
        let repository = MockRepository::default();
        let service = CurrencyService::new(&repository);
        service.create_currency(&request("BTC"), &user_id).await.unwrap();

        assert_eq!(service.remove_currency("BTC", &user_id).await.unwrap(), CurrencyRemoval::Deleted);
        assert!(matches!(service.remove_currency("BTC", &user_id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn currency_in_use_cannot_be_removed() {
        let user_id = Uuid::new_v4();
        let repository = MockRepository::default();
        repository.push_transaction(&user_id, sample_transaction(Bucket::Personal, TransactionType::Expense, 100, "EUR"));

        let result = CurrencyService::new(&repository).remove_currency("EUR", &user_id).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn custom_currency_overrides_default_with_same_code() {
        let custom = vec![Currency {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            code: "USD".to_string(),
            name: "Dollar (custom)".to_string(),
            symbol: "US$".to_string(),
            created_at: chrono::Utc::now(),
        }];

        let currencies = available_currencies(&custom, &BTreeSet::new());
        let usd: Vec<&CurrencyResponse> = currencies.iter().filter(|c| c.code == "USD").collect();
        assert_eq!(usd.len(), 1);
        assert_eq!(usd[0].symbol, "US$");
    }
}
