use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::currency::{Currency, CurrencyRequest};
use uuid::Uuid;

/// How many records reference a currency code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct CurrencyUsage {
    pub transactions: i64,
    pub transfers: i64,
}

impl CurrencyUsage {
    pub fn in_use(&self) -> bool {
        self.transactions > 0 || self.transfers > 0
    }
}

#[async_trait::async_trait]
pub trait CurrencyRepository {
    /// Custom currencies only, sorted by code.
    async fn list_currencies(&self, user_id: &Uuid) -> Result<Vec<Currency>, AppError>;
    async fn get_currency_by_code(&self, code: &str, user_id: &Uuid) -> Result<Option<Currency>, AppError>;
    async fn create_currency(&self, request: &CurrencyRequest, user_id: &Uuid) -> Result<Currency, AppError>;
    async fn delete_currency(&self, code: &str, user_id: &Uuid) -> Result<(), AppError>;
    async fn currency_usage(&self, code: &str, user_id: &Uuid) -> Result<CurrencyUsage, AppError>;
}

#[async_trait::async_trait]
impl CurrencyRepository for PostgresRepository {
    async fn list_currencies(&self, user_id: &Uuid) -> Result<Vec<Currency>, AppError> {
        let currencies = sqlx::query_as::<_, Currency>(
            r#"
            SELECT id, user_id, code::text AS code, name, symbol, created_at
            FROM currency
            WHERE user_id = $1
            ORDER BY code
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(currencies)
    }

    async fn get_currency_by_code(&self, code: &str, user_id: &Uuid) -> Result<Option<Currency>, AppError> {
        let currency = sqlx::query_as::<_, Currency>(
            r#"
            SELECT id, user_id, code::text AS code, name, symbol, created_at
            FROM currency
            WHERE user_id = $1 AND code = $2
            "#,
        )
        .bind(user_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(currency)
    }

    async fn create_currency(&self, request: &CurrencyRequest, user_id: &Uuid) -> Result<Currency, AppError> {
        let currency = sqlx::query_as::<_, Currency>(
            r#"
            INSERT INTO currency (user_id, code, name, symbol)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, code::text AS code, name, symbol, created_at
            "#,
        )
        .bind(user_id)
        .bind(&request.code)
        .bind(request.name.trim())
        .bind(request.symbol.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => AppError::Conflict("Currency already exists".to_string()),
            other => AppError::from(other),
        })?;

        Ok(currency)
    }

    async fn delete_currency(&self, code: &str, user_id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM currency WHERE user_id = $1 AND code = $2")
            .bind(user_id)
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Currency not found".to_string()));
        }

        Ok(())
    }

    async fn currency_usage(&self, code: &str, user_id: &Uuid) -> Result<CurrencyUsage, AppError> {
        let usage = sqlx::query_as::<_, CurrencyUsage>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM transaction
                 WHERE user_id = $1 AND currency_code = $2) AS transactions,
                (SELECT COUNT(*) FROM transfer
                 WHERE user_id = $1 AND (from_currency = $2 OR to_currency = $2)) AS transfers
            "#,
        )
        .bind(user_id)
        .bind(code)
        .fetch_one(&self.pool)
        .await?;

        Ok(usage)
    }
}
