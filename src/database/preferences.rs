use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::preferences::{UserPreferences, encode_hidden_currencies};
use std::collections::BTreeSet;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait PreferencesRepository {
    /// Returns the stored preferences, creating the defaults on first access.
    async fn get_or_create_preferences(&self, user_id: &Uuid) -> Result<UserPreferences, AppError>;
    async fn update_base_currency(&self, base_currency: &str, user_id: &Uuid) -> Result<UserPreferences, AppError>;
    async fn set_hidden_currencies(&self, hidden: &BTreeSet<String>, user_id: &Uuid) -> Result<UserPreferences, AppError>;
}

#[async_trait::async_trait]
impl PreferencesRepository for PostgresRepository {
    async fn get_or_create_preferences(&self, user_id: &Uuid) -> Result<UserPreferences, AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let preferences = sqlx::query_as::<_, UserPreferences>(
            r#"
            SELECT user_id, base_currency::text AS base_currency, hidden_currencies, created_at, updated_at
            FROM user_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(preferences)
    }

    async fn update_base_currency(&self, base_currency: &str, user_id: &Uuid) -> Result<UserPreferences, AppError> {
        let preferences = sqlx::query_as::<_, UserPreferences>(
            r#"
            INSERT INTO user_preferences (user_id, base_currency)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET
                base_currency = EXCLUDED.base_currency,
                updated_at = now()
            RETURNING user_id, base_currency::text AS base_currency, hidden_currencies, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(base_currency)
        .fetch_one(&self.pool)
        .await?;

        Ok(preferences)
    }

    async fn set_hidden_currencies(&self, hidden: &BTreeSet<String>, user_id: &Uuid) -> Result<UserPreferences, AppError> {
        let preferences = sqlx::query_as::<_, UserPreferences>(
            r#"
            INSERT INTO user_preferences (user_id, hidden_currencies)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET
                hidden_currencies = EXCLUDED.hidden_currencies,
                updated_at = now()
            RETURNING user_id, base_currency::text AS base_currency, hidden_currencies, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(encode_hidden_currencies(hidden))
        .fetch_one(&self.pool)
        .await?;

        Ok(preferences)
    }
}
