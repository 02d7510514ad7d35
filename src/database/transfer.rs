use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::bucket::Bucket;
use crate::models::transfer::{Transfer, TransferRequest};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct TransferRow {
    id: Uuid,
    user_id: Uuid,
    bucket: String,
    from_currency: String,
    to_currency: String,
    from_amount_minor: i64,
    to_amount_minor: i64,
    manual_rate: Decimal,
    effective_at: DateTime<Utc>,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransferRow> for Transfer {
    type Error = AppError;

    fn try_from(row: TransferRow) -> Result<Self, Self::Error> {
        Ok(Transfer {
            id: row.id,
            user_id: row.user_id,
            bucket: row.bucket.parse()?,
            from_currency: row.from_currency.trim().to_string(),
            to_currency: row.to_currency.trim().to_string(),
            from_amount_minor: row.from_amount_minor,
            to_amount_minor: row.to_amount_minor,
            manual_rate: row.manual_rate.normalize(),
            effective_at: row.effective_at,
            note: row.note,
            created_at: row.created_at,
        })
    }
}

#[async_trait::async_trait]
pub trait TransferRepository {
    async fn create_transfer(&self, request: &TransferRequest, user_id: &Uuid) -> Result<Transfer, AppError>;
    /// Newest first.
    async fn list_transfers(&self, bucket: Option<Bucket>, user_id: &Uuid) -> Result<Vec<Transfer>, AppError>;
    async fn delete_transfer(&self, id: &Uuid, user_id: &Uuid) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl TransferRepository for PostgresRepository {
    async fn create_transfer(&self, request: &TransferRequest, user_id: &Uuid) -> Result<Transfer, AppError> {
        let row = sqlx::query_as::<_, TransferRow>(
            r#"
            INSERT INTO transfer (
                user_id, bucket, from_currency, to_currency,
                from_amount_minor, to_amount_minor, manual_rate,
                effective_at, note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, now()), $9)
            RETURNING id, user_id, bucket, from_currency, to_currency,
                      from_amount_minor, to_amount_minor, manual_rate,
                      effective_at, note, created_at
            "#,
        )
        .bind(user_id)
        .bind(request.bucket.as_str())
        .bind(&request.from_currency)
        .bind(&request.to_currency)
        .bind(request.from_amount_minor)
        .bind(request.to_amount_minor)
        .bind(request.manual_rate)
        .bind(request.effective_at)
        .bind(&request.note)
        .fetch_one(&self.pool)
        .await?;

        Transfer::try_from(row)
    }

    async fn list_transfers(&self, bucket: Option<Bucket>, user_id: &Uuid) -> Result<Vec<Transfer>, AppError> {
        let rows = sqlx::query_as::<_, TransferRow>(
            r#"
            SELECT id, user_id, bucket, from_currency, to_currency,
                   from_amount_minor, to_amount_minor, manual_rate,
                   effective_at, note, created_at
            FROM transfer
            WHERE user_id = $1
              AND ($2::text IS NULL OR bucket = $2)
            ORDER BY effective_at DESC, created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(bucket.map(|b| b.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Transfer::try_from).collect()
    }

    async fn delete_transfer(&self, id: &Uuid, user_id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM transfer WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Transfer not found".to_string()));
        }

        Ok(())
    }
}
