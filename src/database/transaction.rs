use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::transaction::{NewTransaction, Transaction, TransactionFilter};
use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TransactionRow {
    id: Uuid,
    user_id: Uuid,
    category_id: Uuid,
    bucket: String,
    transaction_type: String,
    amount_minor: i64,
    currency_code: String,
    effective_at: DateTime<Utc>,
    note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = AppError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: row.id,
            user_id: row.user_id,
            category_id: row.category_id,
            bucket: row.bucket.parse()?,
            transaction_type: row.transaction_type.parse()?,
            amount_minor: row.amount_minor,
            currency_code: row.currency_code.trim().to_string(),
            effective_at: row.effective_at,
            note: row.note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Inserts a transaction if its category belongs to the user.
/// Returns `None` when the category is missing or foreign.
pub(crate) async fn insert_transaction<'e, E>(executor: E, draft: &NewTransaction, user_id: &Uuid) -> Result<Option<Transaction>, AppError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, TransactionRow>(
        r#"
        INSERT INTO transaction (
            user_id, category_id, bucket, transaction_type,
            amount_minor, currency_code, effective_at, note
        )
        SELECT $1, c.id, $3, $4, $5, $6, $7, $8
        FROM category c
        WHERE c.id = $2 AND c.user_id = $1
        RETURNING id, user_id, category_id, bucket, transaction_type,
                  amount_minor, currency_code, effective_at, note,
                  created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(draft.category_id)
    .bind(draft.bucket.as_str())
    .bind(draft.transaction_type.as_str())
    .bind(draft.amount_minor)
    .bind(&draft.currency_code)
    .bind(draft.effective_at)
    .bind(&draft.note)
    .fetch_optional(executor)
    .await?;

    row.map(Transaction::try_from).transpose()
}

#[async_trait::async_trait]
pub trait TransactionRepository {
    async fn create_transaction(&self, draft: &NewTransaction, user_id: &Uuid) -> Result<Transaction, AppError>;
    async fn get_transaction_by_id(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<Transaction>, AppError>;
    /// Newest first.
    async fn list_transactions(&self, filter: &TransactionFilter, user_id: &Uuid) -> Result<Vec<Transaction>, AppError>;
    async fn update_transaction(&self, id: &Uuid, draft: &NewTransaction, user_id: &Uuid) -> Result<Transaction, AppError>;
    async fn delete_transaction(&self, id: &Uuid, user_id: &Uuid) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl TransactionRepository for PostgresRepository {
    async fn create_transaction(&self, draft: &NewTransaction, user_id: &Uuid) -> Result<Transaction, AppError> {
        insert_transaction(&self.pool, draft, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    async fn get_transaction_by_id(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<Transaction>, AppError> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, user_id, category_id, bucket, transaction_type,
                   amount_minor, currency_code, effective_at, note,
                   created_at, updated_at
            FROM transaction
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transaction::try_from).transpose()
    }

    async fn list_transactions(&self, filter: &TransactionFilter, user_id: &Uuid) -> Result<Vec<Transaction>, AppError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, user_id, category_id, bucket, transaction_type,
                   amount_minor, currency_code, effective_at, note,
                   created_at, updated_at
            FROM transaction
            WHERE user_id = $1
              AND ($2::text IS NULL OR bucket = $2)
              AND ($3::uuid IS NULL OR category_id = $3)
              AND ($4::text IS NULL OR currency_code = $4)
              AND ($5::text IS NULL OR transaction_type = $5)
              AND ($6::timestamptz IS NULL OR effective_at >= $6)
              AND ($7::timestamptz IS NULL OR effective_at <= $7)
            ORDER BY effective_at DESC, created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(filter.bucket.map(|b| b.as_str()))
        .bind(filter.category_id)
        .bind(filter.currency_code.as_deref())
        .bind(filter.transaction_type.map(|t| t.as_str()))
        .bind(filter.start)
        .bind(filter.end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn update_transaction(&self, id: &Uuid, draft: &NewTransaction, user_id: &Uuid) -> Result<Transaction, AppError> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            UPDATE transaction t
            SET category_id = c.id,
                bucket = $4,
                transaction_type = $5,
                amount_minor = $6,
                currency_code = $7,
                effective_at = $8,
                note = $9,
                updated_at = now()
            FROM category c
            WHERE t.id = $1 AND t.user_id = $2
              AND c.id = $3 AND c.user_id = $2
            RETURNING t.id, t.user_id, t.category_id, t.bucket, t.transaction_type,
                      t.amount_minor, t.currency_code, t.effective_at, t.note,
                      t.created_at, t.updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(draft.category_id)
        .bind(draft.bucket.as_str())
        .bind(draft.transaction_type.as_str())
        .bind(draft.amount_minor)
        .bind(&draft.currency_code)
        .bind(draft.effective_at)
        .bind(&draft.note)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Transaction::try_from(row),
            None => Err(AppError::NotFound("Transaction or category not found".to_string())),
        }
    }

    async fn delete_transaction(&self, id: &Uuid, user_id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM transaction WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Transaction not found".to_string()));
        }

        Ok(())
    }
}
