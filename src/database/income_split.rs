use crate::database::category::CategoryRow;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::transaction::insert_transaction;
use crate::error::app_error::AppError;
use crate::models::bucket::{Bucket, TransactionType};
use crate::models::category::{Category, DEFAULT_INCOME_CATEGORY};
use crate::models::transaction::{NewTransaction, Transaction};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait IncomeSplitRepository {
    /// The oldest income category of `bucket`, creating the default one if
    /// the bucket has none.
    async fn income_category_for_bucket(&self, bucket: Bucket, user_id: &Uuid) -> Result<Category, AppError>;
    /// Stores every draft or none of them.
    async fn create_transactions_atomically(&self, drafts: &[NewTransaction], user_id: &Uuid) -> Result<Vec<Transaction>, AppError>;
}

impl PostgresRepository {
    async fn first_income_category(&self, bucket: Bucket, user_id: &Uuid) -> Result<Option<Category>, AppError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, user_id, bucket, name, category_type, created_at
            FROM category
            WHERE user_id = $1 AND bucket = $2 AND category_type = $3
            ORDER BY created_at, id
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(bucket.as_str())
        .bind(TransactionType::Income.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Category::try_from).transpose()
    }
}

#[async_trait::async_trait]
impl IncomeSplitRepository for PostgresRepository {
    async fn income_category_for_bucket(&self, bucket: Bucket, user_id: &Uuid) -> Result<Category, AppError> {
        if let Some(category) = self.first_income_category(bucket, user_id).await? {
            return Ok(category);
        }

        // The unique index turns a concurrent insert into a no-op
        sqlx::query(
            r#"
            INSERT INTO category (user_id, bucket, name, category_type)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, bucket, name, category_type) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(bucket.as_str())
        .bind(DEFAULT_INCOME_CATEGORY)
        .bind(TransactionType::Income.as_str())
        .execute(&self.pool)
        .await?;

        tracing::debug!(user_id = %user_id, bucket = %bucket, "Ensured default income category");

        self.first_income_category(bucket, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Income category not found".to_string()))
    }

    async fn create_transactions_atomically(&self, drafts: &[NewTransaction], user_id: &Uuid) -> Result<Vec<Transaction>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let transaction = insert_transaction(&mut *tx, draft, user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
            created.push(transaction);
        }

        tx.commit().await?;
        Ok(created)
    }
}
