use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::bucket::Bucket;
use crate::models::category::{Category, CategoryRequest, CategoryUpdateRequest};
use chrono::{DateTime, Utc};
use uuid::Uuid;

// Bucket and type are stored as text and parsed on the way out
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CategoryRow {
    id: Uuid,
    user_id: Uuid,
    bucket: String,
    name: String,
    category_type: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = AppError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Category {
            id: row.id,
            user_id: row.user_id,
            bucket: row.bucket.parse()?,
            name: row.name,
            category_type: row.category_type.parse()?,
            created_at: row.created_at,
        })
    }
}

fn duplicate_category(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Category with this name already exists in this bucket".to_string())
        }
        other => AppError::from(other),
    }
}

#[async_trait::async_trait]
pub trait CategoryRepository {
    async fn create_category(&self, request: &CategoryRequest, user_id: &Uuid) -> Result<Category, AppError>;
    async fn get_category_by_id(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<Category>, AppError>;
    async fn list_categories(&self, bucket: Option<Bucket>, user_id: &Uuid) -> Result<Vec<Category>, AppError>;
    async fn update_category(&self, id: &Uuid, request: &CategoryUpdateRequest, user_id: &Uuid) -> Result<Category, AppError>;
    async fn delete_category(&self, id: &Uuid, user_id: &Uuid) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl CategoryRepository for PostgresRepository {
    async fn create_category(&self, request: &CategoryRequest, user_id: &Uuid) -> Result<Category, AppError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO category (user_id, bucket, name, category_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, bucket, name, category_type, created_at
            "#,
        )
        .bind(user_id)
        .bind(request.bucket.as_str())
        .bind(request.name.trim())
        .bind(request.category_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_category)?;

        Category::try_from(row)
    }

    async fn get_category_by_id(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<Category>, AppError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, user_id, bucket, name, category_type, created_at
            FROM category
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Category::try_from).transpose()
    }

    async fn list_categories(&self, bucket: Option<Bucket>, user_id: &Uuid) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, user_id, bucket, name, category_type, created_at
            FROM category
            WHERE user_id = $1
              AND ($2::text IS NULL OR bucket = $2)
            ORDER BY bucket, name
            "#,
        )
        .bind(user_id)
        .bind(bucket.map(|b| b.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    async fn update_category(&self, id: &Uuid, request: &CategoryUpdateRequest, user_id: &Uuid) -> Result<Category, AppError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE category
            SET name = COALESCE($3, name),
                bucket = COALESCE($4, bucket)
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, bucket, name, category_type, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.bucket.map(|b| b.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(duplicate_category)?;

        match row {
            Some(row) => Category::try_from(row),
            None => Err(AppError::NotFound("Category not found".to_string())),
        }
    }

    async fn delete_category(&self, id: &Uuid, user_id: &Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let in_use: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transaction WHERE category_id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        if in_use > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete category that is used by {} transaction(s)",
                in_use
            )));
        }

        let result = sqlx::query("DELETE FROM category WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }
}
