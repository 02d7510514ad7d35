use crate::models::bucket::{Bucket, TransactionType};
use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

/// Name given to categories created on demand by the income splitter.
pub const DEFAULT_INCOME_CATEGORY: &str = "Income";

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bucket: Bucket,
    pub name: String,
    pub category_type: TransactionType,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub bucket: Bucket,
    #[serde(alias = "type")]
    pub category_type: TransactionType,
}

/// Rename and/or move a category. Its type is fixed at creation.
#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct CategoryUpdateRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub bucket: Option<Bucket>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub bucket: Bucket,
    pub name: String,
    pub category_type: TransactionType,
    pub created_at: DateTime<Utc>,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            bucket: category.bucket,
            name: category.name.clone(),
            category_type: category.category_type,
            created_at: category.created_at,
        }
    }
}
