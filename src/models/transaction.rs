use crate::models::bucket::{Bucket, TransactionType};
use crate::models::currency::{deserialize_currency_code, deserialize_optional_currency_code, validate_currency_code};
use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub bucket: Bucket,
    pub transaction_type: TransactionType,
    pub amount_minor: i64,
    pub currency_code: String,
    pub effective_at: DateTime<Utc>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Amount with the sign of its direction applied.
    pub fn signed_amount(&self) -> i64 {
        self.transaction_type.sign() * self.amount_minor
    }
}

/// A transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub category_id: Uuid,
    pub bucket: Bucket,
    pub transaction_type: TransactionType,
    pub amount_minor: i64,
    pub currency_code: String,
    pub effective_at: DateTime<Utc>,
    pub note: Option<String>,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct TransactionRequest {
    pub category_id: Uuid,
    pub bucket: Bucket,
    #[serde(alias = "type")]
    pub transaction_type: TransactionType,
    #[validate(range(min = 1))]
    pub amount_minor: i64,
    #[serde(deserialize_with = "deserialize_currency_code")]
    #[validate(custom(function = "validate_currency_code"))]
    #[schemars(regex(pattern = r"^[A-Z]{3}$"))]
    pub currency_code: String,
    pub effective_at: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

impl TransactionRequest {
    pub fn to_new_transaction(&self, now: DateTime<Utc>) -> NewTransaction {
        NewTransaction {
            category_id: self.category_id,
            bucket: self.bucket,
            transaction_type: self.transaction_type,
            amount_minor: self.amount_minor,
            currency_code: self.currency_code.clone(),
            effective_at: self.effective_at.unwrap_or(now),
            note: self.note.clone(),
        }
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Deserialize, Debug, Default, Validate, JsonSchema)]
pub struct TransactionUpdateRequest {
    pub category_id: Option<Uuid>,
    pub bucket: Option<Bucket>,
    #[serde(default, alias = "type")]
    pub transaction_type: Option<TransactionType>,
    #[validate(range(min = 1))]
    pub amount_minor: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_currency_code")]
    #[validate(custom(function = "validate_currency_code"))]
    pub currency_code: Option<String>,
    pub effective_at: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

impl TransactionUpdateRequest {
    pub fn apply_to(&self, existing: &Transaction) -> NewTransaction {
        NewTransaction {
            category_id: self.category_id.unwrap_or(existing.category_id),
            bucket: self.bucket.unwrap_or(existing.bucket),
            transaction_type: self.transaction_type.unwrap_or(existing.transaction_type),
            amount_minor: self.amount_minor.unwrap_or(existing.amount_minor),
            currency_code: self.currency_code.clone().unwrap_or_else(|| existing.currency_code.clone()),
            effective_at: self.effective_at.unwrap_or(existing.effective_at),
            note: self.note.clone().or_else(|| existing.note.clone()),
        }
    }
}

/// Optional filters for listing transactions. Bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub bucket: Option<Bucket>,
    pub category_id: Option<Uuid>,
    pub currency_code: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.bucket.is_none_or(|bucket| transaction.bucket == bucket)
            && self.category_id.is_none_or(|id| transaction.category_id == id)
            && self
                .currency_code
                .as_deref()
                .is_none_or(|code| transaction.currency_code.eq_ignore_ascii_case(code))
            && self.transaction_type.is_none_or(|t| transaction.transaction_type == t)
            && self.start.is_none_or(|start| transaction.effective_at >= start)
            && self.end.is_none_or(|end| transaction.effective_at <= end)
    }
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub category_id: Uuid,
    pub bucket: Bucket,
    pub transaction_type: TransactionType,
    pub amount_minor: i64,
    pub currency_code: String,
    pub effective_at: DateTime<Utc>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Transaction> for TransactionResponse {
    fn from(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id,
            category_id: transaction.category_id,
            bucket: transaction.bucket,
            transaction_type: transaction.transaction_type,
            amount_minor: transaction.amount_minor,
            currency_code: transaction.currency_code.clone(),
            effective_at: transaction.effective_at,
            note: transaction.note.clone(),
            created_at: transaction.created_at,
            updated_at: transaction.updated_at,
        }
    }
}
