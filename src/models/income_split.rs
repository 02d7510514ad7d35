use crate::models::currency::{deserialize_currency_code, validate_currency_code};
use crate::models::transaction::TransactionResponse;
use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use validator::Validate;

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct IncomeSplitRequest {
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

impl IncomeSplitRequest {
    pub fn split_note(&self) -> String {
        match self.note.as_deref().map(str::trim) {
            Some(note) if !note.is_empty() => format!("{} (split)", note),
            _ => "Income split".to_string(),
        }
    }
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct IncomeSplitResponse {
    pub transactions: Vec<TransactionResponse>,
}
