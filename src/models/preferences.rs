use crate::models::currency::{deserialize_currency_code, validate_currency_code};
use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use std::collections::BTreeSet;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, Debug, Clone, sqlx::FromRow)]
pub struct UserPreferences {
    pub user_id: Uuid,
    pub base_currency: String,
    /// JSON-encoded list of currency codes, as stored.
    pub hidden_currencies: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserPreferences {
    /// Hidden currency codes, upper-cased. A malformed stored list counts as empty.
    pub fn hidden_currencies(&self) -> BTreeSet<String> {
        parse_hidden_currencies(self.hidden_currencies.as_deref())
    }
}

pub fn parse_hidden_currencies(raw: Option<&str>) -> BTreeSet<String> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return BTreeSet::new();
    };

    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(codes) => codes.iter().map(|code| code.trim().to_ascii_uppercase()).collect(),
        Err(e) => {
            warn!(error = %e, "Ignoring malformed hidden currency list");
            BTreeSet::new()
        }
    }
}

pub fn encode_hidden_currencies(codes: &BTreeSet<String>) -> String {
    let list: Vec<&String> = codes.iter().collect();
    serde_json::to_string(&list).unwrap_or_else(|_| "[]".to_string())
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct PreferencesResponse {
    pub base_currency: String,
    pub hidden_currencies: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserPreferences> for PreferencesResponse {
    fn from(value: &UserPreferences) -> Self {
        Self {
            base_currency: value.base_currency.clone(),
            hidden_currencies: value.hidden_currencies().into_iter().collect(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct PreferencesRequest {
    #[serde(deserialize_with = "deserialize_currency_code")]
    #[validate(custom(function = "validate_currency_code"))]
    #[schemars(regex(pattern = r"^[A-Z]{3}$"))]
    pub base_currency: String,
}
