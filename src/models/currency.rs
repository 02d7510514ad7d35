use chrono::{DateTime, Utc};
use regex::Regex;
use rocket::serde::{Deserialize, Deserializer, Serialize};
use schemars::JsonSchema;
use std::sync::LazyLock;
use uuid::Uuid;
use validator::{Validate, ValidationError};

static CURRENCY_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid currency code pattern"));

pub const DEFAULT_BASE_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy)]
pub struct DefaultCurrency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

/// Currencies every user can pick without adding them.
pub const DEFAULT_CURRENCIES: [DefaultCurrency; 8] = [
    DefaultCurrency {
        code: "USD",
        name: "US Dollar",
        symbol: "$",
    },
    DefaultCurrency {
        code: "EUR",
        name: "Euro",
        symbol: "€",
    },
    DefaultCurrency {
        code: "GBP",
        name: "British Pound",
        symbol: "£",
    },
    DefaultCurrency {
        code: "JPY",
        name: "Japanese Yen",
        symbol: "¥",
    },
    DefaultCurrency {
        code: "CAD",
        name: "Canadian Dollar",
        symbol: "C$",
    },
    DefaultCurrency {
        code: "AUD",
        name: "Australian Dollar",
        symbol: "A$",
    },
    DefaultCurrency {
        code: "CHF",
        name: "Swiss Franc",
        symbol: "CHF",
    },
    DefaultCurrency {
        code: "CNY",
        name: "Chinese Yuan",
        symbol: "¥",
    },
];

pub fn is_default_currency(code: &str) -> bool {
    DEFAULT_CURRENCIES.iter().any(|c| c.code.eq_ignore_ascii_case(code))
}

pub fn validate_currency_code(code: &str) -> Result<(), ValidationError> {
    if CURRENCY_CODE.is_match(code) {
        Ok(())
    } else {
        let mut error = ValidationError::new("currency_code");
        error.message = Some("Currency code must be 3 uppercase letters".into());
        Err(error)
    }
}

pub fn normalize_currency_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub fn deserialize_currency_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_currency_code(&raw))
}

pub fn deserialize_optional_currency_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(normalize_currency_code))
}

/// A user-defined currency.
#[derive(Serialize, Debug, Clone, sqlx::FromRow)]
pub struct Currency {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct CurrencyResponse {
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub is_default: bool,
}

impl From<&Currency> for CurrencyResponse {
    fn from(value: &Currency) -> Self {
        Self {
            code: value.code.clone(),
            name: value.name.clone(),
            symbol: value.symbol.clone(),
            is_default: false,
        }
    }
}

impl From<&DefaultCurrency> for CurrencyResponse {
    fn from(value: &DefaultCurrency) -> Self {
        Self {
            code: value.code.to_string(),
            name: value.name.to_string(),
            symbol: value.symbol.to_string(),
            is_default: true,
        }
    }
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct CurrencyRequest {
    #[serde(deserialize_with = "deserialize_currency_code")]
    #[validate(custom(function = "validate_currency_code"))]
    #[schemars(regex(pattern = r"^[A-Z]{3}$"))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 10))]
    pub symbol: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_code_requires_three_uppercase_letters() {
        assert!(validate_currency_code("USD").is_ok());
        assert!(validate_currency_code("usd").is_err());
        assert!(validate_currency_code("US").is_err());
        assert!(validate_currency_code("US1").is_err());
    }

    #[test]
    fn request_code_is_upper_cased_on_entry() {
        let request: CurrencyRequest = serde_json::from_str(r#"{"code":" btc ","name":"Bitcoin","symbol":"₿"}"#).unwrap();
        assert_eq!(request.code, "BTC");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn default_currency_lookup_ignores_case() {
        assert!(is_default_currency("chf"));
        assert!(!is_default_currency("BTC"));
        assert_eq!(DEFAULT_CURRENCIES.len(), 8);
    }
}
