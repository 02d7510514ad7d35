use crate::models::bucket::Bucket;
use crate::models::currency::{deserialize_currency_code, validate_currency_code};
use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A conversion between two currencies inside one bucket.
///
/// The stored amounts are what moves balances; `manual_rate` is only
/// consulted when resolving exchange rates.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Transfer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bucket: Bucket,
    pub from_currency: String,
    pub to_currency: String,
    pub from_amount_minor: i64,
    pub to_amount_minor: i64,
    pub manual_rate: Decimal,
    pub effective_at: DateTime<Utc>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn validate_positive_rate(rate: &Decimal) -> Result<(), ValidationError> {
    if rate.is_sign_positive() && !rate.is_zero() {
        Ok(())
    } else {
        let mut error = ValidationError::new("manual_rate");
        error.message = Some("Exchange rate must be positive".into());
        Err(error)
    }
}

fn validate_distinct_currencies(request: &TransferRequest) -> Result<(), ValidationError> {
    if request.from_currency == request.to_currency {
        let mut error = ValidationError::new("same_currency");
        error.message = Some("Transfer currencies must differ".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
#[validate(schema(function = "validate_distinct_currencies"))]
pub struct TransferRequest {
    pub bucket: Bucket,
    #[serde(deserialize_with = "deserialize_currency_code")]
    #[validate(custom(function = "validate_currency_code"))]
    #[schemars(regex(pattern = r"^[A-Z]{3}$"))]
    pub from_currency: String,
    #[serde(deserialize_with = "deserialize_currency_code")]
    #[validate(custom(function = "validate_currency_code"))]
    #[schemars(regex(pattern = r"^[A-Z]{3}$"))]
    pub to_currency: String,
    #[validate(range(min = 1))]
    pub from_amount_minor: i64,
    #[validate(range(min = 1))]
    pub to_amount_minor: i64,
    #[validate(custom(function = "validate_positive_rate"))]
    pub manual_rate: Decimal,
    pub effective_at: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct TransferResponse {
    pub id: Uuid,
    pub bucket: Bucket,
    pub from_currency: String,
    pub to_currency: String,
    pub from_amount_minor: i64,
    pub to_amount_minor: i64,
    pub manual_rate: Decimal,
    pub effective_at: DateTime<Utc>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Transfer> for TransferResponse {
    fn from(transfer: &Transfer) -> Self {
        Self {
            id: transfer.id,
            bucket: transfer.bucket,
            from_currency: transfer.from_currency.clone(),
            to_currency: transfer.to_currency.clone(),
            from_amount_minor: transfer.from_amount_minor,
            to_amount_minor: transfer.to_amount_minor,
            manual_rate: transfer.manual_rate,
            effective_at: transfer.effective_at,
            note: transfer.note.clone(),
            created_at: transfer.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(from: &str, to: &str, rate: Decimal) -> TransferRequest {
        TransferRequest {
            bucket: Bucket::Personal,
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            from_amount_minor: 10000,
            to_amount_minor: 9200,
            manual_rate: rate,
            effective_at: None,
            note: None,
        }
    }

    #[test]
    fn valid_transfer_passes() {
        assert!(request("USD", "EUR", dec!(0.92)).validate().is_ok());
    }

    #[test]
    fn identical_currencies_are_rejected() {
        assert!(request("USD", "USD", dec!(1)).validate().is_err());
    }

    #[test]
    fn rate_must_be_positive() {
        assert!(request("USD", "EUR", dec!(0)).validate().is_err());
        assert!(request("USD", "EUR", dec!(-0.5)).validate().is_err());
    }

    #[test]
    fn json_codes_are_upper_cased() {
        let parsed: TransferRequest = serde_json::from_value(serde_json::json!({
            "bucket": "personal",
            "from_currency": "usd",
            "to_currency": "eur",
            "from_amount_minor": 10000,
            "to_amount_minor": 9200,
            "manual_rate": 0.92
        }))
        .unwrap();
        assert_eq!(parsed.from_currency, "USD");
        assert_eq!(parsed.to_currency, "EUR");
        assert_eq!(parsed.manual_rate, dec!(0.92));
    }
}
