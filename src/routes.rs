pub mod balance;
pub mod category;
pub mod currency;
pub mod error;
pub mod health;
pub mod income_split;
pub mod preferences;
pub mod transaction;
pub mod transfer;
pub mod user;

use crate::error::app_error::AppError;
use crate::models::bucket::Bucket;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::str::FromStr;
use uuid::Uuid;

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|e| AppError::uuid(format!("Invalid {} id", what), e))
}

pub(crate) fn parse_optional_bucket(raw: Option<&str>) -> Result<Option<Bucket>, AppError> {
    raw.filter(|value| !value.trim().is_empty()).map(Bucket::from_str).transpose()
}

/// Bound of a date range filter. Accepts RFC 3339 timestamps or plain
/// `YYYY-MM-DD` dates; a plain end date covers that whole day.
pub(crate) fn parse_date_bound(raw: Option<&str>, end_of_day: bool) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(at.with_timezone(&Utc)));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| AppError::BadRequest(format!("Invalid date: {}", raw)))?;
    let time = if end_of_day {
        NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
    } else {
        Some(NaiveTime::MIN)
    };

    Ok(time.map(|time| date.and_time(time).and_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn empty_bucket_filter_means_all() {
        assert_eq!(parse_optional_bucket(None).unwrap(), None);
        assert_eq!(parse_optional_bucket(Some("")).unwrap(), None);
        assert_eq!(parse_optional_bucket(Some("Personal")).unwrap(), Some(Bucket::Personal));
    }

    #[test]
    fn unknown_bucket_filter_is_bad_request() {
        assert!(matches!(parse_optional_bucket(Some("savings")), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn plain_dates_cover_whole_days() {
        let start = parse_date_bound(Some("2025-03-01"), false).unwrap().unwrap();
        let end = parse_date_bound(Some("2025-03-01"), true).unwrap().unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(end.hour(), 23);
        assert!(end > start);
    }

    #[test]
    fn rfc3339_bounds_are_kept_exact() {
        let at = parse_date_bound(Some("2025-03-01T10:15:00+02:00"), true).unwrap().unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2025, 3, 1, 8, 15, 0).unwrap());
    }

    #[test]
    fn garbage_date_is_bad_request() {
        assert!(matches!(parse_date_bound(Some("yesterday"), false), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn malformed_id_is_uuid_error() {
        assert!(matches!(parse_id("nope", "transaction"), Err(AppError::UuidError { .. })));
    }
}
