use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::error::ApiError;

/// Error body returned by every failing route
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message
    pub message: String,
}

/// Body of routes that only confirm an action
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Body of routes that create a row and report its id
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub id: i64,
    pub message: String,
}

/// `?q=` search parameter
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Inclusive `startDate`/`endDate` range
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    #[serde(default, deserialize_with = "optional_date::deserialize")]
    #[param(value_type = Option<String>, example = "2024-05-01")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "optional_date::deserialize")]
    #[param(value_type = Option<String>, example = "2024-05-31")]
    pub end_date: Option<NaiveDate>,
}

/// A field that validation has already required, or `message` as a 400
pub fn required<T>(value: Option<T>, message: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::bad_request(message))
}

/// Parse a calendar date. Accepts `YYYY-MM-DD` and anything starting with it,
/// such as an RFC 3339 timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    value
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

/// Parse a local date and time as sent by `datetime-local` inputs or
/// written by hand. An offset, if present, is dropped.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    const FORMATS: [&str; 4] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| parse_date(value).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Null, a blank string and an absent field all mean "not supplied"
fn present(value: Option<Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        other => other,
    }
}

/// `Option<NaiveDate>` fields; use with `#[serde(default)]`
pub mod optional_date {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        match present(Option::<Value>::deserialize(deserializer)?) {
            None => Ok(None),
            Some(Value::String(s)) => parse_date(&s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid date: {}", s))),
            Some(other) => Err(de::Error::custom(format!("invalid date: {}", other))),
        }
    }
}

/// `Option<NaiveDateTime>` fields; use with `#[serde(default)]`
pub mod optional_datetime {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        match present(Option::<Value>::deserialize(deserializer)?) {
            None => Ok(None),
            Some(Value::String(s)) => parse_datetime(&s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid datetime: {}", s))),
            Some(other) => Err(de::Error::custom(format!("invalid datetime: {}", other))),
        }
    }
}

/// Numbers that may arrive quoted from form fields
fn number(value: Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `Option<f64>` fields accepting numbers or numeric strings
pub mod optional_f64 {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match present(Option::<Value>::deserialize(deserializer)?) {
            None => Ok(None),
            Some(value) => number(value.clone())
                .filter(|n| n.is_finite())
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("not a number: {}", value))),
        }
    }
}

/// `Option<i64>` fields accepting integers or integer strings
pub mod optional_i64 {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match present(Option::<Value>::deserialize(deserializer)?) {
            None => Ok(None),
            Some(value) => number(value.clone())
                .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
                .map(|n| Some(n as i64))
                .ok_or_else(|| de::Error::custom(format!("not an integer: {}", value))),
        }
    }
}

/// `Option<i32>` fields accepting integers or integer strings
pub mod optional_i32 {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
        let value = optional_i64::deserialize(deserializer)?;
        value
            .map(|n| i32::try_from(n).map_err(|_| de::Error::custom(format!("integer out of range: {}", n))))
            .transpose()
    }
}

/// Text fields that some clients send as numbers
pub mod optional_text {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(de::Error::custom(format!("expected text, found {}", other))),
        }
    }
}

/// Flags sent either as booleans or as `0`/`1`
pub mod flag {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(Value::Number(n)) if n.as_i64() == Some(0) => Ok(Some(false)),
            Some(Value::Number(n)) if n.as_i64() == Some(1) => Ok(Some(true)),
            Some(other) => Err(de::Error::custom(format!("expected a boolean, found {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "optional_date::deserialize")]
        day: Option<NaiveDate>,
        #[serde(default, deserialize_with = "optional_datetime::deserialize")]
        at: Option<NaiveDateTime>,
        #[serde(default, deserialize_with = "optional_f64::deserialize")]
        weight: Option<f64>,
        #[serde(default, deserialize_with = "optional_i32::deserialize")]
        stock: Option<i32>,
        #[serde(default, deserialize_with = "flag::deserialize")]
        done: Option<bool>,
    }

    fn sample(json: &str) -> Result<Sample, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_dates_accept_plain_and_timestamp_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert_eq!(sample(r#"{"day":"2024-05-01"}"#).unwrap().day, expected);
        assert_eq!(sample(r#"{"day":"2024-05-01T16:00:00.000Z"}"#).unwrap().day, expected);
        assert_eq!(sample(r#"{"day":""}"#).unwrap().day, None);
        assert!(sample(r#"{"day":"05/01/2024"}"#).is_err());
    }

    #[test]
    fn test_datetimes_accept_local_input_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(7, 30, 0);
        assert_eq!(sample(r#"{"at":"2024-05-01T07:30"}"#).unwrap().at, expected);
        assert_eq!(sample(r#"{"at":"2024-05-01 07:30:00"}"#).unwrap().at, expected);
        assert_eq!(sample(r#"{"at":"2024-05-01T07:30:00+08:00"}"#).unwrap().at, expected);
    }

    #[test]
    fn test_numbers_may_be_quoted() {
        let parsed = sample(r#"{"weight":"65.5","stock":"12"}"#).unwrap();
        assert_eq!(parsed.weight, Some(65.5));
        assert_eq!(parsed.stock, Some(12));
        assert!(sample(r#"{"weight":"heavy"}"#).is_err());
        assert!(sample(r#"{"stock":1.5}"#).is_err());
        assert_eq!(sample(r#"{"stock":null}"#).unwrap().stock, None);
    }

    #[test]
    fn test_flags_accept_numeric_booleans() {
        assert_eq!(sample(r#"{"done":1}"#).unwrap().done, Some(true));
        assert_eq!(sample(r#"{"done":false}"#).unwrap().done, Some(false));
        assert!(sample(r#"{"done":"yes"}"#).is_err());
    }
}
