use chrono::NaiveDate;
use my_health_log_data::models::stool::StoolLogInput;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::common::{optional_date, optional_text, required};
use crate::api::error::ApiResult;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StoolRequest {
    #[serde(default, deserialize_with = "optional_date::deserialize")]
    #[validate(required(message = "记录日期不能为空。"))]
    #[schema(value_type = String, format = Date)]
    pub log_date: Option<NaiveDate>,

    /// Bristol scale category
    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub stool_type: Option<String>,

    pub notes: Option<String>,
}

impl StoolRequest {
    pub fn into_input(self) -> ApiResult<StoolLogInput> {
        Ok(StoolLogInput {
            log_date: required(self.log_date, "记录日期不能为空。")?,
            stool_type: self.stool_type,
            notes: self.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_date_fails_validation() {
        let request: StoolRequest = serde_json::from_str(r#"{"stool_type":"4"}"#).unwrap();
        assert!(request.validate().is_err());
        assert!(request.into_input().is_err());
    }

    #[test]
    fn test_numeric_type_is_kept_as_text() {
        let request: StoolRequest = serde_json::from_str(r#"{"log_date":"2024-05-01","stool_type":4}"#).unwrap();
        let input = request.into_input().unwrap();
        assert_eq!(input.stool_type.as_deref(), Some("4"));
        assert_eq!(input.log_date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }
}
