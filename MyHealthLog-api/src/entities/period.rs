use chrono::NaiveDate;
use my_health_log_data::models::period::{MenstrualRecordPatch, NewMenstrualRecord};
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;
use validator::Validate;

use super::common::{optional_date, optional_text, required};
use crate::api::error::ApiResult;

/// Present-but-null becomes `Some(None)`; pair with `#[serde(default)]`
/// so an absent field stays `None`.
mod nullable {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<String>>, D::Error> {
        optional_text::deserialize(deserializer).map(Some)
    }
}

/// Blank or null reads as absent
mod filled {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(optional_text::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
    }
}

mod nullable_date {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error> {
        optional_date::deserialize(deserializer).map(Some)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PeriodRequest {
    #[serde(default, deserialize_with = "optional_date::deserialize")]
    #[validate(required(message = "经期开始日期是必填项。"))]
    #[schema(value_type = String, format = Date)]
    pub start_date: Option<NaiveDate>,

    /// Defaults to `无`
    pub pain_level: Option<String>,

    /// Defaults to `正常`
    pub flow_volume: Option<String>,

    pub notes: Option<String>,
    pub color: Option<String>,
    pub state: Option<String>,
}

impl PeriodRequest {
    pub fn into_new(self) -> ApiResult<NewMenstrualRecord> {
        Ok(NewMenstrualRecord {
            start_date: required(self.start_date, "经期开始日期是必填项。")?,
            pain_level: self.pain_level.unwrap_or_default(),
            flow_volume: self.flow_volume.unwrap_or_default(),
            notes: self.notes,
            color: self.color,
            state: self.state,
        })
    }
}

/// Partial update; `null` clears a field, an absent field is left alone.
/// Pain level and flow volume cannot be cleared: blank or null leaves them as they are.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct PeriodPatchRequest {
    #[serde(default, deserialize_with = "nullable_date::deserialize")]
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "filled::deserialize")]
    pub pain_level: Option<String>,

    #[serde(default, deserialize_with = "filled::deserialize")]
    pub flow_volume: Option<String>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    #[schema(value_type = Option<String>)]
    pub color: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable::deserialize")]
    #[schema(value_type = Option<String>)]
    pub state: Option<Option<String>>,
}

impl From<PeriodPatchRequest> for MenstrualRecordPatch {
    fn from(request: PeriodPatchRequest) -> Self {
        MenstrualRecordPatch {
            end_date: request.end_date,
            pain_level: request.pain_level.map(Some),
            flow_volume: request.flow_volume.map(Some),
            notes: request.notes,
            color: request.color,
            state: request.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(json: &str) -> MenstrualRecordPatch {
        serde_json::from_str::<PeriodPatchRequest>(json).unwrap().into()
    }

    #[test]
    fn test_null_clears_and_absent_keeps() {
        let cleared = patch(r#"{"end_date":null}"#);
        assert_eq!(cleared.end_date, Some(None));
        assert_eq!(cleared.notes, None);

        let set = patch(r#"{"end_date":"2024-05-06","notes":"轻微腹痛"}"#);
        assert_eq!(set.end_date, Some(NaiveDate::from_ymd_opt(2024, 5, 6)));
        assert_eq!(set.notes, Some(Some("轻微腹痛".to_string())));
    }

    #[test]
    fn test_empty_body_is_an_empty_patch() {
        assert!(patch("{}").is_empty());
    }

    #[test]
    fn test_blank_pain_and_flow_are_ignored() {
        assert!(patch(r#"{"pain_level":""}"#).is_empty());
        assert!(patch(r#"{"flow_volume":null,"pain_level":"  "}"#).is_empty());

        let set = patch(r#"{"pain_level":"严重","notes":null}"#);
        assert_eq!(set.pain_level, Some(Some("严重".to_string())));
        assert_eq!(set.flow_volume, None);
        assert_eq!(set.notes, Some(None));
    }

    #[test]
    fn test_start_date_is_required() {
        let request: PeriodRequest = serde_json::from_str(r#"{"pain_level":"轻微"}"#).unwrap();
        assert!(request.validate().is_err());
    }
}
