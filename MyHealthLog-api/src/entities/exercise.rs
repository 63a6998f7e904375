use chrono::NaiveDate;
use my_health_log_data::models::exercise::NewExerciseLog;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::common::{optional_date, optional_i32, required};
use crate::api::error::ApiResult;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ExerciseRequest {
    #[serde(default, deserialize_with = "optional_date::deserialize")]
    #[validate(required(message = "日期和运动名称是必填项"))]
    #[schema(value_type = String, format = Date)]
    pub log_date: Option<NaiveDate>,

    #[validate(required(message = "日期和运动名称是必填项"))]
    pub exercise_name: Option<String>,

    #[serde(default, deserialize_with = "optional_i32::deserialize")]
    pub duration_minutes: Option<i32>,

    #[serde(default, deserialize_with = "optional_i32::deserialize")]
    pub sets: Option<i32>,

    #[serde(default, deserialize_with = "optional_i32::deserialize")]
    pub reps: Option<i32>,

    pub notes: Option<String>,
}

impl ExerciseRequest {
    pub fn into_new(self) -> ApiResult<NewExerciseLog> {
        Ok(NewExerciseLog {
            log_date: required(self.log_date, "日期和运动名称是必填项")?,
            exercise_name: self.exercise_name.unwrap_or_default(),
            duration_minutes: self.duration_minutes,
            sets: self.sets,
            reps: self.reps,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSearchQuery {
    /// Substring of the exercise name
    pub exercise_name: Option<String>,

    #[serde(default, deserialize_with = "optional_date::deserialize")]
    #[param(value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "optional_date::deserialize")]
    #[param(value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accept_form_strings() {
        let request: ExerciseRequest = serde_json::from_str(
            r#"{"log_date":"2024-05-02","exercise_name":"深蹲","sets":"4","reps":12,"duration_minutes":""}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
        let log = request.into_new().unwrap();
        assert_eq!(log.sets, Some(4));
        assert_eq!(log.reps, Some(12));
        assert_eq!(log.duration_minutes, None);
    }
}
