use chrono::NaiveDateTime;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::common::{optional_datetime, optional_f64};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct WeightRequest {
    /// Kilograms
    #[serde(default, deserialize_with = "optional_f64::deserialize")]
    #[validate(required(message = "体重和日期时间不能为空"))]
    pub weight: Option<f64>,

    #[serde(default, deserialize_with = "optional_datetime::deserialize")]
    #[validate(required(message = "体重和日期时间不能为空"))]
    #[schema(value_type = String, example = "2024-05-01T07:30")]
    pub log_datetime: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct HeightRequest {
    /// Centimetres
    #[serde(default, deserialize_with = "optional_f64::deserialize")]
    #[validate(required(message = "无效的身高值"))]
    pub height: Option<f64>,
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
pub struct WeightHistoryQuery {
    #[serde(default, deserialize_with = "optional_datetime::deserialize")]
    #[param(value_type = Option<String>)]
    pub start_datetime: Option<NaiveDateTime>,

    #[serde(default, deserialize_with = "optional_datetime::deserialize")]
    #[param(value_type = Option<String>)]
    pub end_datetime: Option<NaiveDateTime>,
}
