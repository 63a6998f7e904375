use chrono::NaiveDate;
use my_health_log_data::models::sex::SexLogInput;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::common::{optional_date, required};
use crate::api::error::ApiResult;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SexRequest {
    #[serde(default, deserialize_with = "optional_date::deserialize")]
    #[validate(required(message = "日期是必填项。"))]
    #[schema(value_type = String, format = Date)]
    pub log_date: Option<NaiveDate>,

    pub protection_method: Option<String>,
}

impl SexRequest {
    pub fn into_input(self) -> ApiResult<SexLogInput> {
        Ok(SexLogInput {
            log_date: required(self.log_date, "日期是必填项。")?,
            protection_method: self.protection_method,
        })
    }
}
