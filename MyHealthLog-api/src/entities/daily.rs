use chrono::NaiveDate;
use my_health_log_data::models::daily::{DailyItemType, DailyLogInput};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::common::{optional_date, optional_text, required};
use crate::api::error::ApiResult;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ItemRequest {
    #[validate(required(message = "项目名称和类型不能为空"))]
    pub item_name: Option<String>,

    #[validate(required(message = "项目名称和类型不能为空"))]
    pub item_type: Option<DailyItemType>,
}

/// Check-in for one item on one day
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LogRequest {
    #[serde(default, deserialize_with = "optional_date::deserialize")]
    #[validate(required(message = "日期和项目名称不能为空"))]
    #[schema(value_type = String, format = Date)]
    pub log_date: Option<NaiveDate>,

    #[validate(required(message = "日期和项目名称不能为空"))]
    pub item_name: Option<String>,

    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub status: Option<String>,

    pub notes: Option<String>,
}

impl LogRequest {
    pub fn into_input(self) -> ApiResult<DailyLogInput> {
        Ok(DailyLogInput {
            log_date: required(self.log_date, "日期和项目名称不能为空")?,
            item_name: self.item_name.unwrap_or_default(),
            status: self.status,
            notes: self.notes,
        })
    }
}
