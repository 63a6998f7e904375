pub mod admin;
pub mod auth;
pub mod daily;
pub mod exercise;
pub mod finance;
pub mod health;
pub mod lookup;
pub mod medications;
pub mod memos;
pub mod periods;
pub mod sex;
pub mod stool;
pub mod weight;

// Tests module
#[cfg(test)]
mod tests;

use chrono::NaiveDate;
use my_health_log_domain::Services;

use crate::api::error::{ApiError, ApiResult};
use crate::entities::common::parse_date;

/// Router state shared by every handler
pub type AppState = Services;

pub use health::health_check;

/// Parse a `YYYY-MM-DD` path segment
pub(crate) fn path_date(value: &str) -> ApiResult<NaiveDate> {
    parse_date(value).ok_or_else(|| ApiError::bad_request("无效的日期格式"))
}
