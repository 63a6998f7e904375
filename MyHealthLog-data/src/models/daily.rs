use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Status written when a one-time item is completed
pub const ITEM_COMPLETED: &str = "completed";

/// Custom check-in item
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DailyItem {
    pub id: i64,
    pub user_id: i64,
    pub item_name: String,
    /// `daily` or `one-time`
    pub item_type: String,
    /// `completed` once a one-time item is done
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Whether an item recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DailyItemType {
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "one-time")]
    OneTime,
}

impl DailyItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DailyItemType::Daily => "daily",
            DailyItemType::OneTime => "one-time",
        }
    }
}

/// Input for a new check-in item
#[derive(Debug, Clone)]
pub struct NewDailyItem {
    pub item_name: String,
    pub item_type: DailyItemType,
}

/// One day's check-in for an item
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DailyLog {
    pub id: i64,
    pub user_id: i64,
    pub log_date: NaiveDate,
    pub item_name: String,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Input for saving a check-in; `(date, item_name)` identifies the row
#[derive(Debug, Clone)]
pub struct DailyLogInput {
    pub log_date: NaiveDate,
    pub item_name: String,
    pub status: Option<String>,
    pub notes: Option<String>,
}
