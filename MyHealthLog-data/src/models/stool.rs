use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A bowel movement entry
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct StoolLog {
    pub id: i64,
    pub user_id: i64,
    pub log_date: NaiveDate,
    pub stool_type: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StoolLogInput {
    pub log_date: NaiveDate,
    pub stool_type: Option<String>,
    pub notes: Option<String>,
}

/// Number of entries on one day
#[derive(Debug, Clone, FromRow)]
pub struct DailyCount {
    pub log_date: NaiveDate,
    pub count: i64,
}
