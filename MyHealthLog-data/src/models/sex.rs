use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// One intimacy entry per user and day
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct SexLog {
    pub id: i64,
    pub log_date: NaiveDate,
    pub protection_method: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SexLogInput {
    pub log_date: NaiveDate,
    pub protection_method: Option<String>,
}

/// Whether saving created a row or changed an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SexLogSaved {
    Inserted(i64),
    Updated(i64),
}
