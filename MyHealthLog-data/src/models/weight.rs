use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A weight measurement
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct WeightLog {
    pub id: i64,
    pub user_id: i64,
    pub log_datetime: NaiveDateTime,
    pub weight: f64,
}

#[derive(Debug, Clone)]
pub struct NewWeightLog {
    pub log_datetime: NaiveDateTime,
    pub weight: f64,
}
