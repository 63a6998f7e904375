use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A workout entry
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ExerciseLog {
    pub id: i64,
    pub user_id: i64,
    pub log_date: NaiveDate,
    pub exercise_name: String,
    pub duration_minutes: Option<i32>,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExerciseLog {
    pub log_date: NaiveDate,
    pub exercise_name: String,
    pub duration_minutes: Option<i32>,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub notes: Option<String>,
}

/// Inclusive date range with an optional name filter
#[derive(Debug, Clone)]
pub struct ExerciseSearch {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub exercise_name: Option<String>,
}
