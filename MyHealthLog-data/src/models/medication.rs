use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A medication plan
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Medication {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    /// Units remaining; `None` means stock is not tracked
    pub stock: Option<i32>,
    /// Free-form schedule, usually a comma separated list of times
    pub medication_times: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields written when creating or replacing a medication plan
#[derive(Debug, Clone)]
pub struct MedicationInput {
    pub name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub stock: Option<i32>,
    pub medication_times: Option<String>,
}

/// One recorded dose
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MedicationLog {
    pub id: i64,
    pub user_id: i64,
    pub medication_id: i64,
    pub taken_at: DateTime<Utc>,
}

/// Result of recording a dose
#[derive(Debug, Clone)]
pub enum DoseOutcome {
    Recorded(MedicationLog),
    MedicationNotFound,
    InsufficientStock { available: i32 },
}
