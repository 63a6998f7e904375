use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A to-do item
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Memo {
    pub id: i64,
    pub user_id: i64,
    pub task_name: String,
    pub priority: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemoPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl MemoPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoPriority::High => "high",
            MemoPriority::Medium => "medium",
            MemoPriority::Low => "low",
        }
    }

    /// Sort position, most urgent first. Unknown values sort last.
    pub fn rank(value: &str) -> u8 {
        match value {
            "high" => 0,
            "medium" => 1,
            "low" => 2,
            _ => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMemo {
    pub task_name: String,
    pub priority: MemoPriority,
}
