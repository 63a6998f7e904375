use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Default pain level for a new record
pub const DEFAULT_PAIN_LEVEL: &str = "无";

/// Default flow volume for a new record
pub const DEFAULT_FLOW_VOLUME: &str = "正常";

/// A menstrual period record
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MenstrualRecord {
    pub id: i64,
    pub user_id: i64,
    pub start_date: NaiveDate,
    /// `None` while the period is ongoing
    pub end_date: Option<NaiveDate>,
    pub pain_level: Option<String>,
    pub flow_volume: Option<String>,
    pub notes: Option<String>,
    pub color: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMenstrualRecord {
    pub start_date: NaiveDate,
    pub pain_level: String,
    pub flow_volume: String,
    pub notes: Option<String>,
    pub color: Option<String>,
    pub state: Option<String>,
}

/// Partial update. The outer `Option` marks presence, the inner one allows
/// clearing a column to `NULL`.
#[derive(Debug, Clone, Default)]
pub struct MenstrualRecordPatch {
    pub end_date: Option<Option<NaiveDate>>,
    pub pain_level: Option<Option<String>>,
    pub flow_volume: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub color: Option<Option<String>>,
    pub state: Option<Option<String>>,
}

impl MenstrualRecordPatch {
    pub fn is_empty(&self) -> bool {
        self.end_date.is_none()
            && self.pain_level.is_none()
            && self.flow_volume.is_none()
            && self.notes.is_none()
            && self.color.is_none()
            && self.state.is_none()
    }

    /// Apply to an in-memory record
    pub fn apply(&self, record: &mut MenstrualRecord) {
        if let Some(end_date) = self.end_date {
            record.end_date = end_date;
        }
        if let Some(pain_level) = &self.pain_level {
            record.pain_level = pain_level.clone();
        }
        if let Some(flow_volume) = &self.flow_volume {
            record.flow_volume = flow_volume.clone();
        }
        if let Some(notes) = &self.notes {
            record.notes = notes.clone();
        }
        if let Some(color) = &self.color {
            record.color = color.clone();
        }
        if let Some(state) = &self.state {
            record.state = state.clone();
        }
    }
}
