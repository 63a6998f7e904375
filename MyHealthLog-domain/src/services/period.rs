use std::sync::Arc;

use my_health_log_data::models::period::{
    MenstrualRecord, MenstrualRecordPatch, NewMenstrualRecord, DEFAULT_FLOW_VOLUME, DEFAULT_PAIN_LEVEL,
};
use my_health_log_data::repository::PeriodRepository;

use crate::error::{found, ServiceError};
use crate::services::cycle::{predict_cycle, CyclePrediction};
use crate::services::{non_blank, trimmed};

/// Menstrual records and cycle prediction
#[derive(Clone)]
pub struct PeriodService {
    repository: Arc<dyn PeriodRepository>,
}

impl PeriodService {
    pub fn new(repository: Arc<dyn PeriodRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<MenstrualRecord>, ServiceError> {
        Ok(self.repository.list(user_id).await?)
    }

    /// Start a new period; blank pain and flow fall back to their defaults
    pub async fn create(&self, user_id: i64, record: NewMenstrualRecord) -> Result<MenstrualRecord, ServiceError> {
        let record = NewMenstrualRecord {
            start_date: record.start_date,
            pain_level: non_blank(&record.pain_level).unwrap_or(DEFAULT_PAIN_LEVEL).to_string(),
            flow_volume: non_blank(&record.flow_volume).unwrap_or(DEFAULT_FLOW_VOLUME).to_string(),
            notes: trimmed(record.notes),
            color: trimmed(record.color),
            state: trimmed(record.state),
        };
        Ok(self.repository.create(user_id, record).await?)
    }

    /// Apply the supplied fields; an explicit `null` clears a field
    pub async fn update(&self, user_id: i64, id: i64, patch: MenstrualRecordPatch) -> Result<(), ServiceError> {
        if patch.is_empty() {
            return Err(ServiceError::validation("没有提供任何需要更新的信息。"));
        }
        if let Some(Some(end_date)) = patch.end_date {
            let record = self.find(user_id, id).await?;
            if end_date < record.start_date {
                return Err(ServiceError::validation("结束日期不能早于开始日期。"));
            }
        }
        found(
            self.repository.update(user_id, id, patch).await?,
            "未找到相关记录，或您无权修改。",
        )
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        found(self.repository.delete(user_id, id).await?, "未找到相关记录，或您无权删除。")
    }

    pub async fn predict(&self, user_id: i64) -> Result<CyclePrediction, ServiceError> {
        let history: Vec<_> = self
            .repository
            .list(user_id)
            .await?
            .into_iter()
            .map(|r| (r.start_date, r.end_date))
            .collect();
        Ok(predict_cycle(&history))
    }

    async fn find(&self, user_id: i64, id: i64) -> Result<MenstrualRecord, ServiceError> {
        self.repository
            .list(user_id)
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| ServiceError::not_found("未找到相关记录，或您无权修改。"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use my_health_log_data::repository::InMemoryStorage;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn start(on: NaiveDate) -> NewMenstrualRecord {
        NewMenstrualRecord {
            start_date: on,
            pain_level: String::new(),
            flow_volume: " ".to_string(),
            notes: None,
            color: None,
            state: None,
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let periods = PeriodService::new(Arc::new(InMemoryStorage::new()));
        let record = periods.create(1, start(d(1, 1))).await.unwrap();
        assert_eq!(record.pain_level.as_deref(), Some(DEFAULT_PAIN_LEVEL));
        assert_eq!(record.flow_volume.as_deref(), Some(DEFAULT_FLOW_VOLUME));
        assert_eq!(record.end_date, None);
    }

    #[tokio::test]
    async fn test_update_rules() {
        let periods = PeriodService::new(Arc::new(InMemoryStorage::new()));
        let record = periods.create(1, start(d(1, 10))).await.unwrap();

        assert!(matches!(
            periods.update(1, record.id, MenstrualRecordPatch::default()).await,
            Err(ServiceError::Validation(_))
        ));

        let early_end = MenstrualRecordPatch {
            end_date: Some(Some(d(1, 5))),
            ..Default::default()
        };
        assert!(matches!(periods.update(1, record.id, early_end).await, Err(ServiceError::Validation(_))));

        let end = MenstrualRecordPatch {
            end_date: Some(Some(d(1, 14))),
            ..Default::default()
        };
        assert!(matches!(periods.update(2, record.id, end.clone()).await, Err(ServiceError::NotFound(_))));
        periods.update(1, record.id, end).await.unwrap();

        let clear = MenstrualRecordPatch {
            end_date: Some(None),
            ..Default::default()
        };
        periods.update(1, record.id, clear).await.unwrap();
        assert_eq!(periods.list(1).await.unwrap()[0].end_date, None);
    }

    #[tokio::test]
    async fn test_predict_uses_stored_history() {
        let periods = PeriodService::new(Arc::new(InMemoryStorage::new()));
        assert!(periods.predict(1).await.unwrap().message.is_some());

        periods.create(1, start(d(1, 1))).await.unwrap();
        periods.create(1, start(d(1, 29))).await.unwrap();
        let prediction = periods.predict(1).await.unwrap();
        assert_eq!(prediction.average_cycle_length, 28);
        assert_eq!(prediction.next_period_start_date, Some(d(2, 26)));
    }
}
