use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use my_health_log_data::models::stool::{StoolLog, StoolLogInput};
use my_health_log_data::repository::StoolRepository;

use crate::error::{found, ServiceError};
use crate::services::{date_range, trimmed};

#[derive(Clone)]
pub struct StoolService {
    repository: Arc<dyn StoolRepository>,
}

impl StoolService {
    pub fn new(repository: Arc<dyn StoolRepository>) -> Self {
        Self { repository }
    }

    fn clean(input: StoolLogInput) -> StoolLogInput {
        StoolLogInput {
            log_date: input.log_date,
            stool_type: trimmed(input.stool_type),
            notes: trimmed(input.notes),
        }
    }

    /// Logs newest first; the range applies only when both ends are given
    pub async fn list(
        &self,
        user_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<StoolLog>, ServiceError> {
        let range = start.zip(end);
        Ok(self.repository.list(user_id, range).await?)
    }

    /// Distinct days that have at least one log, newest first
    pub async fn dates(&self, user_id: i64) -> Result<Vec<NaiveDate>, ServiceError> {
        Ok(self.repository.dates(user_id).await?)
    }

    /// Number of logs per day in an inclusive range
    pub async fn summary(
        &self,
        user_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<BTreeMap<NaiveDate, i64>, ServiceError> {
        let (start, end) = date_range(start, end, "必须提供开始和结束日期。")?;
        let counts = self.repository.daily_counts(user_id, start, end).await?;
        Ok(counts.into_iter().map(|c| (c.log_date, c.count)).collect())
    }

    pub async fn create(&self, user_id: i64, input: StoolLogInput) -> Result<StoolLog, ServiceError> {
        Ok(self.repository.create(user_id, Self::clean(input)).await?)
    }

    pub async fn update(&self, user_id: i64, id: i64, input: StoolLogInput) -> Result<StoolLog, ServiceError> {
        self.repository
            .update(user_id, id, Self::clean(input))
            .await?
            .ok_or_else(|| ServiceError::not_found("记录未找到或无权限修改。"))
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        found(self.repository.delete(user_id, id).await?, "记录未找到或无权限删除。")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use my_health_log_data::repository::InMemoryStorage;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn log(d: u32) -> StoolLogInput {
        StoolLogInput {
            log_date: day(d),
            stool_type: Some("4".to_string()),
            notes: Some("  ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_range_requires_both_ends() {
        let stool = StoolService::new(Arc::new(InMemoryStorage::new()));
        stool.create(1, log(1)).await.unwrap();
        stool.create(1, log(10)).await.unwrap();

        assert_eq!(stool.list(1, Some(day(5)), None).await.unwrap().len(), 2);
        assert_eq!(stool.list(1, Some(day(5)), Some(day(31))).await.unwrap().len(), 1);
        assert!(matches!(stool.summary(1, Some(day(1)), None).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_summary_counts_per_day() {
        let stool = StoolService::new(Arc::new(InMemoryStorage::new()));
        stool.create(1, log(2)).await.unwrap();
        stool.create(1, log(2)).await.unwrap();
        stool.create(1, log(3)).await.unwrap();
        stool.create(2, log(3)).await.unwrap();

        let summary = stool.summary(1, Some(day(1)), Some(day(31))).await.unwrap();
        assert_eq!(summary.get(&day(2)), Some(&2));
        assert_eq!(summary.get(&day(3)), Some(&1));
        assert_eq!(stool.dates(1).await.unwrap(), vec![day(3), day(2)]);
    }

    #[tokio::test]
    async fn test_update_and_delete_are_scoped() {
        let stool = StoolService::new(Arc::new(InMemoryStorage::new()));
        let created = stool.create(1, log(4)).await.unwrap();
        assert_eq!(created.notes, None);

        assert!(matches!(stool.update(2, created.id, log(5)).await, Err(ServiceError::NotFound(_))));
        let updated = stool.update(1, created.id, log(5)).await.unwrap();
        assert_eq!(updated.log_date, day(5));

        stool.delete(1, created.id).await.unwrap();
        assert!(matches!(stool.delete(1, created.id).await, Err(ServiceError::NotFound(_))));
    }
}
