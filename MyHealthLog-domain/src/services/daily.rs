use std::sync::Arc;

use chrono::NaiveDate;
use my_health_log_data::models::daily::{DailyItem, DailyItemType, DailyLog, DailyLogInput, NewDailyItem};
use my_health_log_data::repository::DailyRepository;

use crate::error::{found, ServiceError};
use crate::services::{non_blank, trimmed};

/// Check-in items and their per-day logs
#[derive(Clone)]
pub struct DailyService {
    repository: Arc<dyn DailyRepository>,
}

impl DailyService {
    pub fn new(repository: Arc<dyn DailyRepository>) -> Self {
        Self { repository }
    }

    pub async fn items(&self, user_id: i64) -> Result<Vec<DailyItem>, ServiceError> {
        Ok(self.repository.list_items(user_id).await?)
    }

    pub async fn create_item(
        &self,
        user_id: i64,
        item_name: &str,
        item_type: DailyItemType,
    ) -> Result<DailyItem, ServiceError> {
        let Some(item_name) = non_blank(item_name) else {
            return Err(ServiceError::validation("项目名称和类型不能为空"));
        };
        let item = NewDailyItem {
            item_name: item_name.to_string(),
            item_type,
        };
        Ok(self.repository.create_item(user_id, item).await?)
    }

    /// Delete an item together with every log recorded under its name
    pub async fn delete_item(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        found(self.repository.delete_item(user_id, id).await?, "未找到要删除的项目")
    }

    /// Mark a one-time item completed; daily items cannot be completed
    pub async fn complete_item(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        found(
            self.repository.complete_item(user_id, id).await?,
            "未找到或无法更新该任务（可能不是一次性任务）",
        )
    }

    pub async fn logs_for_date(&self, user_id: i64, date: NaiveDate) -> Result<Vec<DailyLog>, ServiceError> {
        Ok(self.repository.logs_for_date(user_id, date).await?)
    }

    /// Insert or replace the log for (date, item)
    pub async fn save_log(&self, user_id: i64, input: DailyLogInput) -> Result<DailyLog, ServiceError> {
        let Some(item_name) = non_blank(&input.item_name).map(String::from) else {
            return Err(ServiceError::validation("项目名称不能为空"));
        };
        let log = DailyLogInput {
            log_date: input.log_date,
            item_name,
            status: trimmed(input.status),
            notes: trimmed(input.notes),
        };
        Ok(self.repository.upsert_log(user_id, log).await?)
    }

    /// Logs whose item name or notes contain `term`
    pub async fn search(&self, user_id: i64, term: &str) -> Result<Vec<DailyLog>, ServiceError> {
        let Some(term) = non_blank(term) else {
            return Err(ServiceError::validation("搜索内容不能为空"));
        };
        Ok(self.repository.search_logs(user_id, term).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use my_health_log_data::models::daily::ITEM_COMPLETED;
    use my_health_log_data::repository::InMemoryStorage;

    fn service() -> DailyService {
        DailyService::new(Arc::new(InMemoryStorage::new()))
    }

    fn log(item: &str, notes: Option<&str>) -> DailyLogInput {
        DailyLogInput {
            log_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            item_name: item.to_string(),
            status: Some("done".to_string()),
            notes: notes.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_only_one_time_items_complete() {
        let daily = service();
        let habit = daily.create_item(1, "Stretch", DailyItemType::Daily).await.unwrap();
        let task = daily.create_item(1, "Book dentist", DailyItemType::OneTime).await.unwrap();

        assert!(matches!(daily.complete_item(1, habit.id).await, Err(ServiceError::NotFound(_))));
        daily.complete_item(1, task.id).await.unwrap();

        let items = daily.items(1).await.unwrap();
        let task = items.iter().find(|i| i.id == task.id).unwrap();
        assert_eq!(task.status.as_deref(), Some(ITEM_COMPLETED));
    }

    #[tokio::test]
    async fn test_delete_item_removes_its_logs() {
        let daily = service();
        let item = daily.create_item(1, "Water", DailyItemType::Daily).await.unwrap();
        daily.save_log(1, log("Water", Some("8 cups"))).await.unwrap();

        daily.delete_item(1, item.id).await.unwrap();
        assert!(daily.search(1, "cups").await.unwrap().is_empty());
        assert!(matches!(daily.delete_item(1, item.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_search_requires_term() {
        let daily = service();
        daily.save_log(1, log("Walk", Some("park loop"))).await.unwrap();
        assert!(matches!(daily.search(1, "  ").await, Err(ServiceError::Validation(_))));
        assert_eq!(daily.search(1, "park").await.unwrap().len(), 1);
        assert!(daily.search(2, "park").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_log_overwrites_same_day_item() {
        let daily = service();
        daily.save_log(1, log("Walk", Some("first"))).await.unwrap();
        let saved = daily.save_log(1, log("Walk", Some("second"))).await.unwrap();
        assert_eq!(saved.notes.as_deref(), Some("second"));

        let logs = daily.logs_for_date(1, saved.log_date).await.unwrap();
        assert_eq!(logs.len(), 1);
    }
}
