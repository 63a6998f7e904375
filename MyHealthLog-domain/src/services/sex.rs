use std::sync::Arc;

use chrono::NaiveDate;
use my_health_log_data::models::sex::{SexLog, SexLogInput, SexLogSaved};
use my_health_log_data::repository::SexRepository;

use crate::error::{found, ServiceError};
use crate::services::trimmed;

/// One intimacy log per day, keyed by date
#[derive(Clone)]
pub struct SexService {
    repository: Arc<dyn SexRepository>,
}

impl SexService {
    pub fn new(repository: Arc<dyn SexRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<SexLog>, ServiceError> {
        Ok(self.repository.list(user_id).await?)
    }

    /// Insert the day's log or overwrite the existing one
    pub async fn save(&self, user_id: i64, log: SexLogInput) -> Result<SexLogSaved, ServiceError> {
        let log = SexLogInput {
            log_date: log.log_date,
            protection_method: trimmed(log.protection_method),
        };
        Ok(self.repository.save(user_id, log).await?)
    }

    pub async fn delete(&self, user_id: i64, date: NaiveDate) -> Result<(), ServiceError> {
        found(self.repository.delete_by_date(user_id, date).await?, "未找到相关记录。")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use my_health_log_data::repository::InMemoryStorage;

    #[tokio::test]
    async fn test_second_save_updates_same_day() {
        let sex = SexService::new(Arc::new(InMemoryStorage::new()));
        let day = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let log = |method: &str| SexLogInput {
            log_date: day,
            protection_method: Some(method.to_string()),
        };

        let SexLogSaved::Inserted(id) = sex.save(1, log("condom")).await.unwrap() else {
            panic!("first save should insert");
        };
        assert_eq!(sex.save(1, log("none")).await.unwrap(), SexLogSaved::Updated(id));

        let logs = sex.list(1).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].protection_method.as_deref(), Some("none"));

        sex.delete(1, day).await.unwrap();
        assert!(matches!(sex.delete(1, day).await, Err(ServiceError::NotFound(_))));
    }
}
