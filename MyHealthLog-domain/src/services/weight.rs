use std::sync::Arc;

use chrono::NaiveDateTime;
use my_health_log_data::models::weight::{NewWeightLog, WeightLog};
use my_health_log_data::repository::{UserRepository, WeightRepository};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{found, ServiceError};

/// Entries shown on the weight chart
pub const RECENT_WEIGHTS: i64 = 15;

/// Recent weights plus the user's height, for BMI on the client
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeightOverview {
    pub weights: Vec<WeightLog>,
    pub height: Option<f64>,
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[derive(Clone)]
pub struct WeightService {
    weights: Arc<dyn WeightRepository>,
    users: Arc<dyn UserRepository>,
}

impl WeightService {
    pub fn new(weights: Arc<dyn WeightRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { weights, users }
    }

    /// Latest entries in chronological order with the stored height
    pub async fn overview(&self, user_id: i64) -> Result<WeightOverview, ServiceError> {
        let weights = self.weights.recent(user_id, RECENT_WEIGHTS).await?;
        let height = self.users.find_by_id(user_id).await?.and_then(|u| u.height_cm);
        Ok(WeightOverview { weights, height })
    }

    pub async fn history(
        &self,
        user_id: i64,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<WeightLog>, ServiceError> {
        let (Some(start), Some(end)) = (start, end) else {
            return Err(ServiceError::validation("必须提供开始和结束日期时间"));
        };
        if start > end {
            return Err(ServiceError::validation("开始时间不能晚于结束时间"));
        }
        Ok(self.weights.between(user_id, start, end).await?)
    }

    pub async fn record(&self, user_id: i64, weight: f64, log_datetime: NaiveDateTime) -> Result<WeightLog, ServiceError> {
        if !positive(weight) {
            return Err(ServiceError::validation("体重必须为正数"));
        }
        Ok(self.weights.create(user_id, NewWeightLog { log_datetime, weight }).await?)
    }

    pub async fn set_height(&self, user_id: i64, height_cm: f64) -> Result<(), ServiceError> {
        if !positive(height_cm) {
            return Err(ServiceError::validation("无效的身高值"));
        }
        found(self.users.set_height(user_id, height_cm).await?, "用户未找到。")
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        found(self.weights.delete(user_id, id).await?, "未找到指定的记录")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use my_health_log_data::models::user::NewUser;
    use my_health_log_data::repository::InMemoryStorage;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    async fn setup() -> (WeightService, i64) {
        let storage = InMemoryStorage::new();
        let user = UserRepository::create(
            &storage,
            NewUser {
                username: "wendy".to_string(),
                email: None,
                password_hash: None,
                provider: None,
            },
        )
        .await
        .unwrap();
        let storage = Arc::new(storage);
        (WeightService::new(storage.clone(), storage), user.id)
    }

    #[tokio::test]
    async fn test_overview_keeps_latest_fifteen_ascending() {
        let (weights, user) = setup().await;
        for day in 1..=20 {
            weights.record(user, 60.0 + day as f64 / 10.0, at(day, 8)).await.unwrap();
        }
        weights.set_height(user, 170.5).await.unwrap();

        let overview = weights.overview(user).await.unwrap();
        assert_eq!(overview.weights.len(), 15);
        assert_eq!(overview.weights[0].log_datetime, at(6, 8));
        assert_eq!(overview.weights[14].log_datetime, at(20, 8));
        assert_eq!(overview.height, Some(170.5));
    }

    #[tokio::test]
    async fn test_rejects_non_positive_values() {
        let (weights, user) = setup().await;
        assert!(matches!(weights.record(user, 0.0, at(1, 1)).await, Err(ServiceError::Validation(_))));
        assert!(matches!(weights.record(user, f64::NAN, at(1, 1)).await, Err(ServiceError::Validation(_))));
        assert!(matches!(weights.set_height(user, -3.0).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_history_is_inclusive() {
        let (weights, user) = setup().await;
        weights.record(user, 70.0, at(1, 8)).await.unwrap();
        let last = weights.record(user, 71.0, at(2, 8)).await.unwrap();

        assert_eq!(weights.history(user, Some(at(1, 8)), Some(at(2, 8))).await.unwrap().len(), 2);
        assert!(matches!(weights.history(user, None, Some(at(2, 8))).await, Err(ServiceError::Validation(_))));

        weights.delete(user, last.id).await.unwrap();
        assert!(matches!(weights.delete(user, last.id).await, Err(ServiceError::NotFound(_))));
    }
}
