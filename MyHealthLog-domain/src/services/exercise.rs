use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use my_health_log_data::models::exercise::{ExerciseLog, ExerciseSearch, NewExerciseLog};
use my_health_log_data::repository::ExerciseRepository;

use crate::error::{found, ServiceError};
use crate::services::{date_range, non_blank, trimmed};

#[derive(Clone)]
pub struct ExerciseService {
    repository: Arc<dyn ExerciseRepository>,
}

/// First and last day of a calendar month
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

impl ExerciseService {
    pub fn new(repository: Arc<dyn ExerciseRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, user_id: i64, log: NewExerciseLog) -> Result<ExerciseLog, ServiceError> {
        let Some(exercise_name) = non_blank(&log.exercise_name).map(String::from) else {
            return Err(ServiceError::validation("日期和运动名称是必填项"));
        };
        if [log.duration_minutes, log.sets, log.reps]
            .into_iter()
            .flatten()
            .any(|value| value < 0)
        {
            return Err(ServiceError::validation("时长、组数和次数不能为负数"));
        }
        let log = NewExerciseLog {
            exercise_name,
            notes: trimmed(log.notes),
            ..log
        };
        Ok(self.repository.create(user_id, log).await?)
    }

    /// Logs in an inclusive date range, optionally filtered by name, oldest first
    pub async fn search(
        &self,
        user_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        exercise_name: Option<String>,
    ) -> Result<Vec<ExerciseLog>, ServiceError> {
        let (start_date, end_date) = date_range(start, end, "开始日期和结束日期是必填项")?;
        let search = ExerciseSearch {
            start_date,
            end_date,
            exercise_name: trimmed(exercise_name),
        };
        Ok(self.repository.search(user_id, search).await?)
    }

    pub async fn for_date(&self, user_id: i64, date: NaiveDate) -> Result<Vec<ExerciseLog>, ServiceError> {
        Ok(self.repository.for_date(user_id, date).await?)
    }

    /// Days of a month that have at least one log
    pub async fn month_summary(&self, user_id: i64, year: i32, month: u32) -> Result<Vec<NaiveDate>, ServiceError> {
        let (first, last) = month_bounds(year, month).ok_or_else(|| ServiceError::validation("无效的年份或月份"))?;
        let mut dates = self.repository.active_dates(user_id, first, last).await?;
        dates.retain(|d| d.year() == year && d.month() == month);
        Ok(dates)
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        found(self.repository.delete(user_id, id).await?, "未找到记录或无权删除")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use my_health_log_data::repository::InMemoryStorage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn run(on: NaiveDate, name: &str) -> NewExerciseLog {
        NewExerciseLog {
            log_date: on,
            exercise_name: name.to_string(),
            duration_minutes: Some(30),
            sets: None,
            reps: None,
            notes: None,
        }
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(2024, 2), Some((date(2024, 2, 1), date(2024, 2, 29))));
        assert_eq!(month_bounds(2023, 12), Some((date(2023, 12, 1), date(2023, 12, 31))));
        assert_eq!(month_bounds(2024, 13), None);
        assert_eq!(month_bounds(2024, 0), None);
    }

    #[tokio::test]
    async fn test_search_filters_range_and_name() {
        let exercise = ExerciseService::new(Arc::new(InMemoryStorage::new()));
        exercise.create(1, run(date(2024, 1, 3), "Running")).await.unwrap();
        exercise.create(1, run(date(2024, 1, 1), "Swimming")).await.unwrap();
        exercise.create(1, run(date(2024, 2, 1), "Running")).await.unwrap();

        let found = exercise
            .search(1, Some(date(2024, 1, 1)), Some(date(2024, 1, 31)), None)
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].log_date, date(2024, 1, 1));

        let found = exercise
            .search(1, Some(date(2024, 1, 1)), Some(date(2024, 12, 31)), Some("run".to_string()))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);

        assert!(matches!(
            exercise.search(1, None, Some(date(2024, 1, 31)), None).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_month_summary_lists_active_days() {
        let exercise = ExerciseService::new(Arc::new(InMemoryStorage::new()));
        exercise.create(1, run(date(2024, 2, 29), "Yoga")).await.unwrap();
        exercise.create(1, run(date(2024, 2, 29), "Walk")).await.unwrap();
        exercise.create(1, run(date(2024, 3, 1), "Walk")).await.unwrap();

        assert_eq!(exercise.month_summary(1, 2024, 2).await.unwrap(), vec![date(2024, 2, 29)]);
        assert!(matches!(exercise.month_summary(1, 2024, 13).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let exercise = ExerciseService::new(Arc::new(InMemoryStorage::new()));
        assert!(matches!(
            exercise.create(1, run(date(2024, 1, 1), " ")).await,
            Err(ServiceError::Validation(_))
        ));
        let log = exercise.create(1, run(date(2024, 1, 1), "Row")).await.unwrap();
        exercise.delete(1, log.id).await.unwrap();
        assert!(matches!(exercise.delete(1, log.id).await, Err(ServiceError::NotFound(_))));
    }
}
