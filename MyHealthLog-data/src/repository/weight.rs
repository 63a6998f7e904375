use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::MySqlPool;

use super::errors::RepositoryError;
use crate::models::weight::{NewWeightLog, WeightLog};

/// Repository trait for weight measurements
#[async_trait]
pub trait WeightRepository: Send + Sync {
    /// The `count` most recent measurements, returned oldest first
    async fn recent(&self, user_id: i64, count: i64) -> Result<Vec<WeightLog>, RepositoryError>;

    /// Measurements inside an inclusive range, oldest first
    async fn between(
        &self,
        user_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<WeightLog>, RepositoryError>;

    async fn create(&self, user_id: i64, log: NewWeightLog) -> Result<WeightLog, RepositoryError>;

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError>;
}

/// MySQL implementation of [`WeightRepository`]
#[derive(Debug, Clone)]
pub struct MySqlWeightRepository {
    pool: MySqlPool,
}

impl MySqlWeightRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WeightRepository for MySqlWeightRepository {
    async fn recent(&self, user_id: i64, count: i64) -> Result<Vec<WeightLog>, RepositoryError> {
        let logs = sqlx::query_as::<_, WeightLog>(
            "SELECT id, user_id, log_datetime, weight FROM ( \
                SELECT id, user_id, log_datetime, weight FROM weight_logs \
                WHERE user_id = ? ORDER BY log_datetime DESC, id DESC LIMIT ? \
             ) recent ORDER BY log_datetime ASC, id ASC",
        )
        .bind(user_id)
        .bind(count)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    async fn between(
        &self,
        user_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<WeightLog>, RepositoryError> {
        let logs = sqlx::query_as::<_, WeightLog>(
            "SELECT id, user_id, log_datetime, weight FROM weight_logs \
             WHERE user_id = ? AND log_datetime BETWEEN ? AND ? ORDER BY log_datetime ASC, id ASC",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    async fn create(&self, user_id: i64, log: NewWeightLog) -> Result<WeightLog, RepositoryError> {
        let result = sqlx::query("INSERT INTO weight_logs (user_id, log_datetime, weight) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(log.log_datetime)
            .bind(log.weight)
            .execute(&self.pool)
            .await?;

        Ok(WeightLog {
            id: result.last_insert_id() as i64,
            user_id,
            log_datetime: log.log_datetime,
            weight: log.weight,
        })
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM weight_logs WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
