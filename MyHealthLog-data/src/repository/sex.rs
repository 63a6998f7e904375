use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use super::errors::RepositoryError;
use crate::models::sex::{SexLog, SexLogInput, SexLogSaved};

/// Repository trait for intimacy logs, one row per user and day
#[async_trait]
pub trait SexRepository: Send + Sync {
    /// Entries newest first
    async fn list(&self, user_id: i64) -> Result<Vec<SexLog>, RepositoryError>;

    /// Insert the day's entry or overwrite the existing one
    async fn save(&self, user_id: i64, log: SexLogInput) -> Result<SexLogSaved, RepositoryError>;

    async fn delete_by_date(&self, user_id: i64, date: NaiveDate) -> Result<bool, RepositoryError>;
}

/// MySQL implementation of [`SexRepository`]
#[derive(Debug, Clone)]
pub struct MySqlSexRepository {
    pool: MySqlPool,
}

impl MySqlSexRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SexRepository for MySqlSexRepository {
    async fn list(&self, user_id: i64) -> Result<Vec<SexLog>, RepositoryError> {
        let logs = sqlx::query_as::<_, SexLog>(
            "SELECT id, log_date, protection_method FROM sex_logs WHERE user_id = ? ORDER BY log_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    async fn save(&self, user_id: i64, log: SexLogInput) -> Result<SexLogSaved, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM sex_logs WHERE user_id = ? AND log_date = ? FOR UPDATE")
                .bind(user_id)
                .bind(log.log_date)
                .fetch_optional(&mut *tx)
                .await?;

        let saved = match existing {
            Some(id) => {
                sqlx::query("UPDATE sex_logs SET protection_method = ? WHERE id = ?")
                    .bind(&log.protection_method)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                SexLogSaved::Updated(id)
            }
            None => {
                let result =
                    sqlx::query("INSERT INTO sex_logs (user_id, log_date, protection_method) VALUES (?, ?, ?)")
                        .bind(user_id)
                        .bind(log.log_date)
                        .bind(&log.protection_method)
                        .execute(&mut *tx)
                        .await?;
                SexLogSaved::Inserted(result.last_insert_id() as i64)
            }
        };

        tx.commit().await?;
        Ok(saved)
    }

    async fn delete_by_date(&self, user_id: i64, date: NaiveDate) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM sex_logs WHERE user_id = ? AND log_date = ?")
            .bind(user_id)
            .bind(date)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
