use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use super::errors::RepositoryError;
use crate::models::daily::{DailyItem, DailyItemType, DailyLog, DailyLogInput, NewDailyItem, ITEM_COMPLETED};

/// Maximum rows returned by a history search
pub const HISTORY_SEARCH_LIMIT: i64 = 50;

/// Repository trait for check-in items and daily logs
#[async_trait]
pub trait DailyRepository: Send + Sync {
    /// Items in creation order
    async fn list_items(&self, user_id: i64) -> Result<Vec<DailyItem>, RepositoryError>;

    async fn create_item(&self, user_id: i64, item: NewDailyItem) -> Result<DailyItem, RepositoryError>;

    /// Delete an item and every log recorded under its name
    async fn delete_item(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError>;

    /// Mark a one-time item completed. Daily items never match.
    async fn complete_item(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError>;

    async fn logs_for_date(&self, user_id: i64, date: NaiveDate) -> Result<Vec<DailyLog>, RepositoryError>;

    /// Insert or replace the log for `(date, item_name)`
    async fn upsert_log(&self, user_id: i64, log: DailyLogInput) -> Result<DailyLog, RepositoryError>;

    /// Logs whose item name or notes contain `term`, newest first
    async fn search_logs(&self, user_id: i64, term: &str) -> Result<Vec<DailyLog>, RepositoryError>;
}

/// MySQL implementation of [`DailyRepository`]
#[derive(Debug, Clone)]
pub struct MySqlDailyRepository {
    pool: MySqlPool,
}

impl MySqlDailyRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DailyRepository for MySqlDailyRepository {
    async fn list_items(&self, user_id: i64) -> Result<Vec<DailyItem>, RepositoryError> {
        let items = sqlx::query_as::<_, DailyItem>(
            "SELECT id, user_id, item_name, item_type, status, created_at FROM daily_items \
             WHERE user_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn create_item(&self, user_id: i64, item: NewDailyItem) -> Result<DailyItem, RepositoryError> {
        let result = sqlx::query("INSERT INTO daily_items (user_id, item_name, item_type) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(&item.item_name)
            .bind(item.item_type.as_str())
            .execute(&self.pool)
            .await?;

        let item = sqlx::query_as::<_, DailyItem>(
            "SELECT id, user_id, item_name, item_type, status, created_at FROM daily_items WHERE id = ?",
        )
        .bind(result.last_insert_id() as i64)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    async fn delete_item(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let name: Option<String> =
            sqlx::query_scalar("SELECT item_name FROM daily_items WHERE id = ? AND user_id = ? FOR UPDATE")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(name) = name else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM daily_logs WHERE user_id = ? AND item_name = ?")
            .bind(user_id)
            .bind(&name)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM daily_items WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn complete_item(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE daily_items SET status = ? WHERE id = ? AND user_id = ? AND item_type = ?",
        )
        .bind(ITEM_COMPLETED)
        .bind(id)
        .bind(user_id)
        .bind(DailyItemType::OneTime.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn logs_for_date(&self, user_id: i64, date: NaiveDate) -> Result<Vec<DailyLog>, RepositoryError> {
        let logs = sqlx::query_as::<_, DailyLog>(
            "SELECT id, user_id, log_date, item_name, status, notes FROM daily_logs \
             WHERE user_id = ? AND log_date = ? ORDER BY id ASC",
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    async fn upsert_log(&self, user_id: i64, log: DailyLogInput) -> Result<DailyLog, RepositoryError> {
        sqlx::query(
            "INSERT INTO daily_logs (user_id, log_date, item_name, status, notes) VALUES (?, ?, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE status = VALUES(status), notes = VALUES(notes)",
        )
        .bind(user_id)
        .bind(log.log_date)
        .bind(&log.item_name)
        .bind(&log.status)
        .bind(&log.notes)
        .execute(&self.pool)
        .await?;

        let saved = sqlx::query_as::<_, DailyLog>(
            "SELECT id, user_id, log_date, item_name, status, notes FROM daily_logs \
             WHERE user_id = ? AND log_date = ? AND item_name = ?",
        )
        .bind(user_id)
        .bind(log.log_date)
        .bind(&log.item_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }

    async fn search_logs(&self, user_id: i64, term: &str) -> Result<Vec<DailyLog>, RepositoryError> {
        let pattern = format!("%{}%", term);
        let logs = sqlx::query_as::<_, DailyLog>(
            "SELECT id, user_id, log_date, item_name, status, notes FROM daily_logs \
             WHERE user_id = ? AND (item_name LIKE ? OR notes LIKE ?) \
             ORDER BY log_date DESC, id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(HISTORY_SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }
}
