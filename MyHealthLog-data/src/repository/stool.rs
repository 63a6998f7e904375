use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use super::errors::RepositoryError;
use crate::models::stool::{DailyCount, StoolLog, StoolLogInput};

const STOOL_COLUMNS: &str = "id, user_id, log_date, stool_type, notes, created_at";

/// Repository trait for bowel movement logs
#[async_trait]
pub trait StoolRepository: Send + Sync {
    /// Logs newest first, optionally limited to an inclusive range
    async fn list(&self, user_id: i64, range: Option<(NaiveDate, NaiveDate)>) -> Result<Vec<StoolLog>, RepositoryError>;

    /// Distinct days with at least one log, newest first
    async fn dates(&self, user_id: i64) -> Result<Vec<NaiveDate>, RepositoryError>;

    /// Entry count per day inside an inclusive range
    async fn daily_counts(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyCount>, RepositoryError>;

    async fn create(&self, user_id: i64, log: StoolLogInput) -> Result<StoolLog, RepositoryError>;

    /// Replace a log; `None` when no row matched
    async fn update(&self, user_id: i64, id: i64, log: StoolLogInput) -> Result<Option<StoolLog>, RepositoryError>;

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError>;
}

/// MySQL implementation of [`StoolRepository`]
#[derive(Debug, Clone)]
pub struct MySqlStoolRepository {
    pool: MySqlPool,
}

impl MySqlStoolRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find(&self, user_id: i64, id: i64) -> Result<Option<StoolLog>, RepositoryError> {
        let query = format!("SELECT {STOOL_COLUMNS} FROM stool_logs WHERE id = ? AND user_id = ?");
        let log = sqlx::query_as::<_, StoolLog>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(log)
    }
}

#[async_trait]
impl StoolRepository for MySqlStoolRepository {
    async fn list(&self, user_id: i64, range: Option<(NaiveDate, NaiveDate)>) -> Result<Vec<StoolLog>, RepositoryError> {
        let mut builder: QueryBuilder<MySql> =
            QueryBuilder::new(format!("SELECT {STOOL_COLUMNS} FROM stool_logs WHERE user_id = "));
        builder.push_bind(user_id);
        if let Some((start, end)) = range {
            builder.push(" AND log_date BETWEEN ");
            builder.push_bind(start);
            builder.push(" AND ");
            builder.push_bind(end);
        }
        builder.push(" ORDER BY log_date DESC, id DESC");

        let logs = builder.build_query_as::<StoolLog>().fetch_all(&self.pool).await?;
        Ok(logs)
    }

    async fn dates(&self, user_id: i64) -> Result<Vec<NaiveDate>, RepositoryError> {
        let dates: Vec<NaiveDate> = sqlx::query_scalar(
            "SELECT DISTINCT log_date FROM stool_logs WHERE user_id = ? ORDER BY log_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(dates)
    }

    async fn daily_counts(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyCount>, RepositoryError> {
        let counts = sqlx::query_as::<_, DailyCount>(
            "SELECT log_date, COUNT(*) AS count FROM stool_logs \
             WHERE user_id = ? AND log_date BETWEEN ? AND ? \
             GROUP BY log_date ORDER BY log_date ASC",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    async fn create(&self, user_id: i64, log: StoolLogInput) -> Result<StoolLog, RepositoryError> {
        let result = sqlx::query("INSERT INTO stool_logs (user_id, log_date, stool_type, notes) VALUES (?, ?, ?, ?)")
            .bind(user_id)
            .bind(log.log_date)
            .bind(&log.stool_type)
            .bind(&log.notes)
            .execute(&self.pool)
            .await?;

        self.find(user_id, result.last_insert_id() as i64)
            .await?
            .ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))
    }

    async fn update(&self, user_id: i64, id: i64, log: StoolLogInput) -> Result<Option<StoolLog>, RepositoryError> {
        let result = sqlx::query(
            "UPDATE stool_logs SET log_date = ?, stool_type = ?, notes = ? WHERE id = ? AND user_id = ?",
        )
        .bind(log.log_date)
        .bind(&log.stool_type)
        .bind(&log.notes)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find(user_id, id).await
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM stool_logs WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
