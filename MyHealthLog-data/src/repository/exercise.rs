use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use super::errors::RepositoryError;
use crate::models::exercise::{ExerciseLog, ExerciseSearch, NewExerciseLog};

const EXERCISE_COLUMNS: &str =
    "id, user_id, log_date, exercise_name, duration_minutes, sets, reps, notes, created_at";

/// Repository trait for workout logs
#[async_trait]
pub trait ExerciseRepository: Send + Sync {
    async fn create(&self, user_id: i64, log: NewExerciseLog) -> Result<ExerciseLog, RepositoryError>;

    /// Logs inside an inclusive date range, oldest first
    async fn search(&self, user_id: i64, search: ExerciseSearch) -> Result<Vec<ExerciseLog>, RepositoryError>;

    /// Logs of one day in creation order
    async fn for_date(&self, user_id: i64, date: NaiveDate) -> Result<Vec<ExerciseLog>, RepositoryError>;

    /// Distinct days with at least one log in `[first, last]`
    async fn active_dates(
        &self,
        user_id: i64,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<NaiveDate>, RepositoryError>;

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError>;
}

/// MySQL implementation of [`ExerciseRepository`]
#[derive(Debug, Clone)]
pub struct MySqlExerciseRepository {
    pool: MySqlPool,
}

impl MySqlExerciseRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExerciseRepository for MySqlExerciseRepository {
    async fn create(&self, user_id: i64, log: NewExerciseLog) -> Result<ExerciseLog, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO exercise_logs (user_id, log_date, exercise_name, duration_minutes, sets, reps, notes) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(log.log_date)
        .bind(&log.exercise_name)
        .bind(log.duration_minutes)
        .bind(log.sets)
        .bind(log.reps)
        .bind(&log.notes)
        .execute(&self.pool)
        .await?;

        let query = format!("SELECT {EXERCISE_COLUMNS} FROM exercise_logs WHERE id = ?");
        let saved = sqlx::query_as::<_, ExerciseLog>(&query)
            .bind(result.last_insert_id() as i64)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn search(&self, user_id: i64, search: ExerciseSearch) -> Result<Vec<ExerciseLog>, RepositoryError> {
        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercise_logs WHERE user_id = "
        ));
        builder.push_bind(user_id);
        builder.push(" AND log_date BETWEEN ");
        builder.push_bind(search.start_date);
        builder.push(" AND ");
        builder.push_bind(search.end_date);

        if let Some(name) = search.exercise_name.filter(|n| !n.trim().is_empty()) {
            builder.push(" AND exercise_name LIKE ");
            builder.push_bind(format!("%{}%", name.trim()));
        }

        builder.push(" ORDER BY log_date ASC, created_at ASC, id ASC");

        let logs = builder
            .build_query_as::<ExerciseLog>()
            .fetch_all(&self.pool)
            .await?;
        Ok(logs)
    }

    async fn for_date(&self, user_id: i64, date: NaiveDate) -> Result<Vec<ExerciseLog>, RepositoryError> {
        let query = format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercise_logs \
             WHERE user_id = ? AND log_date = ? ORDER BY created_at ASC, id ASC"
        );
        let logs = sqlx::query_as::<_, ExerciseLog>(&query)
            .bind(user_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;
        Ok(logs)
    }

    async fn active_dates(
        &self,
        user_id: i64,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<NaiveDate>, RepositoryError> {
        let dates: Vec<NaiveDate> = sqlx::query_scalar(
            "SELECT DISTINCT log_date FROM exercise_logs \
             WHERE user_id = ? AND log_date BETWEEN ? AND ? ORDER BY log_date ASC",
        )
        .bind(user_id)
        .bind(first)
        .bind(last)
        .fetch_all(&self.pool)
        .await?;
        Ok(dates)
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM exercise_logs WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
