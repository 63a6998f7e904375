use async_trait::async_trait;
use sqlx::MySqlPool;

use super::errors::RepositoryError;
use crate::models::memo::{Memo, NewMemo};

const MEMO_COLUMNS: &str = "id, user_id, task_name, priority, is_completed, created_at, completed_at";

/// Repository trait for to-do memos
#[async_trait]
pub trait MemoRepository: Send + Sync {
    /// Open memos first, then by priority, then newest
    async fn list(&self, user_id: i64) -> Result<Vec<Memo>, RepositoryError>;

    async fn create(&self, user_id: i64, memo: NewMemo) -> Result<Memo, RepositoryError>;

    /// Set or clear completion; the timestamp follows the flag
    async fn set_completed(&self, user_id: i64, id: i64, completed: bool) -> Result<bool, RepositoryError>;

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError>;

    /// Completed memos whose name contains `term`, most recently completed first
    async fn search_completed(&self, user_id: i64, term: &str) -> Result<Vec<Memo>, RepositoryError>;
}

/// MySQL implementation of [`MemoRepository`]
#[derive(Debug, Clone)]
pub struct MySqlMemoRepository {
    pool: MySqlPool,
}

impl MySqlMemoRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemoRepository for MySqlMemoRepository {
    async fn list(&self, user_id: i64) -> Result<Vec<Memo>, RepositoryError> {
        let query = format!(
            "SELECT {MEMO_COLUMNS} FROM memos WHERE user_id = ? \
             ORDER BY is_completed ASC, FIELD(priority, 'high', 'medium', 'low') ASC, created_at DESC, id DESC"
        );
        let memos = sqlx::query_as::<_, Memo>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(memos)
    }

    async fn create(&self, user_id: i64, memo: NewMemo) -> Result<Memo, RepositoryError> {
        let result = sqlx::query("INSERT INTO memos (user_id, task_name, priority) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(&memo.task_name)
            .bind(memo.priority.as_str())
            .execute(&self.pool)
            .await?;

        let query = format!("SELECT {MEMO_COLUMNS} FROM memos WHERE id = ?");
        let saved = sqlx::query_as::<_, Memo>(&query)
            .bind(result.last_insert_id() as i64)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn set_completed(&self, user_id: i64, id: i64, completed: bool) -> Result<bool, RepositoryError> {
        let query = if completed {
            "UPDATE memos SET is_completed = TRUE, completed_at = CURRENT_TIMESTAMP WHERE id = ? AND user_id = ?"
        } else {
            "UPDATE memos SET is_completed = FALSE, completed_at = NULL WHERE id = ? AND user_id = ?"
        };
        let result = sqlx::query(query)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM memos WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_completed(&self, user_id: i64, term: &str) -> Result<Vec<Memo>, RepositoryError> {
        let query = format!(
            "SELECT {MEMO_COLUMNS} FROM memos \
             WHERE user_id = ? AND is_completed = TRUE AND task_name LIKE ? \
             ORDER BY completed_at DESC, id DESC"
        );
        let memos = sqlx::query_as::<_, Memo>(&query)
            .bind(user_id)
            .bind(format!("%{}%", term))
            .fetch_all(&self.pool)
            .await?;
        Ok(memos)
    }
}
