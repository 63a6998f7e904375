use async_trait::async_trait;
use sqlx::MySqlPool;
use tracing::debug;

use super::errors::RepositoryError;
use crate::models::user::{NewUser, OAuthProvider, UsageStats, User};

/// Column list for `users` queries.
const USER_COLUMNS: &str = "\
    id, username, email, password_hash, is_admin, show_womens_health, height_cm, \
    linuxdo_id, google_id, github_id, created_at, last_login_at";

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return the stored row
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError>;

    /// Look a user up by username or email
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_provider(
        &self,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> Result<Option<User>, RepositoryError>;

    /// Whether another user (other than `exclude`) already holds the username or email
    async fn identity_taken(
        &self,
        username: &str,
        email: Option<&str>,
        exclude: Option<i64>,
    ) -> Result<bool, RepositoryError>;

    async fn link_provider(
        &self,
        user_id: i64,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> Result<(), RepositoryError>;

    /// Stamp `last_login_at` with the current time
    async fn record_login(&self, user_id: i64) -> Result<(), RepositoryError>;

    async fn update_profile(
        &self,
        user_id: i64,
        username: &str,
        email: Option<&str>,
    ) -> Result<bool, RepositoryError>;

    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<bool, RepositoryError>;

    async fn update_settings(&self, user_id: i64, show_womens_health: bool) -> Result<bool, RepositoryError>;

    async fn set_height(&self, user_id: i64, height_cm: f64) -> Result<bool, RepositoryError>;

    async fn set_admin(&self, user_id: i64, is_admin: bool) -> Result<bool, RepositoryError>;

    /// All users, newest first
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;

    /// Delete a user; owned rows cascade
    async fn delete(&self, user_id: i64) -> Result<bool, RepositoryError>;

    async fn usage_stats(&self) -> Result<UsageStats, RepositoryError>;
}

/// MySQL implementation of [`UserRepository`]
#[derive(Debug, Clone)]
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, condition: &str, value: &str) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE {condition} LIMIT 1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let provider_id = |p: OAuthProvider| {
            user.provider
                .as_ref()
                .filter(|(provider, _)| *provider == p)
                .map(|(_, id)| id.as_str())
        };

        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, linuxdo_id, google_id, github_id) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(user.email.as_deref())
        .bind(user.password_hash.as_deref())
        .bind(provider_id(OAuthProvider::LinuxDo))
        .bind(provider_id(OAuthProvider::Google))
        .bind(provider_id(OAuthProvider::Github))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id() as i64;
        debug!("Created user {} ({})", id, user.username);

        self.find_by_id(id)
            .await?
            .ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ? OR email = ? LIMIT 1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(login)
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        self.find_one("username = ?", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.find_one("email = ?", email).await
    }

    async fn find_by_provider(
        &self,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let condition = format!("{} = ?", provider.id_column());
        self.find_one(&condition, provider_id).await
    }

    async fn identity_taken(
        &self,
        username: &str,
        email: Option<&str>,
        exclude: Option<i64>,
    ) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users \
             WHERE (username = ? OR (? IS NOT NULL AND email = ?)) AND id <> ?",
        )
        .bind(username)
        .bind(email)
        .bind(email)
        .bind(exclude.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn link_provider(
        &self,
        user_id: i64,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> Result<(), RepositoryError> {
        let query = format!("UPDATE users SET {} = ? WHERE id = ?", provider.id_column());
        sqlx::query(&query)
            .bind(provider_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_login(&self, user_id: i64) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET last_login_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: i64,
        username: &str,
        email: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE users SET username = ?, email = ? WHERE id = ?")
            .bind(username)
            .bind(email)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_settings(&self, user_id: i64, show_womens_health: bool) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE users SET show_womens_health = ? WHERE id = ?")
            .bind(show_womens_health)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_height(&self, user_id: i64, height_cm: f64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE users SET height_cm = ? WHERE id = ?")
            .bind(height_cm)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_admin(&self, user_id: i64, is_admin: bool) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE users SET is_admin = ? WHERE id = ?")
            .bind(is_admin)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC");
        let users = sqlx::query_as::<_, User>(&query).fetch_all(&self.pool).await?;
        Ok(users)
    }

    async fn delete(&self, user_id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn usage_stats(&self) -> Result<UsageStats, RepositoryError> {
        let stats = sqlx::query_as::<_, UsageStats>(
            "SELECT \
                (SELECT COUNT(*) FROM users) AS users, \
                (SELECT COUNT(*) FROM users WHERE is_admin = TRUE) AS admins, \
                (SELECT COUNT(*) FROM medications) AS medications, \
                (SELECT COUNT(*) FROM medication_logs) AS medication_logs, \
                (SELECT COUNT(*) FROM daily_logs) AS daily_logs, \
                (SELECT COUNT(*) FROM exercise_logs) AS exercise_logs, \
                (SELECT COUNT(*) FROM transactions) AS transactions, \
                (SELECT COUNT(*) FROM loans) AS loans, \
                (SELECT COUNT(*) FROM memos) AS memos, \
                (SELECT COUNT(*) FROM menstrual_records) AS menstrual_records, \
                (SELECT COUNT(*) FROM sex_logs) AS sex_logs, \
                (SELECT COUNT(*) FROM stool_logs) AS stool_logs, \
                (SELECT COUNT(*) FROM weight_logs) AS weight_logs",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
