use std::sync::Arc;

use my_health_log_data::models::user::{UsageStats, User};
use my_health_log_data::repository::UserRepository;
use tracing::{info, instrument};

use crate::error::{found, ServiceError};

/// User administration for accounts with the admin flag
#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserRepository>,
}

impl AdminService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn stats(&self) -> Result<UsageStats, ServiceError> {
        Ok(self.users.usage_stats().await?)
    }

    /// Every user, newest first; password hashes never serialize
    pub async fn users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.users.list().await?)
    }

    /// Grant or revoke admin rights. An admin cannot demote themself.
    #[instrument(skip(self))]
    pub async fn set_admin(&self, caller_id: i64, user_id: i64, is_admin: bool) -> Result<(), ServiceError> {
        if caller_id == user_id && !is_admin {
            return Err(ServiceError::conflict("不能取消自己的管理员权限。"));
        }
        found(self.users.set_admin(user_id, is_admin).await?, "用户未找到。")?;
        info!("User {} set admin={} for user {}", caller_id, is_admin, user_id);
        Ok(())
    }

    /// Delete a user and, through cascades, all of their data
    #[instrument(skip(self))]
    pub async fn delete_user(&self, caller_id: i64, user_id: i64) -> Result<(), ServiceError> {
        if caller_id == user_id {
            return Err(ServiceError::conflict("不能删除自己的账户。"));
        }
        found(self.users.delete(user_id).await?, "用户未找到。")?;
        info!("User {} deleted user {}", caller_id, user_id);
        Ok(())
    }

    /// Promote a user by username; used by the `set_admin` command
    pub async fn promote(&self, username: &str) -> Result<User, ServiceError> {
        let user = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("找不到用户名为 \"{}\" 的用户。", username)))?;
        if !user.is_admin {
            self.users.set_admin(user.id, true).await?;
        }
        Ok(User { is_admin: true, ..user })
    }
}
