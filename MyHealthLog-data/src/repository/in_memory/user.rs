use async_trait::async_trait;
use chrono::Utc;

use super::InMemoryStorage;
use crate::models::user::{NewUser, OAuthProvider, UsageStats, User};
use crate::repository::errors::RepositoryError;
use crate::repository::user::UserRepository;

fn set_provider(user: &mut User, provider: OAuthProvider, id: String) {
    match provider {
        OAuthProvider::LinuxDo => user.linuxdo_id = Some(id),
        OAuthProvider::Google => user.google_id = Some(id),
        OAuthProvider::Github => user.github_id = Some(id),
    }
}

#[async_trait]
impl UserRepository for InMemoryStorage {
    async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.lock()?;

        let clash = tables.users.iter().any(|u| {
            u.username == new_user.username
                || (new_user.email.is_some() && u.email == new_user.email)
                || new_user
                    .provider
                    .as_ref()
                    .is_some_and(|(p, id)| u.provider_id(*p) == Some(id.as_str()))
        });
        if clash {
            return Err(RepositoryError::Duplicate(new_user.username));
        }

        let mut user = User {
            id: tables.next_id(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            is_admin: false,
            show_womens_health: false,
            height_cm: None,
            linuxdo_id: None,
            google_id: None,
            github_id: None,
            created_at: Utc::now(),
            last_login_at: None,
        };
        if let Some((provider, id)) = new_user.provider {
            set_provider(&mut user, provider, id);
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .iter()
            .find(|u| u.username == login || u.email.as_deref() == Some(login))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.users.iter().find(|u| u.email.as_deref() == Some(email)).cloned())
    }

    async fn find_by_provider(
        &self,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .iter()
            .find(|u| u.provider_id(provider) == Some(provider_id))
            .cloned())
    }

    async fn identity_taken(
        &self,
        username: &str,
        email: Option<&str>,
        exclude: Option<i64>,
    ) -> Result<bool, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.users.iter().any(|u| {
            Some(u.id) != exclude
                && (u.username == username || (email.is_some() && u.email.as_deref() == email))
        }))
    }

    async fn link_provider(
        &self,
        user_id: i64,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) {
            set_provider(user, provider, provider_id.to_string());
        }
        Ok(())
    }

    async fn record_login(&self, user_id: i64) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: i64,
        username: &str,
        email: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        match tables.users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.username = username.to_string();
                user.email = email.map(str::to_string);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        match tables.users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.password_hash = Some(password_hash.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_settings(&self, user_id: i64, show_womens_health: bool) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        match tables.users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.show_womens_health = show_womens_health;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_height(&self, user_id: i64, height_cm: f64) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        match tables.users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.height_cm = Some(height_cm);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_admin(&self, user_id: i64, is_admin: bool) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        match tables.users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.is_admin = is_admin;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let tables = self.lock()?;
        let mut users = tables.users.clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn delete(&self, user_id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        Ok(tables.cascade_user(user_id))
    }

    async fn usage_stats(&self) -> Result<UsageStats, RepositoryError> {
        let tables = self.lock()?;
        let count = |n: usize| n as i64;
        Ok(UsageStats {
            users: count(tables.users.len()),
            admins: count(tables.users.iter().filter(|u| u.is_admin).count()),
            medications: count(tables.medications.len()),
            medication_logs: count(tables.medication_logs.len()),
            daily_logs: count(tables.daily_logs.len()),
            exercise_logs: count(tables.exercise_logs.len()),
            transactions: count(tables.transactions.len()),
            loans: count(tables.loans.len()),
            memos: count(tables.memos.len()),
            menstrual_records: count(tables.menstrual_records.len()),
            sex_logs: count(tables.sex_logs.len()),
            stool_logs: count(tables.stool_logs.len()),
            weight_logs: count(tables.weight_logs.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: Option<&str>) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.map(str::to_string),
            password_hash: Some("hash".to_string()),
            provider: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let storage = InMemoryStorage::new();
        storage.create(new_user("alice", Some("a@example.com"))).await.unwrap();
        let err = storage.create(new_user("alice", None)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_login_matches_username_or_email() {
        let storage = InMemoryStorage::new();
        let user = storage.create(new_user("bob", Some("bob@example.com"))).await.unwrap();
        assert_eq!(storage.find_by_login("bob").await.unwrap().unwrap().id, user.id);
        assert_eq!(storage.find_by_login("bob@example.com").await.unwrap().unwrap().id, user.id);
        assert!(storage.find_by_login("carol").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identity_taken_ignores_excluded_user() {
        let storage = InMemoryStorage::new();
        let user = storage.create(new_user("dave", Some("d@example.com"))).await.unwrap();
        assert!(storage.identity_taken("dave", None, None).await.unwrap());
        assert!(!storage.identity_taken("dave", Some("d@example.com"), Some(user.id)).await.unwrap());
    }

    #[tokio::test]
    async fn test_provider_link_and_lookup() {
        let storage = InMemoryStorage::new();
        let user = storage.create(new_user("erin", None)).await.unwrap();
        storage.link_provider(user.id, OAuthProvider::Github, "gh-42").await.unwrap();
        let found = storage.find_by_provider(OAuthProvider::Github, "gh-42").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(storage.find_by_provider(OAuthProvider::Google, "gh-42").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_cascades_and_repeats_as_missing() {
        let storage = InMemoryStorage::new();
        let user = storage.create(new_user("frank", None)).await.unwrap();
        storage.set_admin(user.id, true).await.unwrap();
        assert_eq!(storage.usage_stats().await.unwrap().admins, 1);
        assert!(storage.delete(user.id).await.unwrap());
        assert!(!storage.delete(user.id).await.unwrap());
        assert_eq!(storage.usage_stats().await.unwrap().users, 0);
    }
}
