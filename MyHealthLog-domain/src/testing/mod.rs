// Testing utilities for the domain layer
// This module is only available when the "mock" feature is enabled

pub use my_health_log_data::repository::InMemoryStorage;

use my_health_log_data::models::user::{NewUser, User};
use my_health_log_data::repository::{Repositories, UserRepository};

use crate::auth::password::hash_password;
use crate::config::AppConfig;
use crate::services::Services;

/// Signing secret used by every test configuration
pub const TEST_JWT_SECRET: &str = "test-secret-for-my-health-log";

/// Password given to users created by [`TestContext::user`]
pub const TEST_PASSWORD: &str = "password123";

/// Configuration with no OAuth providers and no ShowAPI credentials
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::new(TEST_JWT_SECRET);
    config.frontend_url = "http://localhost:8080".to_string();
    config
}

/// Services over an in-memory store the test can also reach directly
#[derive(Clone)]
pub struct TestContext {
    pub services: Services,
    pub storage: InMemoryStorage,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(&test_config())
    }

    pub fn with_config(config: &AppConfig) -> Self {
        let storage = InMemoryStorage::new();
        let services = Services::new(Repositories::from_storage(storage.clone()), config);
        Self { services, storage }
    }

    /// Create a password user with [`TEST_PASSWORD`]
    pub async fn user(&self, username: &str) -> User {
        let password_hash = hash_password(TEST_PASSWORD).expect("hash test password");
        UserRepository::create(
            &self.storage,
            NewUser {
                username: username.to_string(),
                email: Some(format!("{}@example.com", username)),
                password_hash: Some(password_hash),
                provider: None,
            },
        )
        .await
        .expect("create test user")
    }

    /// Create a user holding the admin flag
    pub async fn admin(&self, username: &str) -> User {
        let user = self.user(username).await;
        UserRepository::set_admin(&self.storage, user.id, true)
            .await
            .expect("promote test user");
        User { is_admin: true, ..user }
    }

    /// A valid bearer token for `user_id`
    pub fn token(&self, user_id: i64) -> String {
        self.services.tokens.generate(user_id).expect("sign test token")
    }
}
