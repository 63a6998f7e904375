//! Account registration, password login, profile maintenance and OAuth sign-in

use std::sync::Arc;

use my_health_log_data::models::user::{NewUser, OAuthProvider, User};
use my_health_log_data::repository::{RepositoryError, UserRepository};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use crate::auth::logging::{log_auth_event, log_login, AuthEvent, AuthEventType};
use crate::auth::oauth::{OAuthError, OAuthProviders, ProviderProfile};
use crate::auth::password::{hash_password, is_strong_enough, verify_password};
use crate::auth::token::TokenService;
use crate::error::ServiceError;
use crate::services::non_blank;

/// Upper bound on `_n` suffixes tried when an OAuth username is taken
const MAX_USERNAME_SUFFIX: u32 = 1000;

/// The caller's own account as shown to them
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub has_password: bool,
    pub is_admin: bool,
    pub show_womens_health: bool,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            has_password: user.has_password(),
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
            show_womens_health: user.show_womens_health,
        }
    }
}

/// Outcome of a password change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordChange {
    Changed,
    /// First password on an OAuth-only account
    Set,
}

async fn hash_blocking(password: String) -> Result<String, ServiceError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ServiceError::Upstream(format!("password hashing task failed: {}", e)))?
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            ServiceError::Upstream("password hashing failed".to_string())
        })
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, ServiceError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ServiceError::Upstream(format!("password verification task failed: {}", e)))?
        .map_err(|e| {
            error!("Password verification failed: {}", e);
            ServiceError::Upstream("password verification failed".to_string())
        })
}

/// Authentication and account service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
    oauth: Arc<OAuthProviders>,
    frontend_url: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenService>,
        oauth: Arc<OAuthProviders>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            tokens,
            oauth,
            frontend_url: frontend_url.into(),
        }
    }

    fn issue_token(&self, user_id: i64) -> Result<String, ServiceError> {
        self.tokens
            .generate(user_id)
            .map_err(|e| ServiceError::Upstream(e.to_string()))
    }

    /// Register a password account and return a session token
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<String, ServiceError> {
        let (Some(username), Some(email)) = (non_blank(username), non_blank(email)) else {
            return Err(ServiceError::validation("所有字段均为必填项。"));
        };
        if password.is_empty() {
            return Err(ServiceError::validation("所有字段均为必填项。"));
        }
        if !is_strong_enough(password) {
            return Err(ServiceError::validation("密码至少需要 6 个字符。"));
        }

        if self.users.identity_taken(username, Some(email), None).await? {
            log_auth_event(
                AuthEvent::new(AuthEventType::Registration, Some(username), false)
                    .with_details("username or email already registered"),
            );
            return Err(ServiceError::conflict("用户名或邮箱已存在。"));
        }

        let password_hash = hash_blocking(password.to_string()).await?;
        let user = self
            .users
            .create(NewUser {
                username: username.to_string(),
                email: Some(email.to_string()),
                password_hash: Some(password_hash),
                provider: None,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Duplicate(_) => ServiceError::conflict("用户名或邮箱已存在。"),
                other => other.into(),
            })?;

        log_auth_event(
            AuthEvent::new(AuthEventType::Registration, Some(&user.id.to_string()), true)
                .with_auth_method("password"),
        );
        self.issue_token(user.id)
    }

    /// Sign in with a username or email and password
    #[instrument(skip(self, password))]
    pub async fn login(&self, login: &str, password: &str) -> Result<String, ServiceError> {
        let Some(login) = non_blank(login) else {
            return Err(ServiceError::validation("用户名和密码不能为空。"));
        };
        if password.is_empty() {
            return Err(ServiceError::validation("用户名和密码不能为空。"));
        }

        let invalid = || ServiceError::Unauthorized("用户名或密码错误。".to_string());

        let Some(user) = self.users.find_by_login(login).await? else {
            log_login(login, false, "unknown user");
            return Err(invalid());
        };
        let Some(hash) = user.password_hash.clone().filter(|h| !h.is_empty()) else {
            log_login(login, false, "account has no password");
            return Err(invalid());
        };
        if !verify_blocking(password.to_string(), hash).await? {
            log_login(login, false, "wrong password");
            return Err(invalid());
        }

        self.users.record_login(user.id).await?;
        log_login(&user.id.to_string(), true, "password verified");
        self.issue_token(user.id)
    }

    pub async fn me(&self, user_id: i64) -> Result<UserProfile, ServiceError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| ServiceError::not_found("用户未找到。"))
    }

    /// Change username and email; both must stay unique
    #[instrument(skip(self))]
    pub async fn update_profile(&self, user_id: i64, username: &str, email: &str) -> Result<UserProfile, ServiceError> {
        let (Some(username), Some(email)) = (non_blank(username), non_blank(email)) else {
            return Err(ServiceError::validation("用户名和邮箱不能为空。"));
        };

        if self.users.identity_taken(username, Some(email), Some(user_id)).await? {
            return Err(ServiceError::conflict("用户名或邮箱已被其他用户占用。"));
        }

        let updated = self
            .users
            .update_profile(user_id, username, Some(email))
            .await
            .map_err(|e| match e {
                RepositoryError::Duplicate(_) => ServiceError::conflict("用户名或邮箱已被其他用户占用。"),
                other => other.into(),
            })?;
        if !updated {
            return Err(ServiceError::not_found("用户未找到。"));
        }
        self.me(user_id).await
    }

    /// Change the password, or set a first one on an OAuth-only account
    #[instrument(skip(self, old_password, new_password))]
    pub async fn change_password(
        &self,
        user_id: i64,
        old_password: Option<&str>,
        new_password: &str,
    ) -> Result<PasswordChange, ServiceError> {
        if !is_strong_enough(new_password) {
            return Err(ServiceError::validation("新密码至少需要 6 个字符。"));
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("用户未找到。"))?;

        let outcome = match user.password_hash.filter(|h| !h.is_empty()) {
            Some(hash) => {
                let Some(old_password) = old_password.filter(|p| !p.is_empty()) else {
                    return Err(ServiceError::validation("请输入旧密码以进行验证。"));
                };
                if !verify_blocking(old_password.to_string(), hash).await? {
                    log_auth_event(
                        AuthEvent::new(AuthEventType::PasswordChange, Some(&user_id.to_string()), false)
                            .with_details("old password mismatch"),
                    );
                    return Err(ServiceError::Unauthorized("旧密码错误。".to_string()));
                }
                PasswordChange::Changed
            }
            None => PasswordChange::Set,
        };

        let new_hash = hash_blocking(new_password.to_string()).await?;
        self.users.update_password(user_id, &new_hash).await?;
        log_auth_event(
            AuthEvent::new(AuthEventType::PasswordChange, Some(&user_id.to_string()), true)
                .with_details(format!("{:?}", outcome)),
        );
        Ok(outcome)
    }

    pub async fn update_settings(&self, user_id: i64, show_womens_health: bool) -> Result<(), ServiceError> {
        if !self.users.update_settings(user_id, show_womens_health).await? {
            return Err(ServiceError::not_found("用户未找到。"));
        }
        Ok(())
    }

    fn login_error_redirect(&self, error: &str) -> String {
        format!("{}/#/login?error={}", self.frontend_url, error)
    }

    /// Where to send the browser to start an OAuth login
    pub fn authorization_redirect(&self, provider: OAuthProvider) -> String {
        match self.oauth.authorize_url(provider) {
            Ok(url) => url,
            Err(OAuthError::ProviderDisabled(_)) => {
                warn!("Login attempted through disabled provider {}", provider);
                self.login_error_redirect("provider_disabled")
            }
            Err(e) => {
                error!("Could not build {} authorization URL: {}", provider, e);
                self.login_error_redirect("auth_failed")
            }
        }
    }

    /// Finish an OAuth login and return the frontend URL to redirect to
    #[instrument(skip(self, code, state))]
    pub async fn oauth_callback(&self, provider: OAuthProvider, code: Option<&str>, state: Option<&str>) -> String {
        if !self.oauth.is_enabled(provider) {
            return self.login_error_redirect("provider_disabled");
        }
        let Some(code) = code.filter(|c| !c.is_empty()) else {
            return self.login_error_redirect("no_code");
        };

        let result = async {
            self.oauth.verify_state(provider, state)?;
            let profile = self.oauth.fetch_profile(provider, code).await?;
            Ok::<_, OAuthError>(profile)
        }
        .await;

        let profile = match result {
            Ok(profile) => profile,
            Err(e) => {
                log_auth_event(
                    AuthEvent::new(AuthEventType::OAuthCallback, None, false)
                        .with_details(e.to_string())
                        .with_auth_method(provider.as_str()),
                );
                return self.login_error_redirect("auth_failed");
            }
        };

        match self.sign_in_with_profile(&profile).await {
            Ok(token) => format!("{}/callback.html?token={}", self.frontend_url, token),
            Err(e) => {
                error!("{} sign-in failed: {}", provider, e);
                self.login_error_redirect("auth_failed")
            }
        }
    }

    /// Resolve a provider identity to a local user and issue a token.
    ///
    /// Looks the identity up by provider id, then links an account with the
    /// same email, and finally creates a new account.
    pub async fn sign_in_with_profile(&self, profile: &ProviderProfile) -> Result<String, ServiceError> {
        let provider = profile.provider;

        let (user_id, details) = if let Some(user) = self.users.find_by_provider(provider, &profile.provider_id).await? {
            (user.id, "existing identity")
        } else if let Some(user) = match profile.email.as_deref() {
            Some(email) => self.users.find_by_email(email).await?,
            None => None,
        } {
            self.users.link_provider(user.id, provider, &profile.provider_id).await?;
            (user.id, "linked by email")
        } else {
            let username = self.available_username(&profile.fallback_username()).await?;
            let user = self
                .users
                .create(NewUser {
                    username,
                    email: profile.email.clone(),
                    password_hash: None,
                    provider: Some((provider, profile.provider_id.clone())),
                })
                .await?;
            info!("Created user {} from {} login", user.id, provider);
            (user.id, "account created")
        };

        self.users.record_login(user_id).await?;
        log_auth_event(
            AuthEvent::new(AuthEventType::OAuthCallback, Some(&user_id.to_string()), true)
                .with_details(details)
                .with_auth_method(provider.as_str()),
        );
        self.issue_token(user_id)
    }

    async fn available_username(&self, base: &str) -> Result<String, ServiceError> {
        if !self.users.identity_taken(base, None, None).await? {
            return Ok(base.to_string());
        }
        for suffix in 1..=MAX_USERNAME_SUFFIX {
            let candidate = format!("{}_{}", base, suffix);
            if !self.users.identity_taken(&candidate, None, None).await? {
                return Ok(candidate);
            }
        }
        Err(ServiceError::conflict("用户名已存在。"))
    }
}
