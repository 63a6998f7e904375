//! Application configuration read from the environment
//!
//! Everything except `JWT_SECRET` has a default. OAuth providers are enabled
//! only when their client id, secret and redirect URI are all present.

use std::collections::HashMap;
use std::env;

use chrono::Duration;
use my_health_log_data::models::user::OAuthProvider;
use tracing::{info, warn};

use crate::error::ServiceError;

/// Default JWT issuer
pub const DEFAULT_JWT_ISSUER: &str = "MyHealthLog-api";

/// Default token lifetime in days
pub const DEFAULT_JWT_EXPIRATION_DAYS: i64 = 7;

/// Default ShowAPI gateway
pub const DEFAULT_SHOWAPI_BASE_URL: &str = "https://route.showapi.com";

/// Token signing settings
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub expiration: Duration,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: DEFAULT_JWT_ISSUER.to_string(),
            expiration: Duration::days(DEFAULT_JWT_EXPIRATION_DAYS),
        }
    }
}

/// Endpoints and credentials of one OAuth provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub user_info_url: String,
    pub scopes: Vec<String>,
}

impl ProviderConfig {
    /// Fixed endpoints for a provider, credentials filled in by the caller
    pub fn defaults(provider: OAuthProvider) -> Self {
        let (authorize_url, token_url, user_info_url, scopes): (&str, &str, &str, &[&str]) = match provider {
            OAuthProvider::LinuxDo => (
                "https://connect.linux.do/oauth2/authorize",
                "https://connect.linux.do/oauth2/token",
                "https://connect.linux.do/api/user",
                &["read"],
            ),
            OAuthProvider::Google => (
                "https://accounts.google.com/o/oauth2/v2/auth",
                "https://oauth2.googleapis.com/token",
                "https://www.googleapis.com/oauth2/v2/userinfo",
                &["email", "profile"],
            ),
            OAuthProvider::Github => (
                "https://github.com/login/oauth/authorize",
                "https://github.com/login/oauth/access_token",
                "https://api.github.com/user",
                &["user:email"],
            ),
        };
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            authorize_url: authorize_url.to_string(),
            token_url: token_url.to_string(),
            user_info_url: user_info_url.to_string(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn from_env(provider: OAuthProvider) -> Option<Self> {
        let prefix = match provider {
            OAuthProvider::LinuxDo => "LINUX_DO",
            OAuthProvider::Google => "GOOGLE",
            OAuthProvider::Github => "GITHUB",
        };
        let var = |name: &str| env::var(format!("{}_{}", prefix, name)).ok().filter(|v| !v.trim().is_empty());

        let (Some(client_id), Some(client_secret), Some(redirect_uri)) =
            (var("CLIENT_ID"), var("CLIENT_SECRET"), var("REDIRECT_URI"))
        else {
            warn!("OAuth provider {} is not configured and will be disabled", provider);
            return None;
        };

        let mut config = Self::defaults(provider);
        config.client_id = client_id;
        config.client_secret = client_secret;
        config.redirect_uri = redirect_uri;
        // Linux.do endpoints may be overridden, the others are fixed
        if provider == OAuthProvider::LinuxDo {
            if let Some(url) = var("AUTHORIZE_URL") {
                config.authorize_url = url;
            }
            if let Some(url) = var("TOKEN_URL") {
                config.token_url = url;
            }
            if let Some(url) = var("USER_INFO_URL") {
                config.user_info_url = url;
            }
        }
        Some(config)
    }
}

/// ShowAPI credentials. Lookups fail with a configuration error when unset.
#[derive(Debug, Clone)]
pub struct ShowApiConfig {
    pub base_url: String,
    pub app_id: Option<String>,
    pub app_key: Option<String>,
}

impl Default for ShowApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SHOWAPI_BASE_URL.to_string(),
            app_id: None,
            app_key: None,
        }
    }
}

/// Settings shared by the services
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    pub frontend_url: String,
    pub providers: HashMap<OAuthProvider, ProviderConfig>,
    pub showapi: ShowApiConfig,
}

impl AppConfig {
    /// Configuration with only a signing secret, every integration disabled
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt: JwtConfig::new(jwt_secret),
            frontend_url: String::new(),
            providers: HashMap::new(),
            showapi: ShowApiConfig::default(),
        }
    }

    /// Read configuration from environment variables
    pub fn from_env() -> Result<Self, ServiceError> {
        let secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::Configuration("JWT_SECRET environment variable not found".to_string()))?;

        let mut jwt = JwtConfig::new(secret);
        if let Ok(issuer) = env::var("JWT_ISSUER") {
            jwt.issuer = issuer;
        }
        let days = env::var("JWT_EXPIRATION_DAYS")
            .ok()
            .and_then(|d| d.parse::<i64>().ok())
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_JWT_EXPIRATION_DAYS);
        jwt.expiration = Duration::days(days);

        let frontend_url = env::var("FRONTEND_URL")
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();

        let providers: HashMap<_, _> = OAuthProvider::ALL
            .into_iter()
            .filter_map(|p| ProviderConfig::from_env(p).map(|c| (p, c)))
            .collect();

        let showapi = ShowApiConfig {
            base_url: env::var("SHOWAPI_BASE_URL").unwrap_or_else(|_| DEFAULT_SHOWAPI_BASE_URL.to_string()),
            app_id: env::var("SHOWAPI_APPID").ok().filter(|v| !v.is_empty()),
            app_key: env::var("SHOWAPI_APPKEY").ok().filter(|v| !v.is_empty()),
        };

        info!(
            "Configuration loaded: token lifetime {} days, {} OAuth provider(s), ShowAPI {}",
            days,
            providers.len(),
            if showapi.app_id.is_some() && showapi.app_key.is_some() { "enabled" } else { "disabled" }
        );

        Ok(Self {
            jwt,
            frontend_url,
            providers,
            showapi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_defaults_carry_scopes() {
        assert_eq!(ProviderConfig::defaults(OAuthProvider::LinuxDo).scopes, vec!["read"]);
        assert_eq!(ProviderConfig::defaults(OAuthProvider::Google).scopes, vec!["email", "profile"]);
        assert_eq!(ProviderConfig::defaults(OAuthProvider::Github).scopes, vec!["user:email"]);
    }

    #[test]
    fn test_new_config_disables_integrations() {
        let config = AppConfig::new("secret");
        assert!(config.providers.is_empty());
        assert!(config.showapi.app_id.is_none());
        assert_eq!(config.jwt.expiration, Duration::days(7));
        assert_eq!(config.jwt.issuer, "MyHealthLog-api");
    }
}
