use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthEventType {
    /// Password login attempt
    Login,
    /// Account registration
    Registration,
    /// OAuth provider callback
    OAuthCallback,
    /// Bearer token check
    TokenValidation,
    /// Access denied to resource
    AccessDenied,
    /// Password set or changed
    PasswordChange,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::Login => write!(f, "LOGIN"),
            AuthEventType::Registration => write!(f, "REGISTRATION"),
            AuthEventType::OAuthCallback => write!(f, "OAUTH_CALLBACK"),
            AuthEventType::TokenValidation => write!(f, "TOKEN_VALIDATION"),
            AuthEventType::AccessDenied => write!(f, "ACCESS_DENIED"),
            AuthEventType::PasswordChange => write!(f, "PASSWORD_CHANGE"),
        }
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// User id or submitted login, if known
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub details: Option<String>,
    /// Request path or provider involved
    pub resource: Option<String>,
    /// password, jwt, or the OAuth provider name
    pub auth_method: Option<String>,
}

impl AuthEvent {
    /// Create a new authentication event
    pub fn new(event_type: AuthEventType, user_id: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            user_id: user_id.map(String::from),
            timestamp: Utc::now(),
            success,
            details: None,
            resource: None,
            auth_method: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }
}

/// Log an authentication event
pub fn log_auth_event(event: AuthEvent) {
    let user_id = event.user_id.as_deref().unwrap_or("anonymous");
    let status = if event.success { "SUCCESS" } else { "FAILURE" };
    let details = event.details.as_deref().unwrap_or("");

    if event.success {
        info!(
            "AUTH-LOG [{}] [{}] [{}] [{}] {}",
            event.event_type,
            user_id,
            status,
            event.timestamp.to_rfc3339(),
            details
        );
    } else {
        warn!(
            "AUTH-LOG [{}] [{}] [{}] [{}] {}",
            event.event_type,
            user_id,
            status,
            event.timestamp.to_rfc3339(),
            details
        );
    }
}

/// Log a password login
pub fn log_login(login: &str, success: bool, details: &str) {
    log_auth_event(
        AuthEvent::new(AuthEventType::Login, Some(login), success)
            .with_details(details)
            .with_auth_method("password"),
    );
}

/// Log an access denied event
pub fn log_access_denied(user_id: &str, resource: &str, reason: &str) {
    log_auth_event(
        AuthEvent::new(AuthEventType::AccessDenied, Some(user_id), false)
            .with_details(reason)
            .with_resource(resource),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder_sets_fields() {
        let event = AuthEvent::new(AuthEventType::OAuthCallback, Some("7"), true)
            .with_details("linked by email")
            .with_resource("/api/auth/github/callback")
            .with_auth_method("github");
        assert_eq!(event.user_id.as_deref(), Some("7"));
        assert_eq!(event.auth_method.as_deref(), Some("github"));
        assert_eq!(event.event_type.to_string(), "OAUTH_CALLBACK");
        log_auth_event(event);
    }
}
