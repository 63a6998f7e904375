//! Authentication for the MyHealthLog API
//!
//! Provides JWT issuing and checking, password hashing, OAuth provider
//! clients and the middleware that guards `/api/*` routes.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::auth::logging::{log_auth_event, AuthEvent, AuthEventType};
use crate::auth::token::{SecurityError, TokenService};

pub mod authorize;
pub mod logging;
pub mod oauth;
pub mod password;
pub mod token;

/// Claims carried by session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Caller resolved from a valid bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Authentication middleware for protected routes
///
/// A missing bearer token is a 401; a token that fails verification is a 403.
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let request_path = req.uri().path().to_string();

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from);

    let Some(token) = token else {
        debug!("Missing bearer token for {}", request_path);
        log_auth_event(
            AuthEvent::new(AuthEventType::TokenValidation, None, false)
                .with_details("Missing Authorization header")
                .with_resource(request_path)
                .with_auth_method("jwt"),
        );
        return reject(StatusCode::UNAUTHORIZED, "未提供认证令牌");
    };

    match tokens.user_id(&token) {
        Ok(user_id) => {
            debug!("Token validated for user {} on {}", user_id, request_path);
            req.extensions_mut().insert(AuthUser { user_id });
            next.run(req).await
        }
        Err(e) => {
            let details = match e {
                SecurityError::TokenExpired => "JWT token has expired",
                _ => "JWT token is invalid",
            };
            log_auth_event(
                AuthEvent::new(AuthEventType::TokenValidation, None, false)
                    .with_details(details)
                    .with_resource(request_path)
                    .with_auth_method("jwt"),
            );
            reject(StatusCode::FORBIDDEN, "认证令牌无效或已过期")
        }
    }
}
