use std::str::FromStr;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use my_health_log_data::models::user::OAuthProvider;
use my_health_log_domain::auth::AuthUser;
use my_health_log_domain::services::auth::{PasswordChange, UserProfile};
use my_health_log_domain::ServiceError;
use tracing::instrument;

use super::AppState;
use crate::api::error::ApiResult;
use crate::api::extract::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::entities::auth::{
    ChangePasswordRequest, LoginRequest, OAuthCallbackQuery, RegisterRequest, SettingsRequest, TokenResponse,
    UpdateProfileRequest,
};
use crate::entities::common::MessageResponse;

fn provider(name: &str) -> ApiResult<OAuthProvider> {
    OAuthProvider::from_str(name).map_err(|_| ServiceError::not_found("不支持的登录方式").into())
}

/// 302 to an absolute URL
fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Register a password account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Missing field or short password", body = ErrorResponse),
        (status = 409, description = "Username or email taken", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    let token = state
        .auth
        .register(
            request.username.as_deref().unwrap_or_default(),
            request.email.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token,
            message: "注册成功！".to_string(),
        }),
    ))
}

/// Log in with a username or email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = TokenResponse),
        (status = 400, description = "Missing credentials", body = ErrorResponse),
        (status = 401, description = "Wrong credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = state
        .auth
        .login(
            request.username.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(TokenResponse {
        token,
        message: "登录成功！".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Caller's profile", body = UserProfile),
        (status = 404, description = "Account no longer exists", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(state))]
pub async fn me(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.auth.me(user.user_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/auth/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Missing field", body = ErrorResponse),
        (status = 409, description = "Taken by another user", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    let profile = state
        .auth
        .update_profile(
            user.user_id,
            request.username.as_deref().unwrap_or_default(),
            request.email.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(profile))
}

/// Change the password, or set a first one on an OAuth-only account
#[utoipa::path(
    put,
    path = "/api/auth/me/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password stored", body = MessageResponse),
        (status = 400, description = "New password too short or old one missing", body = ErrorResponse),
        (status = 401, description = "Old password wrong", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let outcome = state
        .auth
        .change_password(
            user.user_id,
            request.old_password.as_deref(),
            request.new_password.as_deref().unwrap_or_default(),
        )
        .await?;
    let message = match outcome {
        PasswordChange::Changed => "密码更新成功！",
        PasswordChange::Set => "密码设置成功！",
    };
    Ok(Json(MessageResponse::new(message)))
}

#[utoipa::path(
    put,
    path = "/api/auth/me/settings",
    request_body = SettingsRequest,
    responses(
        (status = 200, description = "Settings saved", body = MessageResponse),
        (status = 400, description = "Not a boolean", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(state))]
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<SettingsRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .auth
        .update_settings(user.user_id, request.show_womens_health.unwrap_or_default())
        .await?;
    Ok(Json(MessageResponse::new("设置更新成功！")))
}

/// Start an OAuth login
#[utoipa::path(
    get,
    path = "/api/auth/{provider}",
    params(("provider" = String, Path, description = "linuxdo, google or github")),
    responses(
        (status = 302, description = "Redirect to the provider, or back to the login page when disabled"),
        (status = 404, description = "Unknown provider", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state))]
pub async fn oauth_start(
    State(state): State<AppState>,
    ValidatedPath(name): ValidatedPath<String>,
) -> ApiResult<Response> {
    let provider = provider(&name)?;
    Ok(found(state.auth.authorization_redirect(provider)))
}

/// Finish an OAuth login and hand the token to the frontend
#[utoipa::path(
    get,
    path = "/api/auth/{provider}/callback",
    params(
        ("provider" = String, Path, description = "linuxdo, google or github"),
        OAuthCallbackQuery
    ),
    responses(
        (status = 302, description = "Redirect to the frontend with a token or an error code"),
        (status = 404, description = "Unknown provider", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state, query))]
pub async fn oauth_callback(
    State(state): State<AppState>,
    ValidatedPath(name): ValidatedPath<String>,
    ValidatedQuery(query): ValidatedQuery<OAuthCallbackQuery>,
) -> ApiResult<Response> {
    let provider = provider(&name)?;
    let location = state
        .auth
        .oauth_callback(provider, query.code.as_deref(), query.state.as_deref())
        .await;
    Ok(found(location))
}
