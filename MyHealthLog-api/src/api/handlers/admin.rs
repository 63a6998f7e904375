use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use my_health_log_data::models::user::{UsageStats, User};
use my_health_log_domain::auth::AuthUser;
use tracing::instrument;

use super::AppState;
use crate::api::error::ApiResult;
use crate::api::extract::{ValidatedJson, ValidatedPath};
use crate::entities::admin::AdminFlagRequest;
use crate::entities::common::{required, MessageResponse};

/// Row totals across the whole installation
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Usage statistics", body = UsageStats),
        (status = 403, description = "Caller is not an administrator", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn usage_stats(State(state): State<AppState>) -> ApiResult<Json<UsageStats>> {
    Ok(Json(state.admin.stats().await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Users, newest first", body = [User]),
        (status = 403, description = "Caller is not an administrator", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.admin.users().await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/admin",
    params(("id" = i64, Path, description = "User id")),
    request_body = AdminFlagRequest,
    responses(
        (status = 200, description = "Flag changed", body = MessageResponse),
        (status = 404, description = "No such user", body = ErrorResponse),
        (status = 409, description = "Caller tried to demote themself", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn set_admin(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<AdminFlagRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let is_admin = required(request.is_admin, "无效的管理员状态")?;
    state.admin.set_admin(caller.user_id, id, is_admin).await?;
    Ok(Json(MessageResponse::new("管理员状态已更新。")))
}

/// Remove a user together with everything they recorded
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such user", body = ErrorResponse),
        (status = 409, description = "Caller tried to delete themself", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> ApiResult<StatusCode> {
    state.admin.delete_user(caller.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
