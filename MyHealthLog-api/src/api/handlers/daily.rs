use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use my_health_log_data::models::daily::{DailyItem, DailyLog};
use my_health_log_domain::auth::AuthUser;
use tracing::instrument;

use super::{path_date, AppState};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::entities::common::{MessageResponse, SearchQuery};
use crate::entities::daily::{ItemRequest, LogRequest};

/// Check-in items, oldest first
#[utoipa::path(
    get,
    path = "/api/daily-logs/items",
    responses((status = 200, description = "Items", body = [DailyItem])),
    security(("bearer" = [])),
    tag = "daily"
)]
#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<DailyItem>>> {
    Ok(Json(state.daily.items(user.user_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/daily-logs/items",
    request_body = ItemRequest,
    responses(
        (status = 201, description = "Item created", body = DailyItem),
        (status = 400, description = "Missing name or type", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "daily"
)]
#[instrument(skip(state))]
pub async fn create_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<ItemRequest>,
) -> ApiResult<(StatusCode, Json<DailyItem>)> {
    let item_type = request
        .item_type
        .ok_or_else(|| ApiError::bad_request("项目名称和类型不能为空"))?;
    let item = state
        .daily
        .create_item(user.user_id, request.item_name.as_deref().unwrap_or_default(), item_type)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Delete an item and every log recorded under its name
#[utoipa::path(
    delete,
    path = "/api/daily-logs/items/{id}",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "No such item", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "daily"
)]
#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.daily.delete_item(user.user_id, id).await?;
    Ok(Json(MessageResponse::new("项目已删除")))
}

/// Mark a one-time item done
#[utoipa::path(
    put,
    path = "/api/daily-logs/items/{id}/complete",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Completed", body = MessageResponse),
        (status = 404, description = "No such one-time item", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "daily"
)]
#[instrument(skip(state))]
pub async fn complete_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.daily.complete_item(user.user_id, id).await?;
    Ok(Json(MessageResponse::new("任务已完成")))
}

#[utoipa::path(
    get,
    path = "/api/daily-logs/logs/{date}",
    params(("date" = String, Path, description = "YYYY-MM-DD")),
    responses(
        (status = 200, description = "Logs for the day", body = [DailyLog]),
        (status = 400, description = "Malformed date", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "daily"
)]
#[instrument(skip(state))]
pub async fn logs_for_date(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(date): ValidatedPath<String>,
) -> ApiResult<Json<Vec<DailyLog>>> {
    Ok(Json(state.daily.logs_for_date(user.user_id, path_date(&date)?).await?))
}

/// Insert or replace the log for a day and item
#[utoipa::path(
    post,
    path = "/api/daily-logs/logs",
    request_body = LogRequest,
    responses(
        (status = 201, description = "Saved log", body = DailyLog),
        (status = 400, description = "Missing date or item", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "daily"
)]
#[instrument(skip(state))]
pub async fn save_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<LogRequest>,
) -> ApiResult<(StatusCode, Json<DailyLog>)> {
    let log = state.daily.save_log(user.user_id, request.into_input()?).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[utoipa::path(
    get,
    path = "/api/daily-logs/history/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Newest matching logs", body = [DailyLog]),
        (status = 400, description = "Blank search", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "daily"
)]
#[instrument(skip(state))]
pub async fn search_logs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> ApiResult<Json<Vec<DailyLog>>> {
    Ok(Json(state.daily.search(user.user_id, query.q.as_deref().unwrap_or_default()).await?))
}
