use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use my_health_log_data::models::memo::Memo;
use my_health_log_domain::auth::AuthUser;
use tracing::instrument;

use super::AppState;
use crate::api::error::ApiResult;
use crate::api::extract::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::entities::common::{MessageResponse, SearchQuery};
use crate::entities::memo::{MemoRequest, MemoStatusRequest};

/// Open memos first, then by priority and age
#[utoipa::path(
    get,
    path = "/api/memos",
    responses((status = 200, description = "Memos", body = [Memo])),
    security(("bearer" = [])),
    tag = "memos"
)]
#[instrument(skip(state))]
pub async fn list_memos(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Json<Vec<Memo>>> {
    Ok(Json(state.memos.list(user.user_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/memos",
    request_body = MemoRequest,
    responses(
        (status = 201, description = "Memo created", body = Memo),
        (status = 400, description = "Missing task or unknown priority", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "memos"
)]
#[instrument(skip(state))]
pub async fn create_memo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<MemoRequest>,
) -> ApiResult<(StatusCode, Json<Memo>)> {
    let memo = state
        .memos
        .create(user.user_id, request.task_name.as_deref().unwrap_or_default(), request.priority)
        .await?;
    Ok((StatusCode::CREATED, Json(memo)))
}

#[utoipa::path(
    put,
    path = "/api/memos/{id}/status",
    params(("id" = i64, Path, description = "Memo id")),
    request_body = MemoStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = MessageResponse),
        (status = 404, description = "No such memo", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "memos"
)]
#[instrument(skip(state))]
pub async fn set_memo_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<MemoStatusRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .memos
        .set_completed(user.user_id, id, request.is_completed.unwrap_or_default())
        .await?;
    Ok(Json(MessageResponse::new("状态已更新")))
}

#[utoipa::path(
    delete,
    path = "/api/memos/{id}",
    params(("id" = i64, Path, description = "Memo id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such memo", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "memos"
)]
#[instrument(skip(state))]
pub async fn delete_memo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> ApiResult<StatusCode> {
    state.memos.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Completed memos matching a search term; a blank term finds nothing
#[utoipa::path(
    get,
    path = "/api/memos/history/search",
    params(SearchQuery),
    responses((status = 200, description = "Completed memos, latest first", body = [Memo])),
    security(("bearer" = [])),
    tag = "memos"
)]
#[instrument(skip(state))]
pub async fn search_memos(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> ApiResult<Json<Vec<Memo>>> {
    let memos = state
        .memos
        .search_completed(user.user_id, query.q.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(memos))
}
