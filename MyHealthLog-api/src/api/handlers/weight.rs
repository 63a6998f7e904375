use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use my_health_log_data::models::weight::WeightLog;
use my_health_log_domain::auth::AuthUser;
use my_health_log_domain::services::weight::WeightOverview;
use tracing::instrument;

use super::AppState;
use crate::api::error::ApiResult;
use crate::api::extract::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::entities::common::{required, CreatedResponse, MessageResponse};
use crate::entities::weight::{HeightRequest, WeightHistoryQuery, WeightRequest};

/// Recent weights in chronological order plus the stored height
#[utoipa::path(
    get,
    path = "/api/weight",
    responses((status = 200, description = "Chart data", body = WeightOverview)),
    security(("bearer" = [])),
    tag = "weight"
)]
#[instrument(skip(state))]
pub async fn weight_overview(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<WeightOverview>> {
    Ok(Json(state.weight.overview(user.user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/weight/history",
    params(WeightHistoryQuery),
    responses(
        (status = 200, description = "Entries, oldest first", body = [WeightLog]),
        (status = 400, description = "Start after end", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "weight"
)]
#[instrument(skip(state))]
pub async fn weight_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedQuery(query): ValidatedQuery<WeightHistoryQuery>,
) -> ApiResult<Json<Vec<WeightLog>>> {
    let logs = state
        .weight
        .history(user.user_id, query.start_datetime, query.end_datetime)
        .await?;
    Ok(Json(logs))
}

#[utoipa::path(
    post,
    path = "/api/weight",
    request_body = WeightRequest,
    responses(
        (status = 201, description = "Saved", body = CreatedResponse),
        (status = 400, description = "Missing or non-positive weight", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "weight"
)]
#[instrument(skip(state))]
pub async fn record_weight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<WeightRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let weight = required(request.weight, "体重和日期时间不能为空")?;
    let log_datetime = required(request.log_datetime, "体重和日期时间不能为空")?;
    let log = state.weight.record(user.user_id, weight, log_datetime).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: log.id,
            message: "体重记录已保存".to_string(),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/weight/height",
    request_body = HeightRequest,
    responses(
        (status = 200, description = "Height stored", body = MessageResponse),
        (status = 400, description = "Missing or non-positive height", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "weight"
)]
#[instrument(skip(state))]
pub async fn set_height(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<HeightRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .weight
        .set_height(user.user_id, required(request.height, "无效的身高值")?)
        .await?;
    Ok(Json(MessageResponse::new("身高已更新")))
}

#[utoipa::path(
    delete,
    path = "/api/weight/{id}",
    params(("id" = i64, Path, description = "Entry id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "No such entry", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "weight"
)]
#[instrument(skip(state))]
pub async fn delete_weight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.weight.delete(user.user_id, id).await?;
    Ok(Json(MessageResponse::new("体重记录已删除")))
}
