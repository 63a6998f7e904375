use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use my_health_log_data::models::period::MenstrualRecord;
use my_health_log_domain::auth::AuthUser;
use my_health_log_domain::services::cycle::CyclePrediction;
use tracing::instrument;

use super::AppState;
use crate::api::error::ApiResult;
use crate::api::extract::{ValidatedJson, ValidatedPath};
use crate::entities::common::MessageResponse;
use crate::entities::period::{PeriodPatchRequest, PeriodRequest};

/// Next period, ovulation day and fertile window from recorded cycles
#[utoipa::path(
    get,
    path = "/api/periods/predict",
    responses((status = 200, description = "Prediction, or a message when history is too short", body = CyclePrediction)),
    security(("bearer" = [])),
    tag = "periods"
)]
#[instrument(skip(state))]
pub async fn predict_cycle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<CyclePrediction>> {
    Ok(Json(state.periods.predict(user.user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/periods",
    responses((status = 200, description = "Records, latest start first", body = [MenstrualRecord])),
    security(("bearer" = [])),
    tag = "periods"
)]
#[instrument(skip(state))]
pub async fn list_periods(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<MenstrualRecord>>> {
    Ok(Json(state.periods.list(user.user_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/periods",
    request_body = PeriodRequest,
    responses(
        (status = 201, description = "Record created", body = MenstrualRecord),
        (status = 400, description = "Missing start date", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "periods"
)]
#[instrument(skip(state))]
pub async fn create_period(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<PeriodRequest>,
) -> ApiResult<(StatusCode, Json<MenstrualRecord>)> {
    let record = state.periods.create(user.user_id, request.into_new()?).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Change only the fields present in the body; `null` clears end date, notes, color or state
#[utoipa::path(
    put,
    path = "/api/periods/{id}",
    params(("id" = i64, Path, description = "Record id")),
    request_body = PeriodPatchRequest,
    responses(
        (status = 200, description = "Updated", body = MessageResponse),
        (status = 400, description = "Nothing to update", body = ErrorResponse),
        (status = 404, description = "No such record", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "periods"
)]
#[instrument(skip(state))]
pub async fn update_period(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<PeriodPatchRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.periods.update(user.user_id, id, request.into()).await?;
    Ok(Json(MessageResponse::new("记录更新成功！")))
}

#[utoipa::path(
    delete,
    path = "/api/periods/{id}",
    params(("id" = i64, Path, description = "Record id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "No such record", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "periods"
)]
#[instrument(skip(state))]
pub async fn delete_period(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.periods.delete(user.user_id, id).await?;
    Ok(Json(MessageResponse::new("记录删除成功！")))
}
