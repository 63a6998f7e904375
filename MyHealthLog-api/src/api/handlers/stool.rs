use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use my_health_log_data::models::stool::StoolLog;
use my_health_log_domain::auth::AuthUser;
use tracing::instrument;

use super::AppState;
use crate::api::error::ApiResult;
use crate::api::extract::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::entities::common::DateRangeQuery;
use crate::entities::stool::StoolRequest;

/// Logs newest first, optionally limited to a date range
#[utoipa::path(
    get,
    path = "/api/stool",
    params(DateRangeQuery),
    responses((status = 200, description = "Stool logs", body = [StoolLog])),
    security(("bearer" = [])),
    tag = "stool"
)]
#[instrument(skip(state))]
pub async fn list_stool_logs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedQuery(range): ValidatedQuery<DateRangeQuery>,
) -> ApiResult<Json<Vec<StoolLog>>> {
    Ok(Json(state.stool.list(user.user_id, range.start_date, range.end_date).await?))
}

/// Days with at least one log
#[utoipa::path(
    get,
    path = "/api/stool/dates",
    responses((status = 200, description = "Dates as YYYY-MM-DD", body = [String])),
    security(("bearer" = [])),
    tag = "stool"
)]
#[instrument(skip(state))]
pub async fn stool_dates(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<NaiveDate>>> {
    Ok(Json(state.stool.dates(user.user_id).await?))
}

/// Log counts per day
#[utoipa::path(
    get,
    path = "/api/stool/summary",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Map of YYYY-MM-DD to count", body = Object),
        (status = 400, description = "Range missing or reversed", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "stool"
)]
#[instrument(skip(state))]
pub async fn stool_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedQuery(range): ValidatedQuery<DateRangeQuery>,
) -> ApiResult<Json<BTreeMap<NaiveDate, i64>>> {
    Ok(Json(state.stool.summary(user.user_id, range.start_date, range.end_date).await?))
}

#[utoipa::path(
    post,
    path = "/api/stool",
    request_body = StoolRequest,
    responses(
        (status = 201, description = "Log created", body = StoolLog),
        (status = 400, description = "Missing date", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "stool"
)]
#[instrument(skip(state))]
pub async fn create_stool_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<StoolRequest>,
) -> ApiResult<(StatusCode, Json<StoolLog>)> {
    let log = state.stool.create(user.user_id, request.into_input()?).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[utoipa::path(
    put,
    path = "/api/stool/{id}",
    params(("id" = i64, Path, description = "Log id")),
    request_body = StoolRequest,
    responses(
        (status = 200, description = "Updated log", body = StoolLog),
        (status = 400, description = "Missing date", body = ErrorResponse),
        (status = 404, description = "No such log", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "stool"
)]
#[instrument(skip(state))]
pub async fn update_stool_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<StoolRequest>,
) -> ApiResult<Json<StoolLog>> {
    Ok(Json(state.stool.update(user.user_id, id, request.into_input()?).await?))
}

#[utoipa::path(
    delete,
    path = "/api/stool/{id}",
    params(("id" = i64, Path, description = "Log id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such log", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "stool"
)]
#[instrument(skip(state))]
pub async fn delete_stool_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> ApiResult<StatusCode> {
    state.stool.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
