use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use my_health_log_data::models::exercise::ExerciseLog;
use my_health_log_domain::auth::AuthUser;
use tracing::instrument;

use super::{path_date, AppState};
use crate::api::error::ApiResult;
use crate::api::extract::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::entities::common::MessageResponse;
use crate::entities::exercise::{ExerciseRequest, ExerciseSearchQuery};

#[utoipa::path(
    post,
    path = "/api/exercise",
    request_body = ExerciseRequest,
    responses(
        (status = 201, description = "Log created", body = ExerciseLog),
        (status = 400, description = "Missing date or name", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "exercise"
)]
#[instrument(skip(state))]
pub async fn create_exercise_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<ExerciseRequest>,
) -> ApiResult<(StatusCode, Json<ExerciseLog>)> {
    let log = state.exercise.create(user.user_id, request.into_new()?).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// Logs in an inclusive date range, oldest first
#[utoipa::path(
    get,
    path = "/api/exercise/search",
    params(ExerciseSearchQuery),
    responses(
        (status = 200, description = "Matching logs", body = [ExerciseLog]),
        (status = 400, description = "Range missing or reversed", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "exercise"
)]
#[instrument(skip(state))]
pub async fn search_exercise_logs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedQuery(query): ValidatedQuery<ExerciseSearchQuery>,
) -> ApiResult<Json<Vec<ExerciseLog>>> {
    let logs = state
        .exercise
        .search(user.user_id, query.start_date, query.end_date, query.exercise_name)
        .await?;
    Ok(Json(logs))
}

#[utoipa::path(
    get,
    path = "/api/exercise/{date}",
    params(("date" = String, Path, description = "YYYY-MM-DD")),
    responses(
        (status = 200, description = "Logs for the day", body = [ExerciseLog]),
        (status = 400, description = "Malformed date", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "exercise"
)]
#[instrument(skip(state))]
pub async fn exercise_for_date(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(date): ValidatedPath<String>,
) -> ApiResult<Json<Vec<ExerciseLog>>> {
    Ok(Json(state.exercise.for_date(user.user_id, path_date(&date)?).await?))
}

/// Days of a month with at least one log
#[utoipa::path(
    get,
    path = "/api/exercise/summary/{year}/{month}",
    params(
        ("year" = i32, Path, description = "Calendar year"),
        ("month" = u32, Path, description = "Month, 1-12")
    ),
    responses(
        (status = 200, description = "Active dates", body = [String]),
        (status = 400, description = "Invalid month", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "exercise"
)]
#[instrument(skip(state))]
pub async fn exercise_month_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath((year, month)): ValidatedPath<(i32, u32)>,
) -> ApiResult<Json<Vec<NaiveDate>>> {
    Ok(Json(state.exercise.month_summary(user.user_id, year, month).await?))
}

#[utoipa::path(
    delete,
    path = "/api/exercise/{id}",
    params(("id" = i64, Path, description = "Log id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "No such log", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "exercise"
)]
#[instrument(skip(state))]
pub async fn delete_exercise_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.exercise.delete(user.user_id, id).await?;
    Ok(Json(MessageResponse::new("运动记录删除成功")))
}
