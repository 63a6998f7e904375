use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use my_health_log_data::models::sex::{SexLog, SexLogSaved};
use my_health_log_domain::auth::AuthUser;
use tracing::instrument;

use super::{path_date, AppState};
use crate::api::error::ApiResult;
use crate::api::extract::{ValidatedJson, ValidatedPath};
use crate::entities::common::{CreatedResponse, MessageResponse};
use crate::entities::sex::SexRequest;

#[utoipa::path(
    get,
    path = "/api/sex",
    responses((status = 200, description = "Logs, latest first", body = [SexLog])),
    security(("bearer" = [])),
    tag = "sex"
)]
#[instrument(skip(state))]
pub async fn list_sex_logs(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Json<Vec<SexLog>>> {
    Ok(Json(state.sex.list(user.user_id).await?))
}

/// One log per day: a second save for the same date replaces the first
#[utoipa::path(
    post,
    path = "/api/sex",
    request_body = SexRequest,
    responses(
        (status = 201, description = "New log", body = CreatedResponse),
        (status = 200, description = "Existing log for the date replaced", body = MessageResponse),
        (status = 400, description = "Missing date", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "sex"
)]
#[instrument(skip(state))]
pub async fn save_sex_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<SexRequest>,
) -> ApiResult<Response> {
    let response = match state.sex.save(user.user_id, request.into_input()?).await? {
        SexLogSaved::Inserted(id) => (
            StatusCode::CREATED,
            Json(CreatedResponse {
                id,
                message: "记录成功！".to_string(),
            }),
        )
            .into_response(),
        SexLogSaved::Updated(_) => Json(MessageResponse::new("记录已更新。")).into_response(),
    };
    Ok(response)
}

#[utoipa::path(
    delete,
    path = "/api/sex/{date}",
    params(("date" = String, Path, description = "YYYY-MM-DD")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 400, description = "Malformed date", body = ErrorResponse),
        (status = 404, description = "No log for the date", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "sex"
)]
#[instrument(skip(state))]
pub async fn delete_sex_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(date): ValidatedPath<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.sex.delete(user.user_id, path_date(&date)?).await?;
    Ok(Json(MessageResponse::new("记录已删除。")))
}
