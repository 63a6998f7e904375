use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use my_health_log_data::models::medication::{Medication, MedicationLog};
use my_health_log_domain::auth::AuthUser;
use tracing::instrument;

use super::AppState;
use crate::api::error::ApiResult;
use crate::api::extract::{ValidatedJson, ValidatedPath};
use crate::entities::common::MessageResponse;
use crate::entities::medication::{MedicationRequest, TakeRequest};

/// List medications, newest first
#[utoipa::path(
    get,
    path = "/api/medications",
    responses((status = 200, description = "Caller's medications", body = [Medication])),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state))]
pub async fn list_medications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Medication>>> {
    Ok(Json(state.medications.list(user.user_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/medications",
    request_body = MedicationRequest,
    responses(
        (status = 201, description = "Medication created", body = Medication),
        (status = 400, description = "Missing name", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state))]
pub async fn create_medication(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<MedicationRequest>,
) -> ApiResult<(StatusCode, Json<Medication>)> {
    let medication = state.medications.create(user.user_id, request.into()).await?;
    Ok((StatusCode::CREATED, Json(medication)))
}

/// Replace every field of a medication
#[utoipa::path(
    put,
    path = "/api/medications/{id}",
    params(("id" = i64, Path, description = "Medication id")),
    request_body = MedicationRequest,
    responses(
        (status = 200, description = "Updated", body = MessageResponse),
        (status = 400, description = "Missing name", body = ErrorResponse),
        (status = 404, description = "No such medication", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state))]
pub async fn update_medication(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<MedicationRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.medications.update(user.user_id, id, request.into()).await?;
    Ok(Json(MessageResponse::new("更新成功")))
}

#[utoipa::path(
    delete,
    path = "/api/medications/{id}",
    params(("id" = i64, Path, description = "Medication id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "No such medication", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state))]
pub async fn delete_medication(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.medications.delete(user.user_id, id).await?;
    Ok(Json(MessageResponse::new("删除成功")))
}

/// Record a dose, drawing down tracked stock
#[utoipa::path(
    post,
    path = "/api/medications/{id}/take",
    params(("id" = i64, Path, description = "Medication id")),
    request_body(content = TakeRequest, description = "Defaults to one unit"),
    responses(
        (status = 201, description = "Dose recorded", body = MessageResponse),
        (status = 404, description = "No such medication", body = ErrorResponse),
        (status = 409, description = "Not enough stock", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state, request))]
pub async fn take_medication(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
    request: Option<Json<TakeRequest>>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let amount = request.and_then(|Json(r)| r.dosage_amount);
    state.medications.take(user.user_id, id, amount).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::new("服药记录成功"))))
}

#[utoipa::path(
    get,
    path = "/api/medications/{id}/logs",
    params(("id" = i64, Path, description = "Medication id")),
    responses((status = 200, description = "Doses, newest first", body = [MedicationLog])),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state))]
pub async fn medication_logs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> ApiResult<Json<Vec<MedicationLog>>> {
    Ok(Json(state.medications.logs(user.user_id, id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/medications/logs/{log_id}",
    params(("log_id" = i64, Path, description = "Dose log id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such log", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state))]
pub async fn delete_medication_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(log_id): ValidatedPath<i64>,
) -> ApiResult<StatusCode> {
    state.medications.delete_log(user.user_id, log_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
