//! ShowAPI proxies for drug lookup and health information

use axum::{
    extract::State,
    Json,
};
use my_health_log_domain::services::showapi::BarcodeProduct;
use serde_json::Value;
use tracing::instrument;

use super::AppState;
use crate::api::error::ApiResult;
use crate::api::extract::{ValidatedJson, ValidatedPath};
use crate::entities::lookup::{DiseaseListRequest, EncyclopediaRequest, KnowledgeSearchRequest};

/// Product details for a medicine barcode
#[utoipa::path(
    get,
    path = "/api/medication-lookup/lookup/{barcode}",
    params(("barcode" = String, Path, description = "EAN-13 barcode")),
    responses(
        (status = 200, description = "Product found", body = BarcodeProduct),
        (status = 404, description = "Upstream has no match", body = ErrorResponse),
        (status = 500, description = "Lookup service unavailable or not configured", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "lookup"
)]
#[instrument(skip(state))]
pub async fn lookup_barcode(
    State(state): State<AppState>,
    ValidatedPath(barcode): ValidatedPath<String>,
) -> ApiResult<Json<BarcodeProduct>> {
    Ok(Json(state.showapi.lookup_barcode(barcode.trim()).await?))
}

#[utoipa::path(
    get,
    path = "/api/medication-lookup/categories",
    responses(
        (status = 200, description = "Drug categories as returned upstream", body = Object),
        (status = 500, description = "Lookup service unavailable", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "lookup"
)]
#[instrument(skip(state))]
pub async fn drug_categories(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    Ok(Json(state.showapi.drug_categories().await?))
}

#[utoipa::path(
    post,
    path = "/api/medication-lookup/encyclopedia",
    request_body = EncyclopediaRequest,
    responses(
        (status = 200, description = "One page of matching drugs", body = Object),
        (status = 500, description = "Lookup service unavailable", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "lookup"
)]
#[instrument(skip(state))]
pub async fn drug_encyclopedia(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EncyclopediaRequest>,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.showapi.drug_encyclopedia(&request.into()).await?))
}

#[utoipa::path(
    get,
    path = "/api/health-info/disease/categories",
    responses((status = 200, description = "Disease categories", body = Object)),
    security(("bearer" = [])),
    tag = "health-info"
)]
#[instrument(skip(state))]
pub async fn disease_categories(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    Ok(Json(state.showapi.disease_categories().await?))
}

#[utoipa::path(
    post,
    path = "/api/health-info/disease/list",
    request_body = DiseaseListRequest,
    responses((status = 200, description = "Diseases matching a keyword or category", body = Object)),
    security(("bearer" = [])),
    tag = "health-info"
)]
#[instrument(skip(state))]
pub async fn disease_list(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<DiseaseListRequest>,
) -> ApiResult<Json<Value>> {
    let body = state
        .showapi
        .disease_list(
            request.key.as_deref().unwrap_or_default(),
            request.classify_id.as_deref().unwrap_or_default(),
            request.page(),
        )
        .await?;
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/api/health-info/disease/detail/{id}",
    params(("id" = String, Path, description = "Upstream disease id")),
    responses((status = 200, description = "Disease details", body = Object)),
    security(("bearer" = [])),
    tag = "health-info"
)]
#[instrument(skip(state))]
pub async fn disease_detail(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<String>,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.showapi.disease_detail(&id).await?))
}

#[utoipa::path(
    get,
    path = "/api/health-info/knowledge/categories",
    responses((status = 200, description = "Health knowledge categories", body = Object)),
    security(("bearer" = [])),
    tag = "health-info"
)]
#[instrument(skip(state))]
pub async fn knowledge_categories(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    Ok(Json(state.showapi.knowledge_categories().await?))
}

#[utoipa::path(
    post,
    path = "/api/health-info/knowledge/search",
    request_body = KnowledgeSearchRequest,
    responses((status = 200, description = "Matching articles", body = Object)),
    security(("bearer" = [])),
    tag = "health-info"
)]
#[instrument(skip(state))]
pub async fn knowledge_search(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<KnowledgeSearchRequest>,
) -> ApiResult<Json<Value>> {
    let body = state
        .showapi
        .knowledge_search(
            request.key.as_deref().unwrap_or_default(),
            request.tid.as_deref().unwrap_or_default(),
            request.page(),
        )
        .await?;
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/api/health-info/knowledge/detail/{id}",
    params(("id" = String, Path, description = "Upstream article id")),
    responses((status = 200, description = "Article", body = Object)),
    security(("bearer" = [])),
    tag = "health-info"
)]
#[instrument(skip(state))]
pub async fn knowledge_detail(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<String>,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.showapi.knowledge_detail(&id).await?))
}
