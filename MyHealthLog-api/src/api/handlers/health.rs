use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::State, http::StatusCode, Json};
use my_health_log_domain::health::{ComponentStatus, SystemStatus};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::AppState;

/// Health check response with version, uptime and per-component status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// Timestamp of when the response was generated
    pub timestamp: u64,
    /// Uptime of the service in seconds
    pub uptime: u64,
    /// Status of the API and the database
    pub components: BTreeMap<String, ComponentHealthStatus>,
    /// Value of `APP_ENV`
    pub environment: String,
}

/// Health status for an individual component
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// "ok" or "error"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn status_name(status: SystemStatus) -> &'static str {
    match status {
        SystemStatus::Ok => "ok",
        SystemStatus::Degraded => "degraded",
        SystemStatus::Error => "error",
    }
}

/// Health check endpoint to verify the API and its database are up
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy", body = HealthResponse),
        (status = 500, description = "API is not healthy", body = HealthResponse),
        (status = 503, description = "API is degraded", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    info!("Health check requested");

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let health = state.health.check().await;

    let components = health
        .components
        .into_iter()
        .map(|(name, component)| {
            let status = match component.status {
                ComponentStatus::Ok => "ok",
                ComponentStatus::Error => "error",
            };
            (
                name,
                ComponentHealthStatus {
                    status: status.to_string(),
                    message: component.details,
                },
            )
        })
        .collect();

    let response = HealthResponse {
        status: status_name(health.status).to_string(),
        version: health.version,
        timestamp: now,
        uptime: health.uptime_seconds,
        components,
        environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    };

    let code = match health.status {
        SystemStatus::Ok => StatusCode::OK,
        SystemStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
        SystemStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (code, Json(response))
}
