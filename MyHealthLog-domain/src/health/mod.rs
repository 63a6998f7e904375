//! Domain layer health check functionality
//! Reports whether the API and its database are reachable

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use my_health_log_data::repository::HealthRepository;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

/// Overall system status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    /// All components are healthy
    Ok,
    /// The API answers but a dependency does not
    Degraded,
    /// The API itself cannot serve requests
    Error,
}

/// Status of a single component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Ok,
    Error,
}

/// A component's status with optional details
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Health report returned by `/health`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SystemHealth {
    pub status: SystemStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: BTreeMap<String, HealthComponent>,
}

/// Health checks over the storage ping
#[derive(Clone)]
pub struct HealthService {
    repository: Arc<dyn HealthRepository>,
    started: Instant,
}

impl HealthService {
    pub fn new(repository: Arc<dyn HealthRepository>) -> Self {
        Self {
            repository,
            started: Instant::now(),
        }
    }

    /// Ping the database and assemble the report
    pub async fn check(&self) -> SystemHealth {
        let database = match self.repository.ping().await {
            Ok(version) => HealthComponent {
                status: ComponentStatus::Ok,
                details: Some(version),
            },
            Err(e) => {
                warn!("Database health check failed: {}", e);
                HealthComponent {
                    status: ComponentStatus::Error,
                    details: Some("Database connection failed".to_string()),
                }
            }
        };

        let status = match database.status {
            ComponentStatus::Ok => SystemStatus::Ok,
            ComponentStatus::Error => SystemStatus::Degraded,
        };

        let api = HealthComponent {
            status: ComponentStatus::Ok,
            details: None,
        };

        SystemHealth {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.started.elapsed().as_secs(),
            components: [("api".to_string(), api), ("database".to_string(), database)]
                .into_iter()
                .collect(),
        }
    }
}
