use async_trait::async_trait;
use sqlx::MySqlPool;

use super::errors::RepositoryError;
use crate::database::check_connection;

/// Storage liveness check used by the health endpoint
#[async_trait]
pub trait HealthRepository: Send + Sync {
    /// Round-trip to the store, returning its version string
    async fn ping(&self) -> Result<String, RepositoryError>;
}

#[derive(Debug, Clone)]
pub struct MySqlHealthRepository {
    pool: MySqlPool,
}

impl MySqlHealthRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthRepository for MySqlHealthRepository {
    async fn ping(&self) -> Result<String, RepositoryError> {
        Ok(check_connection(&self.pool).await?)
    }
}
