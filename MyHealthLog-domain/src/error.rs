use my_health_log_data::repository::RepositoryError;
use thiserror::Error;

/// Errors raised by domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed a business rule
    #[error("{0}")]
    Validation(String),

    /// Caller could not be authenticated
    #[error("{0}")]
    Unauthorized(String),

    /// Caller is authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Row missing or owned by another user
    #[error("{0}")]
    NotFound(String),

    /// Request clashes with current state
    #[error("{0}")]
    Conflict(String),

    /// A third-party service failed or refused the request
    #[error("{0}")]
    Upstream(String),

    /// Required settings are absent
    #[error("{0}")]
    Configuration(String),

    /// Storage failure
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict(message.into())
    }
}

/// Turn a `false` from a scoped write into a 404
pub(crate) fn found(matched: bool, message: &str) -> Result<(), ServiceError> {
    if matched {
        Ok(())
    } else {
        Err(ServiceError::not_found(message))
    }
}
