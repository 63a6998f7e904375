use std::sync::PoisonError;
use thiserror::Error;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// A unique key rejected the write
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    /// A stored value could not be interpreted
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// Lock error
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(db.message().to_string())
            }
            _ => RepositoryError::Database(error),
        }
    }
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::Lock(error.to_string())
    }
}
