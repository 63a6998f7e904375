use thiserror::Error;

// Database modules
pub mod connection;
pub mod migrations;

// Re-export database connection functions
pub use connection::*;
pub use migrations::run_migrations;

/// Database error enum
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Configuration error
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Connection error
    #[error("Failed to connect to database: {0}")]
    ConnectionError(#[source] sqlx::Error),

    /// Migration error
    #[error("Database migration error: {0}")]
    MigrationError(String),
}
