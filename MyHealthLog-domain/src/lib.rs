// MyHealthLog Domain
// This crate contains the business logic for the MyHealthLog application

// Authentication: tokens, passwords, OAuth providers and route guards
pub mod auth;

// Settings read from the environment
pub mod config;

// Errors returned by every service
pub mod error;

// Health checks and system status
pub mod health;

// Services that implement business logic
pub mod services;

// Re-export the database module from the data crate for convenience
pub use my_health_log_data::database;

pub use config::AppConfig;
pub use error::ServiceError;
pub use services::Services;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
