// MyHealthLog Data
// This crate owns the MySQL schema and every query the application runs

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
