// Database migrations module
// Schema is created idempotently at startup; there is no down migration.

mod mysql;
pub use mysql::run_migrations;
