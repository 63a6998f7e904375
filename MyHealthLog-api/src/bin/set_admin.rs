//! Grant the admin flag to an existing user.
//!
//! Usage: `set_admin <username>`. Exits non-zero when the user does not exist
//! or the database cannot be reached.

use std::process::ExitCode;

use dotenv::dotenv;
use tracing::error;
use tracing_subscriber::EnvFilter;

use my_health_log_data::repository::Repositories;
use my_health_log_domain::database::{create_pool, DatabaseConfig};
use my_health_log_domain::services::AdminService;
use my_health_log_domain::ServiceError;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let Some(username) = std::env::args().nth(1).filter(|u| !u.trim().is_empty()) else {
        eprintln!("Usage: set_admin <username>");
        return ExitCode::from(2);
    };

    let config = match DatabaseConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid database configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let pool = match create_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Cannot connect to the database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("正在尝试将用户 [{}] 设为管理员...", username);

    let admin = AdminService::new(Repositories::mysql(pool).users);
    match admin.promote(&username).await {
        Ok(user) => {
            println!("成功！用户 [{}] 已是管理员。", user.username);
            ExitCode::SUCCESS
        }
        Err(ServiceError::NotFound(message)) => {
            eprintln!("错误：{}", message);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Failed to promote {}: {}", username, e);
            ExitCode::FAILURE
        }
    }
}
