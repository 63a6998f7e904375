use std::net::SocketAddr;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use my_health_log_api::create_app;
use my_health_log_data::repository::Repositories;
use my_health_log_domain::database::{check_connection, create_pool, run_migrations, DatabaseConfig};
use my_health_log_domain::{AppConfig, Services};

/// The main entry point for the MyHealthLog API server
///
/// Loads `.env`, sets up tracing, connects to MySQL (creating missing tables
/// unless `DB_RUN_MIGRATIONS=false`), then serves until Ctrl-C or SIGTERM.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_ansi(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("Starting MyHealthLog API server");

    let config = AppConfig::from_env().context("invalid application configuration")?;
    let db_config = DatabaseConfig::from_env().context("invalid database configuration")?;

    let pool = create_pool(&db_config).await.context("failed to create database pool")?;
    match check_connection(&pool).await {
        Ok(version) => info!("Connected to MySQL {}", version),
        Err(e) => warn!("Database did not answer the startup ping: {}", e),
    }

    if db_config.run_migrations {
        run_migrations(&pool).await.context("failed to run migrations")?;
    } else {
        info!("Skipping migrations (DB_RUN_MIGRATIONS=false)");
    }

    let services = Services::new(Repositories::mysql(pool), &config);
    let app = create_app(services);

    let port = std::env::var("PORT")
        .ok()
        .map(|p| p.parse::<u16>())
        .transpose()
        .context("PORT must be a number")?
        .unwrap_or(3000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
