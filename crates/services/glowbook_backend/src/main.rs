// --- File: crates/services/glowbook_backend/src/main.rs ---
use glowbook_common::logging;
use glowbook_config::{load_config, AppConfig};
use glowbook_db::{BookingRepository, DbClient, SqlBookingRepository};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, Level};

mod app;

/// Connects and prepares the booking table. Failures are logged and the
/// server runs without local booking records.
async fn connect_database(config: &AppConfig) -> Option<DbClient> {
    if !config.use_database {
        info!("Database disabled; bookings are not recorded locally");
        return None;
    }
    let client = match DbClient::new(config).await {
        Ok(client) => client,
        Err(e) => {
            error!("Database unavailable: {}", e);
            return None;
        }
    };
    if let Err(e) = SqlBookingRepository::new(client.clone()).init_schema().await {
        error!("Could not prepare the bookings table: {}", e);
        return None;
    }
    info!("Database connected");
    Some(client)
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let level = config
        .logging
        .level
        .as_deref()
        .and_then(|l| l.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    // Keeps the file writer flushing until shutdown
    let _log_guard = match config.logging.directory.as_deref() {
        Some(dir) => Some(logging::init_with_file(level, Path::new(dir), "glowbook")),
        None => {
            logging::init_with_level(level);
            None
        }
    };

    let db = connect_database(&config).await;
    let app = app::build_router(config.clone(), db);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Could not bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Starting {} at http://{}", config.studio.name, addr);
    info!("API endpoints available at http://{}/api", addr);

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
