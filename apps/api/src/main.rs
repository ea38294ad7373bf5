//! # Caja POS API
//!
//! HTTP server for the Caja POS backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Caja API Server                          │
//! │                                                                 │
//! │  Client ───► HTTP (8080) ───► Handlers ───► caja-db ───► SQLite │
//! │                   │                                             │
//! │                   ▼                                             │
//! │            JWT auth + role capabilities                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod auth;
mod config;
mod error;
mod handlers;
mod state;

use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::auth::hash_password;
use crate::config::ApiConfig;
use crate::state::AppState;
use caja_core::Role;
use caja_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Caja POS API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        port = config.http_port,
        db_path = %config.database_path.display(),
        "Configuration loaded"
    );

    // Connect to database; migrations run on connect
    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database ready");

    seed_admin(&db, &config).await?;

    let state = AppState::new(db, config.clone());
    let app = handlers::router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Seeds the bootstrap admin account when the user table is empty, so a
/// fresh install can log in at all.
async fn seed_admin(db: &Database, config: &ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
    if db.users().count().await? > 0 {
        return Ok(());
    }

    let hash = hash_password(&config.bootstrap_admin_password)?;
    let admin = db
        .users()
        .create(config.bootstrap_admin_username.clone(), hash, Role::Admin)
        .await?;

    warn!(
        username = %admin.username,
        "Seeded bootstrap admin account; change its password"
    );
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
