//! # Almacen Server
//!
//! HTTP API for the Almacen point-of-sale system.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Server Startup                                   │
//! │                                                                         │
//! │  env config ──► SQLite (WAL, migrations) ──► bootstrap admin           │
//! │                          │                                              │
//! │                          ▼                                              │
//! │                 axum router (8080) ──► graceful shutdown on            │
//! │                                        SIGINT / SIGTERM                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;

use almacen_db::{Database, DbConfig};
use almacen_server::{bootstrap_admin, router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Almacen POS server...");

    // Load configuration
    let config = ServerConfig::load()?;
    info!(
        port = config.port,
        db_path = %config.db_path,
        store = %config.store_name,
        pos_code = %config.pos_code,
        "Configuration loaded"
    );

    // Connect to database (creates the file and runs migrations)
    let db = Database::new(DbConfig::new(&config.db_path)).await?;
    info!("Database ready");

    // First run: create the admin account
    bootstrap_admin(&db, &config).await?;

    // Bind and serve
    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");

    let state = AppState::new(db, config);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
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
