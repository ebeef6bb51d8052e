//! # Almacen Server
//!
//! HTTP API for the Almacen point-of-sale system.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         almacen-server                                  │
//! │                                                                         │
//! │  POS Terminal ───► HTTP (8080) ───► Handlers ───► SQLite (WAL)        │
//! │                         │                                               │
//! │                         ▼                                               │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  auth          │  │  api           │  │  pdf                       ││
//! │  │                │  │                │  │                            ││
//! │  │ • JWT issue/   │  │ • products     │  │ • ticket.pdf               ││
//! │  │   validate     │  │ • customers    │  │ • sales report             ││
//! │  │ • CurrentUser  │  │ • movements    │  │   (Helvetica, A4/80mm)     ││
//! │  │   extractor    │  │ • sales        │  │                            ││
//! │  │ • argon2id     │  │ • reports      │  │                            ││
//! │  │                │  │ • users        │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  Roles: ADMIN (catalog edits, adjustments, cancellations, users)        │
//! │         VENDOR (checkout, reads)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `ALMACEN_BIND_ADDR` - Bind address (default: 0.0.0.0)
//! - `ALMACEN_PORT` - HTTP port (default: 8080)
//! - `ALMACEN_DB_PATH` - SQLite file path (default: ./almacen.db)
//! - `ALMACEN_JWT_SECRET` - Secret for JWT signing
//! - `ALMACEN_JWT_LIFETIME_SECS` - Token lifetime (default: 28800, one shift)
//! - `ALMACEN_STORE_NAME` - Store name on tickets (default: "Almacén POS")
//! - `ALMACEN_POS_CODE` - Receipt prefix, 4 digits (default: 0001)
//! - `ALMACEN_ADMIN_USER` / `ALMACEN_ADMIN_PASSWORD` - Bootstrap admin

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod pdf;

use std::sync::Arc;

use axum::Router;
use chrono::Utc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use almacen_core::{User, UserRole};
use almacen_db::Database;

// Re-exports
pub use auth::{CurrentUser, JwtManager};
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};

/// Shared application state.
///
/// Cloning is cheap: the database handle wraps a pooled `Arc` internally
/// and the config/JWT manager are behind `Arc` here.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let jwt = Arc::new(JwtManager::new(
            config.jwt_secret.clone(),
            config.jwt_lifetime_secs,
        ));

        AppState {
            db,
            config: Arc::new(config),
            jwt,
        }
    }
}

/// Builds the complete application router.
///
/// Every resource contributes its own sub-router under `/api/<resource>`;
/// `/health` is the only unauthenticated route besides login.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(api::health::router())
        .merge(api::auth::router())
        .merge(api::products::router())
        .merge(api::customers::router())
        .merge(api::movements::router())
        .merge(api::sales::router())
        .merge(api::reports::router())
        .merge(api::users::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Creates the bootstrap admin account when the users table is empty.
///
/// Runs on every startup and is a no-op once any active user exists, so
/// a fresh install is usable immediately and an established one is never
/// touched.
pub async fn bootstrap_admin(db: &Database, config: &ServerConfig) -> ApiResult<()> {
    if db.users().count_active().await? > 0 {
        return Ok(());
    }

    let now = Utc::now();
    let admin = User {
        id: Uuid::new_v4().to_string(),
        username: config.admin_username.clone(),
        display_name: "Administrador".to_string(),
        password_hash: auth::hash_password(&config.admin_password)?,
        role: UserRole::Admin,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    db.users().insert(&admin).await?;
    info!(username = %admin.username, "Bootstrap admin created");

    Ok(())
}

#[cfg(test)]
pub(crate) mod testutil;

#[cfg(test)]
mod tests {
    use super::*;
    use almacen_db::DbConfig;

    fn test_config() -> ServerConfig {
        ServerConfig {
            bind_addr: "127.0.0.1".to_string(),
            port: 0,
            db_path: ":memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_lifetime_secs: 3600,
            store_name: "Almacén Test".to_string(),
            pos_code: "0001".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "admin1234".to_string(),
        }
    }

    #[tokio::test]
    async fn test_bootstrap_admin_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = test_config();

        bootstrap_admin(&db, &config).await.unwrap();
        let admin = db.users().get_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert!(auth::verify_password("admin1234", &admin.password_hash));

        // Second run must not create another user.
        bootstrap_admin(&db, &config).await.unwrap();
        assert_eq!(db.users().count_active().await.unwrap(), 1);
    }
}
