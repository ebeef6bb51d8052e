//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults that suit a single-store LAN deployment.

use std::env;

use serde::{Deserialize, Serialize};

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener
    pub bind_addr: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file path
    pub db_path: String,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT token lifetime in seconds (default: one 8-hour shift)
    pub jwt_lifetime_secs: i64,

    /// Store name printed on tickets and reports
    pub store_name: String,

    /// Point-of-sale code, the PPPP prefix of receipt numbers
    pub pos_code: String,

    /// Bootstrap admin username (created when the users table is empty)
    pub admin_username: String,

    /// Bootstrap admin password
    pub admin_password: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            bind_addr: env::var("ALMACEN_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("ALMACEN_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ALMACEN_PORT".to_string()))?,

            db_path: env::var("ALMACEN_DB_PATH").unwrap_or_else(|_| "./almacen.db".to_string()),

            jwt_secret: env::var("ALMACEN_JWT_SECRET").unwrap_or_else(|_| {
                // In production this MUST be set via environment variable
                "almacen-dev-secret-change-in-production".to_string()
            }),

            jwt_lifetime_secs: env::var("ALMACEN_JWT_LIFETIME_SECS")
                .unwrap_or_else(|_| "28800".to_string()) // 8 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ALMACEN_JWT_LIFETIME_SECS".to_string()))?,

            store_name: env::var("ALMACEN_STORE_NAME")
                .unwrap_or_else(|_| "Almacén POS".to_string()),

            pos_code: env::var("ALMACEN_POS_CODE").unwrap_or_else(|_| "0001".to_string()),

            admin_username: env::var("ALMACEN_ADMIN_USER").unwrap_or_else(|_| "admin".to_string()),

            admin_password: env::var("ALMACEN_ADMIN_PASSWORD")
                .unwrap_or_else(|_| "admin1234".to_string()),
        };

        // Receipt numbers are "PPPP-NNNNNNNN"; the prefix is fixed-width.
        if config.pos_code.len() != 4 || !config.pos_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidValue("ALMACEN_POS_CODE".to_string()));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load() {
        let config = ServerConfig::load().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.pos_code, "0001");
        assert_eq!(config.jwt_lifetime_secs, 28800);
    }
}
