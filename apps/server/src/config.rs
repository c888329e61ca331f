//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, collected once at startup and injected through the shared
//! application state.

use serde::{Deserialize, Serialize};
use std::env;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Secret key for signing session tokens
    pub jwt_secret: String,

    /// Session cookie lifetime in seconds
    pub sesion_lifetime_secs: i64,

    /// Reject invoices whose numero came from the timestamp fallback.
    /// Off by default: availability over strict numbering.
    pub numeracion_estricta: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            http_port: env::var("FERRO_HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("FERRO_HTTP_PORT".to_string()))?,

            database_path: env::var("FERRO_DATABASE_PATH")
                .unwrap_or_else(|_| "ferro.db".to_string()),

            jwt_secret: env::var("FERRO_JWT_SECRET").unwrap_or_else(|_| {
                // Development fallback only; production MUST set the
                // environment variable
                "ferro-dev-secret-change-in-production".to_string()
            }),

            sesion_lifetime_secs: env::var("FERRO_SESION_LIFETIME_SECS")
                .unwrap_or_else(|_| "28800".to_string()) // one 8-hour shift
                .parse()
                .map_err(|_| ConfigError::InvalidValue("FERRO_SESION_LIFETIME_SECS".to_string()))?,

            numeracion_estricta: env::var("FERRO_NUMERACION_ESTRICTA")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        };

        if config.sesion_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "FERRO_SESION_LIFETIME_SECS".to_string(),
            ));
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
