//! Shared application state.
//!
//! Built once in `main` and injected into every handler; nothing in the
//! server reaches for a global.

use std::sync::Arc;

use crate::auth::SesionManager;
use crate::config::ServerConfig;
use ferro_db::Database;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub sesiones: SesionManager,
    pub config: ServerConfig,
}

impl AppState {
    /// Assembles the state from its already-initialized parts.
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let sesiones = SesionManager::new(config.jwt_secret.clone(), config.sesion_lifetime_secs);
        AppState {
            db,
            sesiones,
            config,
        }
    }
}

/// The state as handlers receive it.
pub type SharedState = Arc<AppState>;
