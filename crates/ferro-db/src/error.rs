//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (apps/server) ← JSON envelope + HTTP status                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Client shows {"success": false, "error": "..."}                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - A lookup by id/codigo matched no row
    /// - A guarded UPDATE (annul, soft delete) touched zero rows
    #[error("{entidad} no encontrado: {id}")]
    NotFound { entidad: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate product codigo or client documento
    /// - A duplicate invoice numero slipping past the sequencer
    #[error("{campo} '{valor}' ya existe")]
    UniqueViolation { campo: String, valor: String },

    /// Foreign key constraint violation, e.g. a line item referencing a
    /// product row that no longer exists.
    #[error("Violación de integridad referencial: {mensaje}")]
    ForeignKeyViolation { mensaje: String },

    /// CHECK constraint violation (negative stock, invalid estado).
    #[error("Violación de restricción: {mensaje}")]
    CheckViolation { mensaje: String },

    /// Database connection failed.
    #[error("Conexión fallida: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migración fallida: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Consulta fallida: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use past the acquire timeout).
    #[error("Pool de conexiones agotado")]
    PoolExhausted,

    /// Internal database error.
    #[error("Error interno de base de datos: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entidad: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entidad: entidad.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicado(campo: impl Into<String>, valor: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            campo: campo.into(),
            valor: valor.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entidad: "Registro".to_string(),
                id: "desconocido".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // UNIQUE:      "UNIQUE constraint failed: <table>.<column>"
                // FOREIGN KEY: "FOREIGN KEY constraint failed"
                // CHECK:       "CHECK constraint failed: <expr>"
                if msg.contains("UNIQUE constraint failed") {
                    let campo = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("desconocido")
                        .to_string();
                    DbError::UniqueViolation {
                        campo,
                        valor: "desconocido".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        mensaje: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        mensaje: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("el pool está cerrado".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
