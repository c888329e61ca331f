//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Error Flow in the Ferro Server                          │
//! │                                                                         │
//! │  Client                       Rust Backend                              │
//! │  ──────                       ────────────                              │
//! │                                                                         │
//! │  POST /api/ventas                                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler: Result<T, ApiError>                                    │  │
//! │  │         │                                                        │  │
//! │  │  ValidationError ── 400 ──┐                                      │  │
//! │  │  DbError ────────── 4xx/500 ──┤                                  │  │
//! │  │  CoreError ──────── 404/409 ──┴──► ApiError ──► IntoResponse ───►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄── {"success": false, "error": "...", "code": "..."} + status ──────  │
//! │                                                                         │
//! │  Nothing crashes the process per-request; every failure becomes the    │
//! │  JSON envelope.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use ferro_core::{CoreError, ValidationError};
use ferro_db::{DbError, FacturaError};

/// API error returned from HTTP handlers.
///
/// ## Serialization
/// This is what the client receives when a handler fails:
/// ```json
/// {
///   "success": false,
///   "error": "Factura 42 no encontrada o ya anulada",
///   "code": "NOT_FOUND"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses, each mapping to one HTTP status.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found or in a state the operation rejects (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Missing or invalid credentials/session (401)
    Unauthorized,

    /// Valid session but the role lacks the capability (403)
    Forbidden,

    /// Account locked after too many failed logins (423)
    Locked,

    /// Business state conflict, e.g. insufficient stock (409)
    Conflict,

    /// Degraded invoice numbering rejected in strict mode (503)
    Unavailable,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::Locked => StatusCode::LOCKED,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(recurso: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} no encontrado: {}", recurso, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    /// Creates a locked-account error.
    pub fn locked(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Locked, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// HTTP status this error renders with.
    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entidad, id } => ApiError::not_found(&entidad, id),
            // Integrity errors surface as 400 with the message preserved
            // for diagnostics
            DbError::UniqueViolation { .. } => ApiError::validation(err.to_string()),
            DbError::ForeignKeyViolation { .. } | DbError::CheckViolation { .. } => {
                ApiError::validation(err.to_string())
            }
            DbError::ConnectionFailed(_) | DbError::PoolExhausted => {
                tracing::error!(error = %err, "Fallo de conexión a base de datos");
                ApiError::new(ErrorCode::DatabaseError, "Base de datos no disponible")
            }
            DbError::MigrationFailed(e) | DbError::QueryFailed(e) | DbError::Internal(e) => {
                tracing::error!(error = %e, "Operación de base de datos falló");
                ApiError::new(ErrorCode::DatabaseError, "Operación de base de datos falló")
            }
        }
    }
}

/// Converts core business errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::ProductoNoEncontrado(_) => {
                ApiError::new(ErrorCode::NotFound, err.to_string())
            }
            CoreError::FacturaNoAnulable(_) => ApiError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::StockInsuficiente { .. } => {
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }
            CoreError::NumeroDegradadoRechazado { .. } => {
                ApiError::new(ErrorCode::Unavailable, err.to_string())
            }
            CoreError::VentaVacia | CoreError::MontoRecibidoInvalido { .. } => {
                ApiError::validation(err.to_string())
            }
            CoreError::Validacion(_) => ApiError::validation(err.to_string()),
        }
    }
}

/// Converts validation errors directly (skipping the CoreError wrap).
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts invoice-operation errors, whichever side they came from.
impl From<FacturaError> for ApiError {
    fn from(err: FacturaError) -> Self {
        match err {
            FacturaError::Db(e) => e.into(),
            FacturaError::Regla(e) => e.into(),
        }
    }
}

/// Renders the JSON envelope with the mapped status code.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "success": false,
            "error": self.message,
            "code": self.code,
        }));
        (status, body).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::not_found("Factura", 1).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::locked("x").status(), StatusCode::LOCKED);
    }

    #[test]
    fn test_stock_insuficiente_es_conflicto() {
        let api: ApiError = CoreError::StockInsuficiente {
            codigo: "MART-001".to_string(),
            disponible: 1,
            solicitado: 2,
        }
        .into();
        assert_eq!(api.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_duplicado_preserva_mensaje() {
        let api: ApiError = DbError::duplicado("codigo", "MART-001").into();
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert!(api.message.contains("MART-001"));
    }
}
