//! # Error Types
//!
//! Domain-specific error types for ferro-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ferro-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  ferro-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP API errors (apps/server)                                         │
//! │  └── ApiError         - JSON envelope + status code                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → JSON client  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (codigo, id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Messages are the user-facing Spanish text the API returns

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced product does not exist or is inactive.
    #[error("Producto no encontrado: {0}")]
    ProductoNoEncontrado(String),

    /// Not enough stock to cover a line item.
    ///
    /// ## When This Occurs
    /// The guarded stock decrement inside the invoice transaction touched
    /// zero rows, so the whole sale rolls back.
    #[error("Stock insuficiente para {codigo}: disponible {disponible}, solicitado {solicitado}")]
    StockInsuficiente {
        codigo: String,
        disponible: i64,
        solicitado: i64,
    },

    /// Invoice does not exist or is not in a state that allows the
    /// operation (e.g., annulling an already annulled invoice).
    #[error("Factura {0} no encontrada o ya anulada")]
    FacturaNoAnulable(i64),

    /// A sale arrived with no line items.
    #[error("La venta no tiene productos")]
    VentaVacia,

    /// Cash payload inconsistency (missing or short monto_recibido).
    #[error("Monto recibido inválido: {razon}")]
    MontoRecibidoInvalido { razon: String },

    /// Strict deployments reject degraded invoice numbers.
    #[error("Numeración degradada rechazada: {numero}")]
    NumeroDegradadoRechazado { numero: String },

    /// Validation error (wraps ValidationError).
    #[error(transparent)]
    Validacion(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur before business logic runs; their messages surface verbatim
/// in 400 responses.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{campo} es requerido")]
    Requerido { campo: String },

    /// Two required fields missing at once get a combined message; the login
    /// form relies on this exact text.
    #[error("{mensaje}")]
    Combinado { mensaje: String },

    /// Field value is too long.
    #[error("{campo} debe tener máximo {max} caracteres")]
    MuyLargo { campo: String, max: usize },

    /// Numeric value is out of range.
    #[error("{campo} debe estar entre {min} y {max}")]
    FueraDeRango { campo: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{campo} debe ser positivo")]
    DebeSerPositivo { campo: String },

    /// Invalid format (bad codigo characters, malformed number, etc.).
    #[error("{campo} tiene formato inválido: {razon}")]
    FormatoInvalido { campo: String, razon: String },

    /// Duplicate business identifier (e.g., duplicate product codigo).
    #[error("{campo} '{valor}' ya existe")]
    Duplicado { campo: String, valor: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mensajes_de_error() {
        let err = CoreError::StockInsuficiente {
            codigo: "MART-001".to_string(),
            disponible: 3,
            solicitado: 5,
        };
        assert_eq!(
            err.to_string(),
            "Stock insuficiente para MART-001: disponible 3, solicitado 5"
        );

        let err = CoreError::FacturaNoAnulable(42);
        assert_eq!(err.to_string(), "Factura 42 no encontrada o ya anulada");
    }

    #[test]
    fn test_mensajes_de_validacion() {
        let err = ValidationError::Requerido {
            campo: "codigo".to_string(),
        };
        assert_eq!(err.to_string(), "codigo es requerido");

        let err = ValidationError::Duplicado {
            campo: "codigo".to_string(),
            valor: "MART-001".to_string(),
        };
        assert_eq!(err.to_string(), "codigo 'MART-001' ya existe");
    }

    #[test]
    fn test_validacion_convierte_a_core() {
        let err: CoreError = ValidationError::Requerido {
            campo: "nombre".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::Validacion(_)));
        assert_eq!(err.to_string(), "nombre es requerido");
    }
}
