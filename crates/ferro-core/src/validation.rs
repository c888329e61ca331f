//! # Validation Module
//!
//! Input validation for payloads arriving at the HTTP boundary.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (axum)                                          │
//! │  ├── Type validation (serde deserialization)                           │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: each layer catches different mistakes               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The invoice assembler itself re-validates nothing: line quantities and
//! prices are checked HERE, before the transaction opens.

use crate::error::ValidationError;
use crate::types::NuevaVenta;
use crate::{MAX_CANTIDAD_ITEM, MAX_ITEMS_VENTA};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product codigo.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 50 characters
/// - Only alphanumerics, hyphens, underscores
pub fn validar_codigo(codigo: &str) -> ValidationResult<()> {
    let codigo = codigo.trim();

    if codigo.is_empty() {
        return Err(ValidationError::Requerido {
            campo: "codigo".to_string(),
        });
    }

    if codigo.len() > 50 {
        return Err(ValidationError::MuyLargo {
            campo: "codigo".to_string(),
            max: 50,
        });
    }

    if !codigo
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::FormatoInvalido {
            campo: "codigo".to_string(),
            razon: "solo se permiten letras, números, guiones y guiones bajos".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (producto, cliente, empleado).
pub fn validar_nombre(nombre: &str) -> ValidationResult<()> {
    let nombre = nombre.trim();

    if nombre.is_empty() {
        return Err(ValidationError::Requerido {
            campo: "nombre".to_string(),
        });
    }

    if nombre.len() > 200 {
        return Err(ValidationError::MuyLargo {
            campo: "nombre".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity: positive and bounded.
pub fn validar_cantidad(cantidad: i64) -> ValidationResult<()> {
    if cantidad <= 0 {
        return Err(ValidationError::DebeSerPositivo {
            campo: "cantidad".to_string(),
        });
    }

    if cantidad > MAX_CANTIDAD_ITEM {
        return Err(ValidationError::FueraDeRango {
            campo: "cantidad".to_string(),
            min: 1,
            max: MAX_CANTIDAD_ITEM,
        });
    }

    Ok(())
}

/// Validates a price in pesos. Zero is allowed (giveaway items).
pub fn validar_precio(pesos: i64) -> ValidationResult<()> {
    if pesos < 0 {
        return Err(ValidationError::FueraDeRango {
            campo: "precio".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Sale Payload Validator
// =============================================================================

/// Validates a sale payload before the invoice transaction opens.
///
/// ## Checks
/// - Client nombre and documento present
/// - At least one line item, at most [`MAX_ITEMS_VENTA`]
/// - Every cantidad positive and bounded; every precio non-negative
/// - Cash sales carry a monto_recibido covering the total
pub fn validar_venta(venta: &NuevaVenta) -> ValidationResult<()> {
    if venta.cliente.nombre.trim().is_empty() {
        return Err(ValidationError::Requerido {
            campo: "cliente.nombre".to_string(),
        });
    }
    if venta.cliente.documento.trim().is_empty() {
        return Err(ValidationError::Requerido {
            campo: "cliente.documento".to_string(),
        });
    }

    if venta.items.is_empty() {
        return Err(ValidationError::Requerido {
            campo: "items".to_string(),
        });
    }
    if venta.items.len() > MAX_ITEMS_VENTA {
        return Err(ValidationError::FueraDeRango {
            campo: "items".to_string(),
            min: 1,
            max: MAX_ITEMS_VENTA as i64,
        });
    }

    for item in &venta.items {
        validar_cantidad(item.cantidad)?;
        validar_precio(item.precio_unitario)?;
    }

    if venta.metodo_pago.es_efectivo() {
        match venta.monto_recibido {
            None => {
                return Err(ValidationError::Requerido {
                    campo: "montoRecibido".to_string(),
                })
            }
            Some(recibido) if recibido < venta.total => {
                return Err(ValidationError::FueraDeRango {
                    campo: "montoRecibido".to_string(),
                    min: venta.total,
                    max: i64::MAX,
                })
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Validates login credentials are both present.
///
/// The combined message is a wire contract: the login form shows it
/// verbatim.
pub fn validar_credenciales(email_usuario: &str, password: &str) -> ValidationResult<()> {
    if email_usuario.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::Combinado {
            mensaje: "Email/usuario y contraseña son requeridos".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
