//! # ferro-core: Pure Business Logic for the Ferro Back-Office
//!
//! This crate is the **heart** of the Ferro hardware-store back-office. It
//! contains all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Ferro Back-Office Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP Clients (JSON API)                      │   │
//! │  │    Login ──► Catálogo ──► Venta ──► Factura ──► Reportes       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ axum                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server routes                           │   │
//! │  │    procesar_login, crear_venta, listar_productos, anular...    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ferro-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  numero   │  │ catalogo  │  │   │
//! │  │   │  Factura  │  │   Money   │  │ FAC-....  │  │  filtros  │  │   │
//! │  │   │  Producto │  │  TasaIva  │  │ consecut. │  │ paginado  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    ferro-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Producto, Factura, Cliente, roles, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`numero`] - Invoice-number format, parsing, and degraded fallback
//! - [`catalogo`] - Catalog filtering and pagination rules
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are whole pesos (i64), never floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//! 5. **No Clock Reads**: "today" and "now" are always passed in by callers

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalogo;
pub mod error;
pub mod money;
pub mod numero;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use ferro_core::Money` instead of
// `use ferro_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::{Money, TasaIva};
pub use numero::NumeroFactura;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Schema version stamped into every invoice metadata blob.
///
/// The blob is an opaque versioned payload: consumers must dispatch on this
/// tag instead of assuming a field layout.
pub const VERSION_METADATOS: &str = "1.0";

/// Maximum line items allowed in a single sale.
///
/// ## Business Reason
/// Prevents runaway payloads and keeps printable invoices on one page run.
pub const MAX_ITEMS_VENTA: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-billing (e.g., typing 1000 instead of 10).
pub const MAX_CANTIDAD_ITEM: i64 = 9999;

/// Failed logins tolerated before the account is locked.
pub const MAX_INTENTOS_LOGIN: i64 = 5;

/// Minutes an account stays locked after too many failed logins.
pub const MINUTOS_BLOQUEO: i64 = 15;
