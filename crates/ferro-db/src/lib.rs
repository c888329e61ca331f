//! # ferro-db: Database Layer for the Ferro Back-Office
//!
//! This crate provides database access for the Ferro back-office.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Ferro Back-Office Data Flow                         │
//! │                                                                         │
//! │  HTTP handler (POST /api/ventas)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     ferro-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (factura.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ FacturaRepo   │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │◄───│ ProductoRepo  │    │ 002_seed.sql │  │   │
//! │  │   │ Management    │    │ UsuarioRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                       SQLite database file                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, lifecycle, and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (factura, producto, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ferro_db::{Database, DbConfig};
//!
//! // Explicitly constructed handle - no module-level singleton
//! let db = Database::new(DbConfig::new("ferro.db")).await?;
//!
//! // Use repositories
//! let catalogo = db.productos().listar_todos().await?;
//!
//! // Shut down cleanly
//! db.close().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::auditoria::AuditoriaRepository;
pub use repository::cliente::ClienteRepository;
pub use repository::empresa::EmpresaRepository;
pub use repository::factura::{FacturaCreada, FacturaError, FacturaRepository, FiltroFacturas};
pub use repository::producto::ProductoRepository;
pub use repository::usuario::UsuarioRepository;
