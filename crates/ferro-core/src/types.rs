//! # Domain Types
//!
//! Core domain types used throughout the Ferro back-office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Producto     │   │     Factura     │   │ DetalleFactura  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  factura_id(FK) │       │
//! │  │  codigo (único) │   │  numero FAC-..  │   │  cantidad       │       │
//! │  │  stock_actual   │   │  estado         │   │  precio_unitario│       │
//! │  │  stock_minimo   │   │  total          │   │  subtotal_linea │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  EstadoFactura  │   │   MetodoPago    │   │   RolSistema    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Activa         │   │  Efectivo       │   │  Administrador  │       │
//! │  │  Anulada        │   │  Tarjeta        │   │  Cajero         │       │
//! │  └─────────────────┘   │  Transferencia  │   │  Bodeguero      │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Invoices copy client and company data at creation time. A later edit to a
//! client or to the company row never rewrites billing history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Invoice Status
// =============================================================================

/// The status of an invoice. The only transition is `Activa → Anulada`,
/// one-way; invoices are never physically deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum EstadoFactura {
    /// Valid, billable invoice.
    #[default]
    Activa,
    /// Annulled invoice, kept for the ledger.
    Anulada,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum MetodoPago {
    /// Cash at the counter. The only method carrying monto_recibido/cambio.
    Efectivo,
    /// Card on the external terminal.
    Tarjeta,
    /// Bank transfer.
    Transferencia,
}

impl MetodoPago {
    /// Cash payments are the only ones that owe change.
    #[inline]
    pub const fn es_efectivo(&self) -> bool {
        matches!(self, MetodoPago::Efectivo)
    }
}

// =============================================================================
// System Roles & Capabilities
// =============================================================================

/// Closed set of system roles carried by each cargo.
///
/// New roles are a compile-time decision: access checks go through
/// [`RolSistema::puede`], never through string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum RolSistema {
    Administrador,
    Cajero,
    Bodeguero,
}

/// What a role is allowed to do in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacidad {
    /// Log into the back-office at all.
    AccederSistema,
    /// Create and edit products, categories, and stock.
    GestionarCatalogo,
    /// Register sales and print invoices.
    Facturar,
    /// Annul invoices.
    AnularFacturas,
    /// Manage employees and user accounts.
    GestionarUsuarios,
    /// See sales reports.
    VerReportes,
}

impl RolSistema {
    /// Capability set per role.
    ///
    /// Bodeguero exists as a cargo but carries no system access: warehouse
    /// staff operate outside the back-office.
    pub const fn capacidades(&self) -> &'static [Capacidad] {
        match self {
            RolSistema::Administrador => &[
                Capacidad::AccederSistema,
                Capacidad::GestionarCatalogo,
                Capacidad::Facturar,
                Capacidad::AnularFacturas,
                Capacidad::GestionarUsuarios,
                Capacidad::VerReportes,
            ],
            RolSistema::Cajero => &[
                Capacidad::AccederSistema,
                Capacidad::Facturar,
                Capacidad::VerReportes,
            ],
            RolSistema::Bodeguero => &[],
        }
    }

    /// Checks a single capability.
    pub fn puede(&self, capacidad: Capacidad) -> bool {
        self.capacidades().contains(&capacidad)
    }

    /// Parses the value stored in `cargos.rol_sistema`.
    pub fn parse(valor: &str) -> Option<RolSistema> {
        match valor {
            "Administrador" => Some(RolSistema::Administrador),
            "Cajero" => Some(RolSistema::Cajero),
            "Bodeguero" => Some(RolSistema::Bodeguero),
            _ => None,
        }
    }

    /// Name as persisted and as shown to users.
    pub const fn nombre(&self) -> &'static str {
        match self {
            RolSistema::Administrador => "Administrador",
            RolSistema::Cajero => "Cajero",
            RolSistema::Bodeguero => "Bodeguero",
        }
    }
}

// =============================================================================
// Producto
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Producto {
    /// Internal identifier.
    pub id: i64,

    /// Business identifier, globally unique, checked before insert.
    pub codigo: String,

    /// Display name.
    pub nombre: String,

    /// Optional long description.
    pub descripcion: Option<String>,

    /// Sale price in whole pesos.
    pub precio_venta: i64,

    /// Purchase price in whole pesos (for margin).
    pub precio_compra: i64,

    /// Current stock level. Non-negative by schema CHECK.
    pub stock_actual: i64,

    /// Threshold at or below which the product is low-stock.
    pub stock_minimo: i64,

    /// Warehouse location (aisle/shelf).
    pub ubicacion: Option<String>,

    /// Shipping weight in grams.
    pub peso_gramos: Option<i64>,

    /// Free-form dimensions ("20x10x5 cm").
    pub dimensiones: Option<String>,

    /// Category reference.
    pub categoria_id: Option<i64>,

    /// Soft-delete flag.
    pub activo: bool,

    pub creado_en: DateTime<Utc>,
    pub actualizado_en: DateTime<Utc>,
}

/// Derived catalog state of a product.
///
/// Serialized with the exact strings the API exposes as the `estado` field
/// and accepts as the state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstadoProducto {
    #[serde(rename = "activo")]
    Activo,
    #[serde(rename = "bajo-stock")]
    BajoStock,
    #[serde(rename = "inactivo")]
    Inactivo,
}

impl Producto {
    /// Sale price as Money.
    #[inline]
    pub fn precio(&self) -> Money {
        Money::from_pesos(self.precio_venta)
    }

    /// Derived margin in whole pesos (never stored).
    #[inline]
    pub fn margen(&self) -> i64 {
        self.precio_venta - self.precio_compra
    }

    /// Low stock means at or BELOW the minimum - the boundary case counts.
    #[inline]
    pub fn bajo_stock(&self) -> bool {
        self.stock_actual <= self.stock_minimo
    }

    /// Derived state with fixed precedence: inactive overrides low-stock,
    /// which overrides active.
    pub fn estado(&self) -> EstadoProducto {
        if !self.activo {
            EstadoProducto::Inactivo
        } else if self.bajo_stock() {
            EstadoProducto::BajoStock
        } else {
            EstadoProducto::Activo
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Categoria {
    pub id: i64,
    pub nombre: String,
    pub activo: bool,
}

// =============================================================================
// Cliente
// =============================================================================

/// A registered client. Invoices snapshot these fields instead of
/// referencing the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Cliente {
    pub id: i64,
    pub tipo_documento: String,
    pub documento: String,
    pub nombre: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
    pub activo: bool,
    pub creado_en: DateTime<Utc>,
}

// =============================================================================
// Empresa (singleton)
// =============================================================================

/// The issuing business. One row; read at invoice-creation time so each
/// invoice carries a snapshot of the company as it was.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Empresa {
    pub nombre: String,
    pub nit: String,
    pub direccion: String,
    pub telefono: String,
    pub email: String,
}

impl Empresa {
    /// Hard-coded defaults used when the singleton row is absent so invoice
    /// creation never fails on missing company data.
    pub fn por_defecto() -> Empresa {
        Empresa {
            nombre: "Ferretería Ferro".to_string(),
            nit: "900.000.000-0".to_string(),
            direccion: "Calle 10 # 5-21".to_string(),
            telefono: "(601) 555-0100".to_string(),
            email: "ventas@ferro.local".to_string(),
        }
    }
}

// =============================================================================
// Factura
// =============================================================================

/// An invoice header: client snapshot, company snapshot, totals, payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Factura {
    pub id: i64,
    /// Externally visible number, format `FAC-YYYYMMDD-NNNN`.
    pub numero: String,
    pub cliente_tipo_documento: String,
    pub cliente_documento: String,
    pub cliente_nombre: String,
    pub cliente_telefono: Option<String>,
    pub empresa_nombre: String,
    pub empresa_nit: String,
    pub empresa_direccion: String,
    pub empresa_telefono: String,
    pub empresa_email: String,
    pub subtotal: i64,
    pub iva: i64,
    pub total: i64,
    pub metodo_pago: MetodoPago,
    /// Cash received; only meaningful for efectivo.
    pub monto_recibido: Option<i64>,
    /// Change returned; only meaningful for efectivo.
    pub cambio: Option<i64>,
    /// Free-form notes; annulment reasons are appended here.
    pub observaciones: String,
    /// Opaque versioned JSON blob, tagged by `sistemaVersion`. Never queried
    /// relationally.
    pub metadatos: String,
    pub estado: EstadoFactura,
    pub creada_por: String,
    pub creada_en: DateTime<Utc>,
}

impl Factura {
    /// Total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_pesos(self.total)
    }
}

/// An invoice line item. Belongs to exactly one invoice; cascade-deleted
/// with it. `subtotal_linea` is computed once at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct DetalleFactura {
    pub id: i64,
    pub factura_id: i64,
    pub producto_id: i64,
    /// Product code at time of sale (frozen).
    pub producto_codigo: String,
    /// Product name at time of sale (frozen).
    pub producto_nombre: String,
    pub cantidad: i64,
    pub precio_unitario: i64,
    /// cantidad × precio_unitario, computed at insertion, never re-derived.
    pub subtotal_linea: i64,
}

/// The versioned metadata blob stamped into `facturas.metadatos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadatosFactura {
    pub cantidad_productos: usize,
    pub creada_en: DateTime<Utc>,
    pub sistema_version: String,
}

impl MetadatosFactura {
    pub fn nueva(cantidad_productos: usize, creada_en: DateTime<Utc>) -> Self {
        MetadatosFactura {
            cantidad_productos,
            creada_en,
            sistema_version: crate::VERSION_METADATOS.to_string(),
        }
    }
}

// =============================================================================
// Sale Payload
// =============================================================================

/// Client descriptor inside a sale payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClienteVenta {
    pub tipo_documento: String,
    pub documento: String,
    pub nombre: String,
    pub telefono: Option<String>,
}

/// One line of a sale payload. Quantity and price arrive pre-validated by
/// the HTTP layer; the assembler trusts them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemVenta {
    pub producto_id: i64,
    pub codigo: String,
    pub nombre: String,
    pub cantidad: i64,
    pub precio_unitario: i64,
}

/// The full sale payload the invoice assembler consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NuevaVenta {
    pub cliente: ClienteVenta,
    pub items: Vec<ItemVenta>,
    pub subtotal: i64,
    pub iva: i64,
    pub total: i64,
    pub metodo_pago: MetodoPago,
    pub monto_recibido: Option<i64>,
    pub observaciones: Option<String>,
}

// =============================================================================
// Usuarios
// =============================================================================

/// A user account row.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: i64,
    pub empleado_id: i64,
    pub usuario: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub activo: bool,
    pub intentos_fallidos: i64,
    pub bloqueado_hasta: Option<DateTime<Utc>>,
    pub ultimo_acceso: Option<DateTime<Utc>>,
    pub creado_en: DateTime<Utc>,
}

/// Join row used by the auth gate: user + employee + cargo in one lookup.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UsuarioAcceso {
    pub id: i64,
    pub usuario: String,
    pub email: String,
    pub password_hash: String,
    pub intentos_fallidos: i64,
    pub bloqueado_hasta: Option<DateTime<Utc>>,
    pub empleado_nombre: String,
    pub cargo_nombre: String,
    /// Raw role string from cargos.rol_sistema; parsed via
    /// [`RolSistema::parse`] at the gate.
    pub rol_sistema: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
