//! # Invoice Numbering
//!
//! Format, parsing, and degradation rules for invoice numbers.
//!
//! ## The Number Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Invoice Number Anatomy                             │
//! │                                                                         │
//! │                FAC - 20260307 - 0042                                    │
//! │                ───   ────────   ────                                    │
//! │                 │       │         │                                     │
//! │                 │       │         └── 4-digit daily counter, starts     │
//! │                 │       │             at 0001, +1 per allocation        │
//! │                 │       └── calendar date YYYYMMDD                      │
//! │                 └── fixed prefix                                        │
//! │                                                                         │
//! │  This string is a PERSISTED, EXTERNALLY VISIBLE contract: consumers    │
//! │  parse historical numbers, so the format never changes.                │
//! │                                                                         │
//! │  Degraded fallback (allocation failure): FAC-{epoch-millis}            │
//! │  Trades format consistency for availability; flagged to callers.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The counter itself lives in the database (`consecutivos_factura`); this
//! module owns everything that does not need I/O: building the day prefix,
//! rendering a number, parsing the trailing counter back out of an existing
//! number, and the degraded-number shape.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Fixed invoice prefix.
pub const PREFIJO_FACTURA: &str = "FAC";

/// Fixed-format matcher for well-formed numbers. Anchored on both ends so a
/// number with a longer or shorter counter never half-matches.
fn patron_numero() -> &'static Regex {
    static PATRON: OnceLock<Regex> = OnceLock::new();
    PATRON.get_or_init(|| Regex::new(r"^FAC-(\d{8})-(\d{4,})$").expect("static pattern"))
}

/// Builds the day prefix, e.g. `FAC-20260307`.
pub fn prefijo_del_dia(fecha: NaiveDate) -> String {
    format!("{}-{}", PREFIJO_FACTURA, fecha.format("%Y%m%d"))
}

/// Renders a full number from a day prefix and counter, zero-padded to four
/// digits. Counters past 9999 keep their natural width rather than wrap.
pub fn formatear(prefijo_dia: &str, consecutivo: i64) -> String {
    format!("{}-{:04}", prefijo_dia, consecutivo)
}

/// Parses the trailing counter out of an existing number for the given day.
///
/// Returns `None` when the number belongs to another day or does not match
/// the fixed format (degraded timestamp numbers land here). Callers seeding
/// a fresh daily sequence treat `None` as counter 0.
pub fn parsear_consecutivo(numero: &str, prefijo_dia: &str) -> Option<i64> {
    let captura = patron_numero().captures(numero)?;
    let dia = captura.get(1)?.as_str();
    if !prefijo_dia.ends_with(dia) {
        return None;
    }
    captura.get(2)?.as_str().parse().ok()
}

/// Degraded fallback number used when the database cannot allocate.
pub fn numero_degradado(epoch_millis: i64) -> String {
    format!("{}-{}", PREFIJO_FACTURA, epoch_millis)
}

// =============================================================================
// Allocation Result
// =============================================================================

/// Outcome of a number allocation.
///
/// Allocation intentionally degrades instead of failing the sale: a database
/// error during numbering yields a timestamp-based number rather than a lost
/// invoice. Strict deployments can reject `Degradado` before committing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumeroFactura {
    /// Well-formed daily number, `FAC-YYYYMMDD-NNNN`.
    Asignado(String),
    /// Availability fallback, `FAC-{epoch-millis}`.
    Degradado(String),
}

impl NumeroFactura {
    /// The number string, whichever way it was produced.
    pub fn as_str(&self) -> &str {
        match self {
            NumeroFactura::Asignado(n) | NumeroFactura::Degradado(n) => n,
        }
    }

    /// True when this number came from the fallback path.
    pub const fn es_degradado(&self) -> bool {
        matches!(self, NumeroFactura::Degradado(_))
    }

    /// Consumes self into the number string.
    pub fn into_string(self) -> String {
        match self {
            NumeroFactura::Asignado(n) | NumeroFactura::Degradado(n) => n,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
