//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many retail systems:                                                │
//! │    $10.00 / 3 = $3.33 (×3 = $9.99)  → Lost $0.01!                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Pesos                                            │
//! │    Colombian pesos have no usable minor unit, so every amount in the   │
//! │    system is a whole-peso i64. $25.000 is just 25000.                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ferro_core::money::{Money, TasaIva};
//!
//! // Create from whole pesos (the only constructor)
//! let precio = Money::from_pesos(25_000);
//!
//! // Line total for 2 units
//! let linea = precio.por_cantidad(2);
//! assert_eq!(linea.pesos(), 50_000);
//!
//! // IVA at 19%
//! let iva = linea.calcular_iva(TasaIva::GENERAL);
//! assert_eq!(iva.pesos(), 9_500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// IVA Rate
// =============================================================================

/// IVA rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1900 bps = 19% (Colombian general IVA rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasaIva(u32);

impl TasaIva {
    /// General IVA rate (19%).
    pub const GENERAL: TasaIva = TasaIva(1900);

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TasaIva(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn porcentaje(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate (exempt goods).
    #[inline]
    pub const fn exenta() -> Self {
        TasaIva(0)
    }
}

impl Default for TasaIva {
    fn default() -> Self {
        TasaIva::GENERAL
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in whole pesos.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for adjustments and credit notes
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support, serialized as a bare integer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole pesos.
    ///
    /// ## Example
    /// ```rust
    /// use ferro_core::money::Money;
    ///
    /// let precio = Money::from_pesos(25_000);
    /// assert_eq!(precio.pesos(), 25_000);
    /// ```
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos)
    }

    /// Returns the value in whole pesos.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a line-item quantity.
    ///
    /// ## Example
    /// ```rust
    /// use ferro_core::money::Money;
    ///
    /// let unitario = Money::from_pesos(15_000);
    /// assert_eq!(unitario.por_cantidad(3).pesos(), 45_000);
    /// ```
    #[inline]
    pub const fn por_cantidad(&self, cantidad: i64) -> Self {
        Money(self.0 * cantidad)
    }

    /// Calculates IVA on this amount, rounding half away from zero.
    ///
    /// ## Implementation
    /// Integer math in i128 to avoid overflow: `(pesos * bps + 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use ferro_core::money::{Money, TasaIva};
    ///
    /// let base = Money::from_pesos(50_000);
    /// assert_eq!(base.calcular_iva(TasaIva::GENERAL).pesos(), 9_500);
    /// ```
    pub fn calcular_iva(&self, tasa: TasaIva) -> Money {
        let iva = (self.0 as i128 * tasa.bps() as i128 + 5000) / 10000;
        Money::from_pesos(iva as i64)
    }

    /// Change owed for a cash payment, never negative.
    ///
    /// ## Example
    /// ```rust
    /// use ferro_core::money::Money;
    ///
    /// let total = Money::from_pesos(65_000);
    /// let recibido = Money::from_pesos(70_000);
    /// assert_eq!(total.cambio_para(recibido).pesos(), 5_000);
    /// ```
    pub fn cambio_para(&self, recibido: Money) -> Money {
        Money((recibido.0 - self.0).max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows pesos with thousands separators.
///
/// ## Note
/// This is for logs and the printable invoice. API responses carry the raw
/// integer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.0 < 0;
        let digits = self.0.abs().to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
        if negative {
            out.push('-');
        }
        out.push('$');
        let offset = digits.len() % 3;
        for (i, c) in digits.chars().enumerate() {
            if i != 0 && (i + 3 - offset) % 3 == 0 {
                out.push('.');
            }
            out.push(c);
        }
        f.write_str(&out)
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
