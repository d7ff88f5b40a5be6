//! Core types for the market training-game simulation.
//!
//! This crate provides the shared data types used across the simulation:
//! fixed-point monetary values, share quantities, sector and regime enums.

use derive_more::{Add, AddAssign, From, Into, Neg, Sub, SubAssign, Sum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Mul;

// =============================================================================
// Constants
// =============================================================================

/// Fixed-point scale for Price and Cash types.
/// 100 = $1.00, 150 = $1.50, 1 = $0.01
pub const PRICE_SCALE: i64 = 100;

// =============================================================================
// Symbol and Time Types
// =============================================================================

/// Stock ticker symbol (e.g., "TECH", "OILD").
pub type Symbol = String;

/// Simulation tick number (discrete time step).
pub type Tick = u64;

// =============================================================================
// Quantity Type (Newtype for shares)
// =============================================================================

/// Number of shares in an order (newtype for type safety).
///
/// Orders always carry a positive share count; account holdings are signed
/// `i64` so short positions can go negative.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Default,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    Sum,
    From,
    Into,
)]
pub struct Quantity(pub u64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    /// Get raw value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Check if zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Qty({})", self.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Allow `quantity == 50` comparisons
impl PartialEq<u64> for Quantity {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

// =============================================================================
// Fixed-Point Monetary Types
// =============================================================================

/// Fixed-point price in whole cents.
///
/// # Examples
/// - `Price(100)` = $1.00
/// - `Price(150)` = $1.50
/// - `Price(1)` = $0.01
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Default,
    Add,
    Sub,
    Neg,
    AddAssign,
    SubAssign,
    From,
    Into,
)]
pub struct Price(pub i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// The $0.01 floor every traded price is clamped to.
    pub const MIN_TICK: Price = Price(1);

    /// Create a Price from a floating-point value, rounding to the cent.
    #[inline]
    pub fn from_float(v: f64) -> Self {
        Self((v * PRICE_SCALE as f64).round() as i64)
    }

    /// Convert to floating-point for calculations.
    #[inline]
    pub fn to_float(self) -> f64 {
        self.0 as f64 / PRICE_SCALE as f64
    }

    /// Raw internal value in cents.
    #[inline]
    pub fn raw(self) -> i64 {
        self.0
    }

    /// Check if price is positive.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Maximum of two prices.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Price(self.0.max(other.0))
    }
}

impl fmt::Debug for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Price(${:.2})", self.to_float())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.to_float())
    }
}

/// Fixed-point cash/money in whole cents.
///
/// Semantically identical to Price but represents account balances.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Default,
    Add,
    Sub,
    Neg,
    AddAssign,
    SubAssign,
    Sum,
    From,
    Into,
)]
pub struct Cash(pub i64);

impl Cash {
    pub const ZERO: Cash = Cash(0);

    /// Create Cash from a floating-point value, rounding to the cent.
    #[inline]
    pub fn from_float(v: f64) -> Self {
        Self((v * PRICE_SCALE as f64).round() as i64)
    }

    /// Convert to floating-point for calculations.
    #[inline]
    pub fn to_float(self) -> f64 {
        self.0 as f64 / PRICE_SCALE as f64
    }

    /// Raw internal value in cents.
    #[inline]
    pub fn raw(self) -> i64 {
        self.0
    }

    /// Check if cash is positive.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Check if cash is negative.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Maximum of two cash values.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Cash(self.0.max(other.0))
    }
}

impl fmt::Debug for Cash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cash(${:.2})", self.to_float())
    }
}

impl fmt::Display for Cash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.to_float())
    }
}

// =============================================================================
// Price-Quantity Operations
// =============================================================================

impl Mul<Quantity> for Price {
    type Output = Cash;

    /// Multiply price by quantity to get total cash value.
    fn mul(self, qty: Quantity) -> Cash {
        Cash(self.0 * qty.0 as i64)
    }
}

impl Mul<Price> for Quantity {
    type Output = Cash;

    fn mul(self, price: Price) -> Cash {
        Cash(price.0 * self.0 as i64)
    }
}

// =============================================================================
// Sector Type
// =============================================================================

/// Industry sector an instrument belongs to.
///
/// News events target sectors; every instrument in a targeted sector
/// receives the event's pending effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    Technology,
    Healthcare,
    Finance,
    Energy,
    Consumer,
    Industrial,
}

impl Sector {
    /// All sectors in the simulation.
    pub fn all() -> [Sector; 6] {
        [
            Sector::Technology,
            Sector::Healthcare,
            Sector::Finance,
            Sector::Energy,
            Sector::Consumer,
            Sector::Industrial,
        ]
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Sector::Technology => "Technology",
            Sector::Healthcare => "Healthcare",
            Sector::Finance => "Finance",
            Sector::Energy => "Energy",
            Sector::Consumer => "Consumer",
            Sector::Industrial => "Industrial",
        };
        write!(f, "{}", name)
    }
}

// =============================================================================
// Regime Type
// =============================================================================

/// Market-wide regime scaling aggregate demand.
///
/// Redrawn memorylessly each tick with the configured change probability;
/// a redraw may land on the current regime again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Regime {
    #[default]
    Bull,
    Bear,
    Volatile,
}

impl Regime {
    /// All regimes a redraw can land on.
    pub fn all() -> [Regime; 3] {
        [Regime::Bull, Regime::Bear, Regime::Volatile]
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Regime::Bull => "Bull",
            Regime::Bear => "Bear",
            Regime::Volatile => "Volatile",
        };
        write!(f, "{}", name)
    }
}

// =============================================================================
// Trade Side
// =============================================================================

/// Which side of a trade the player is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
