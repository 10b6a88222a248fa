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
//! │  A 2.5% commission on Rp333 computed in floats can land on either      │
//! │  side of the rounding boundary depending on the platform.              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Rupiah                                           │
//! │    Rupiah has no fractional minor unit in this domain, so Money is     │
//! │    simply an i64 of whole rupiah. Percentage fees are applied with     │
//! │    integer basis-point math and rounded half-up exactly once.          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lapak_core::money::{FeeRate, Money};
//!
//! let order = Money::new(1_000_000); // Rp1.000.000
//!
//! // 5% commission, rounded half-up
//! let commission = order.apply_rate(FeeRate::from_bps(500));
//! assert_eq!(commission.amount(), 50_000);
//!
//! // NEVER do this:
//! // let bad = Money::from_float(10.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in whole rupiah.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for adjustments and reversals
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// Order.amount ──► Tier lookup ──► apply_rate ──► SettlementLine.amount
///                                                          │
/// Settlement.net_payable ◄── gross − total_fees ◄──────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole rupiah.
    ///
    /// ## Example
    /// ```rust
    /// use lapak_core::money::Money;
    ///
    /// let fee = Money::new(15_000);
    /// assert_eq!(fee.amount(), 15_000);
    /// ```
    #[inline]
    pub const fn new(rupiah: i64) -> Self {
        Money(rupiah)
    }

    /// Returns the value in whole rupiah.
    #[inline]
    pub const fn amount(&self) -> i64 {
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

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Applies a percentage rate using round-half-up integer math.
    ///
    /// ## Rounding Contract
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  ROUND HALF-UP, APPLIED EXACTLY ONCE                                │
    /// │                                                                     │
    /// │  Rp333 × 10%   = 33.3  → Rp33                                       │
    /// │  Rp335 × 10%   = 33.5  → Rp34                                       │
    /// │  Rp1.000.000 × 5% = Rp50.000 (exact)                                │
    /// │                                                                     │
    /// │  Callers must round at the END of each independent computation,    │
    /// │  never cumulatively across composed computations. This method IS   │
    /// │  that single rounding step for percentage fees.                    │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`
    /// The +5000 provides the half-up rounding (5000/10000 = 0.5)
    ///
    /// ## Example
    /// ```rust
    /// use lapak_core::money::{FeeRate, Money};
    ///
    /// let amount = Money::new(333);
    /// let fee = amount.apply_rate(FeeRate::from_bps(1000)); // 10%
    /// assert_eq!(fee.amount(), 33);
    /// ```
    pub fn apply_rate(&self, rate: FeeRate) -> Money {
        // Use i128 to prevent overflow on large order amounts
        let fee = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::new(fee as i64)
    }
}

// =============================================================================
// Fee Rate
// =============================================================================

/// Percentage fee rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 500 bps = 5% (a typical marketplace commission)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeRate(u32);

impl FeeRate {
    /// Creates a fee rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        FeeRate(bps)
    }

    /// Creates a fee rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        FeeRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        FeeRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        FeeRate::zero()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. Use [`crate::format`] helpers for
/// presentation to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp{}", sign, group_thousands(self.0))
    }
}

/// Groups the absolute value of `value` with dots: 1000000 → "1.000.000".
pub(crate) fn group_thousands(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
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

/// Multiplication by i64 (for quantity-style calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
