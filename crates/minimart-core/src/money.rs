//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In JavaScript/floating point:                                      │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  A receipt whose lines don't reconcile to its total is a silently   │
//! │  incorrect invoice. OUR SOLUTION: integer paise.                    │
//! │    ₹118.00 is 11800. Every split is explicit, every paise lost to   │
//! │    rounding is captured in a named rounding adjustment.             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use minimart_core::money::Money;
//!
//! // Create from paise (preferred)
//! let price = Money::from_cents(11800); // ₹118.00
//!
//! // Arithmetic operations
//! let doubled = price * 2;                        // ₹236.00
//! let total = price + Money::from_cents(5000);    // ₹168.00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise for INR).
///
/// ## Design Decisions
/// - **i64 (signed)**: negative values are legal (rounding adjustments,
///   discount deltas) and must print with a sign
/// - **Single-field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ## Example
    /// ```rust
    /// use minimart_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(118).cents(), 11800);
    /// ```
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    /// Returns the larger of two amounts.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// Tax to be *added* to a tax-exclusive amount, rounded half-up.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 provides
    /// half-up rounding (5000/10000 = 0.5). i128 prevents overflow on
    /// large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use minimart_core::money::Money;
    /// use minimart_core::types::TaxRate;
    ///
    /// let price = Money::from_cents(5000);  // ₹50.00
    /// let rate = TaxRate::from_bps(500);    // 5%
    /// assert_eq!(price.tax_portion(rate).cents(), 250); // ₹2.50
    /// ```
    pub fn tax_portion(&self, rate: TaxRate) -> Money {
        let tax = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(tax as i64)
    }

    /// Base price hidden inside a tax-*inclusive* amount, rounded half-up.
    ///
    /// The GST share of an inclusive price is `self - self.base_excluding(rate)`,
    /// so base + tax always reconstructs the listed price exactly.
    ///
    /// ## Example
    /// ```rust
    /// use minimart_core::money::Money;
    /// use minimart_core::types::TaxRate;
    ///
    /// let listed = Money::from_cents(11800); // ₹118.00 incl. 18% GST
    /// let rate = TaxRate::from_bps(1800);
    /// assert_eq!(listed.base_excluding(rate).cents(), 10000);
    /// ```
    pub fn base_excluding(&self, rate: TaxRate) -> Money {
        let divisor = 10000 + rate.bps() as i128;
        let base = (self.0 as i128 * 10000 + divisor / 2) / divisor;
        Money(base as i64)
    }

    /// Scales this amount by a basis-point factor, rounded half-up.
    /// Used for percentage discounts: `base.scale_bps(2000)` is 20% of base.
    pub fn scale_bps(&self, bps: u32) -> Money {
        let scaled = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money(scaled as i64)
    }

    /// Rounds to the nearest whole rupee, half-up (toward +∞).
    ///
    /// The difference `rounded - self` is the rounding adjustment and is
    /// always in (−₹0.50, +₹0.50].
    ///
    /// ## Example
    /// ```rust
    /// use minimart_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(28850).round_to_rupee().cents(), 28900);
    /// assert_eq!(Money::from_cents(28849).round_to_rupee().cents(), 28800);
    /// ```
    pub fn round_to_rupee(&self) -> Money {
        Money((self.0 + 50).div_euclid(100) * 100)
    }

    /// Multiplies by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money in a human-readable "₹x.yy" format.
/// Receipts use this directly; the value is locale-fixed by design.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents_and_parts() {
        let money = Money::from_cents(11899);
        assert_eq!(money.cents(), 11899);
        assert_eq!(money.rupees(), 118);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(11800)), "₹118.00");
        assert_eq!(format!("{}", Money::from_cents(250)), "₹2.50");
        assert_eq!(format!("{}", Money::from_cents(-50)), "-₹0.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "₹0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((-b).cents(), -500);
    }

    #[test]
    fn test_tax_portion_exclusive() {
        // ₹50.00 at 5% = ₹2.50
        let amount = Money::from_cents(5000);
        assert_eq!(amount.tax_portion(TaxRate::from_bps(500)).cents(), 250);

        // ₹10.00 at 8.25% = ₹0.825 → ₹0.83 (half-up)
        let amount = Money::from_cents(1000);
        assert_eq!(amount.tax_portion(TaxRate::from_bps(825)).cents(), 83);
    }

    #[test]
    fn test_base_excluding_inclusive() {
        // ₹118.00 incl. 18% → base ₹100.00, GST ₹18.00
        let listed = Money::from_cents(11800);
        let rate = TaxRate::from_bps(1800);
        let base = listed.base_excluding(rate);
        assert_eq!(base.cents(), 10000);
        assert_eq!((listed - base).cents(), 1800);
    }

    #[test]
    fn test_base_plus_tax_reconstructs_listed_price() {
        // Awkward inclusive prices must still split without losing a paise.
        for cents in [1, 99, 101, 3333, 9999, 123457] {
            let listed = Money::from_cents(cents);
            let rate = TaxRate::from_bps(1800);
            let base = listed.base_excluding(rate);
            let tax = listed - base;
            assert_eq!((base + tax).cents(), cents);
        }
    }

    #[test]
    fn test_round_to_rupee() {
        assert_eq!(Money::from_cents(28850).round_to_rupee().cents(), 28900); // half rounds up
        assert_eq!(Money::from_cents(28849).round_to_rupee().cents(), 28800);
        assert_eq!(Money::from_cents(28851).round_to_rupee().cents(), 28900);
        assert_eq!(Money::from_cents(0).round_to_rupee().cents(), 0);
        assert_eq!(Money::from_cents(-50).round_to_rupee().cents(), 0);
        assert_eq!(Money::from_cents(-51).round_to_rupee().cents(), -100);
    }

    #[test]
    fn test_rounding_adjustment_range() {
        for cents in -10_000..10_000 {
            let m = Money::from_cents(cents);
            let adj = m.round_to_rupee() - m;
            assert!(adj.cents() > -50 && adj.cents() <= 50, "cents={cents}");
        }
    }

    #[test]
    fn test_scale_bps() {
        // 20% of ₹500.00 = ₹100.00
        assert_eq!(Money::from_cents(50000).scale_bps(2000).cents(), 10000);
        // 100% is identity
        assert_eq!(Money::from_cents(12345).scale_bps(10000).cents(), 12345);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300].iter().map(|c| Money::from_cents(*c)).sum();
        assert_eq!(total.cents(), 600);
    }
}
