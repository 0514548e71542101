//! # Discount Module
//!
//! Manual discounts and loyalty point redemption.
//!
//! ## Discount Order
//! ```text
//! gross (subtotal + GST)
//!   │
//!   ├── minus loyalty redemption   (1 point = ₹1.00, capped at gross)
//!   │
//!   └── minus manual discount      (flat or percentage, capped at remainder)
//! ```
//!
//! A discount is entered once but re-resolved against the *current* base on
//! every recompute, so removing items after granting "20% off" keeps the
//! discount proportional instead of letting it exceed the bill.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::LOYALTY_POINT_VALUE_CENTS;

// =============================================================================
// Discount Input
// =============================================================================

/// A manual discount as entered by the cashier.
///
/// The input is stored as-is; [`ManualDiscount`] is derived from it against
/// whatever base is current when totals are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DiscountInput {
    /// Percentage off, in basis points (2000 = 20%).
    Percentage { bps: u32 },
    /// Fixed amount off, in paise.
    Flat { amount_cents: i64 },
}

impl DiscountInput {
    /// Validates the raw input, independent of any base amount.
    ///
    /// - Percentage must be within 0-100%
    /// - Flat amount must be non-negative
    pub fn validate(&self) -> CoreResult<()> {
        match *self {
            DiscountInput::Percentage { bps } => {
                if bps > 10_000 {
                    return Err(CoreError::DiscountPercentOutOfRange { bps });
                }
            }
            DiscountInput::Flat { amount_cents } => {
                if amount_cents < 0 {
                    return Err(CoreError::DiscountExceedsBase {
                        amount: amount_cents,
                        base: 0,
                    });
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Manual Discount
// =============================================================================

/// A manual discount resolved against a concrete base amount.
///
/// Both representations are always populated: a flat amount gets an
/// equivalent percentage and vice versa, so the transaction header can
/// record both `discount_cents` and `discount_bps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualDiscount {
    /// Discount amount in paise.
    pub amount: Money,
    /// Equivalent percentage in basis points (relative to the base).
    pub bps: u32,
}

impl ManualDiscount {
    /// No discount.
    pub fn none() -> Self {
        ManualDiscount {
            amount: Money::zero(),
            bps: 0,
        }
    }

    /// Resolves an input against a base, erroring when it does not fit.
    ///
    /// Used at entry time so the cashier hears about an over-large discount
    /// immediately rather than at checkout.
    pub fn validated(input: DiscountInput, base: Money) -> CoreResult<Self> {
        input.validate()?;
        match input {
            DiscountInput::Flat { amount_cents } if amount_cents > base.cents() => {
                Err(CoreError::DiscountExceedsBase {
                    amount: amount_cents,
                    base: base.cents(),
                })
            }
            _ => Ok(Self::resolve(input, base)),
        }
    }

    /// Resolves an input against a base, silently capping at the base.
    ///
    /// Used on recompute: the cart may have shrunk since the discount was
    /// entered, and a stale flat discount must never push the total negative.
    pub fn resolve(input: DiscountInput, base: Money) -> Self {
        if base.cents() <= 0 {
            return ManualDiscount::none();
        }
        match input {
            DiscountInput::Percentage { bps } => {
                let bps = bps.min(10_000);
                ManualDiscount {
                    amount: base.scale_bps(bps),
                    bps,
                }
            }
            DiscountInput::Flat { amount_cents } => {
                let amount = Money::from_cents(amount_cents.max(0)).min(base);
                // Equivalent percentage, half-up, for the record only.
                let bps = ((amount.cents() as i128 * 10_000 + base.cents() as i128 / 2)
                    / base.cents() as i128) as u32;
                ManualDiscount { amount, bps }
            }
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl Default for ManualDiscount {
    fn default() -> Self {
        ManualDiscount::none()
    }
}

// =============================================================================
// Loyalty Redemption
// =============================================================================

/// Loyalty points applied to a sale as a discount.
///
/// 1 point is worth [`LOYALTY_POINT_VALUE_CENTS`] paise (₹1.00). Redemption
/// is applied before the manual discount and never exceeds the gross amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyRedemption {
    /// Points actually consumed.
    pub points: i64,
    /// Discount value of those points in paise.
    pub amount: Money,
}

impl LoyaltyRedemption {
    /// No redemption.
    pub fn none() -> Self {
        LoyaltyRedemption {
            points: 0,
            amount: Money::zero(),
        }
    }

    /// Validates a redemption request against the customer's balance.
    ///
    /// The point count is checked here; capping against the bill happens in
    /// [`LoyaltyRedemption::resolve`] because the bill can change afterward.
    pub fn validated(requested: i64, balance: i64) -> CoreResult<i64> {
        if requested < 0 {
            return Err(CoreError::RedemptionExceedsBalance {
                requested,
                balance,
            });
        }
        if requested > balance {
            return Err(CoreError::RedemptionExceedsBalance {
                requested,
                balance,
            });
        }
        Ok(requested)
    }

    /// Resolves a point count against the gross amount.
    ///
    /// Points worth more than the bill are trimmed so the discount never
    /// exceeds gross; only the points actually consumed are recorded (the
    /// rest stay on the customer's balance).
    pub fn resolve(requested: i64, gross: Money) -> Self {
        if requested <= 0 || gross.cents() <= 0 {
            return LoyaltyRedemption::none();
        }
        let max_points = gross.cents() / LOYALTY_POINT_VALUE_CENTS;
        // A sub-rupee remainder still allows one more partial point's worth.
        let max_points = if gross.cents() % LOYALTY_POINT_VALUE_CENTS > 0 {
            max_points + 1
        } else {
            max_points
        };
        let points = requested.min(max_points);
        let amount = Money::from_cents(points * LOYALTY_POINT_VALUE_CENTS).min(gross);
        LoyaltyRedemption { points, amount }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.points == 0
    }
}

impl Default for LoyaltyRedemption {
    fn default() -> Self {
        LoyaltyRedemption::none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
