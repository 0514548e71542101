//! # Pricing Module
//!
//! The billing calculator: turns a cart plus discounts into a fully
//! reconciled totals breakdown.
//!
//! ## Derivation Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Totals Derivation                                  │
//! │                                                                         │
//! │  per line:  unit price ──► GST split (inclusive peel / exclusive add)  │
//! │                                                                         │
//! │  subtotal = Σ line bases          gst = Σ line taxes                   │
//! │       │                             │                                   │
//! │       └───────────┬─────────────────┘                                   │
//! │                   ▼                                                     │
//! │            gross = subtotal + gst                                       │
//! │                   │                                                     │
//! │                   ▼  − loyalty redemption (capped at gross)             │
//! │                   ▼  − manual discount (resolved against remainder)     │
//! │                   ▼                                                     │
//! │            after_discount                                               │
//! │                   │                                                     │
//! │                   ▼  round to whole rupee (half-up)                     │
//! │            rounded_total, rounding_adjustment ∈ (−50, +50] paise        │
//! │                                                                         │
//! │  INVARIANT: subtotal + gst − loyalty − discount + adjustment            │
//! │             == rounded_total, exactly, in integer paise.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::discount::{DiscountInput, LoyaltyRedemption, ManualDiscount};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::LOYALTY_EARN_SLAB_CENTS;

// =============================================================================
// Totals Breakdown
// =============================================================================

/// The complete, reconciled result of pricing a cart.
///
/// Every field is derived; nothing here is an input. The breakdown is what
/// gets written to the transaction header and printed on the receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsBreakdown {
    /// Sum of tax-exclusive line bases.
    pub subtotal: Money,
    /// Sum of line GST amounts.
    pub gst: Money,
    /// `subtotal + gst`.
    pub gross: Money,
    /// Loyalty redemption applied (resolved, capped).
    pub loyalty: LoyaltyRedemption,
    /// Manual discount applied (resolved, capped).
    pub discount: ManualDiscount,
    /// `gross − loyalty − discount`, before rounding.
    pub after_discount: Money,
    /// Final payable amount, a whole-rupee value.
    pub rounded_total: Money,
    /// `rounded_total − after_discount`, always in (−50, +50] paise.
    pub rounding_adjustment: Money,
    /// Points the customer earns on this sale (1 per full ₹100 paid).
    pub points_earned: i64,
    /// Discounts plus MRP savings across all lines.
    pub total_savings: Money,
}

impl TotalsBreakdown {
    /// An all-zero breakdown (empty cart).
    pub fn empty() -> Self {
        TotalsBreakdown {
            subtotal: Money::zero(),
            gst: Money::zero(),
            gross: Money::zero(),
            loyalty: LoyaltyRedemption::none(),
            discount: ManualDiscount::none(),
            after_discount: Money::zero(),
            rounded_total: Money::zero(),
            rounding_adjustment: Money::zero(),
            points_earned: 0,
            total_savings: Money::zero(),
        }
    }

    /// Checks the reconciliation identity. Holds for every breakdown this
    /// module produces; exposed for audit paths and tests.
    pub fn reconciles(&self) -> bool {
        self.subtotal + self.gst - self.loyalty.amount - self.discount.amount
            + self.rounding_adjustment
            == self.rounded_total
    }
}

// =============================================================================
// Calculator
// =============================================================================

/// Prices a cart.
///
/// `redeem_points` is the number of loyalty points the cashier asked to
/// apply (already validated against the customer's balance); it is capped
/// here against the gross amount. `discount` is re-resolved against the
/// post-loyalty remainder so a stale entry can never drive the bill
/// negative.
pub fn compute_totals(
    cart: &Cart,
    redeem_points: i64,
    discount: Option<DiscountInput>,
) -> TotalsBreakdown {
    if cart.is_empty() {
        return TotalsBreakdown::empty();
    }

    let subtotal: Money = cart.items.iter().map(|i| i.line_base()).sum();
    let gst: Money = cart.items.iter().map(|i| i.line_tax()).sum();
    let gross = subtotal + gst;

    let loyalty = LoyaltyRedemption::resolve(redeem_points, gross);
    let after_loyalty = gross - loyalty.amount;

    let discount = match discount {
        Some(input) => ManualDiscount::resolve(input, after_loyalty),
        None => ManualDiscount::none(),
    };
    let after_discount = after_loyalty - discount.amount;

    let rounded_total = after_discount.round_to_rupee();
    let rounding_adjustment = rounded_total - after_discount;

    let points_earned = rounded_total.cents() / LOYALTY_EARN_SLAB_CENTS;

    let mrp_savings: Money = cart.items.iter().map(|i| i.line_mrp_savings()).sum();
    let total_savings = loyalty.amount + discount.amount + mrp_savings;

    TotalsBreakdown {
        subtotal,
        gst,
        gross,
        loyalty,
        discount,
        after_discount,
        rounded_total,
        rounding_adjustment,
        points_earned,
        total_savings,
    }
}

/// Change due on a cash payment.
///
/// Errors when the tendered amount does not cover the total.
pub fn change_due(total: Money, tendered: Money) -> CoreResult<Money> {
    if tendered < total {
        return Err(CoreError::InsufficientCash {
            required: total.cents(),
            tendered: tendered.cents(),
        });
    }
    Ok(tendered - total)
}

// =============================================================================
// Unit Tests
// =============================================================================
