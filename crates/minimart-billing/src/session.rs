//! # POS Session
//!
//! The single mutable state of a sale in progress, driven by actions.
//!
//! ## Reducer Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session State Machine                              │
//! │                                                                         │
//! │  SessionAction ──► session.apply(action) ──► state mutated, or error   │
//! │                                                                         │
//! │  Totals are never stored: session.totals() recomputes the full          │
//! │  breakdown from current state, so cart, discount, and redemption can    │
//! │  never drift out of sync with what the customer is shown.               │
//! │                                                                         │
//! │  While `committing` is set, every mutating action is rejected with      │
//! │  CHECKOUT_IN_FLIGHT. This is the double-submit guard: checkout flips    │
//! │  the flag before its first write and clears it when done.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{BillingError, BillingResult};
use minimart_core::{
    compute_totals, Cart, CoreError, Customer, DiscountInput, LoyaltyRedemption, ManualDiscount,
    Money, PaymentMethod, Product, TotalsBreakdown,
};

// =============================================================================
// Session Actions
// =============================================================================

/// Everything a cashier can do to a sale before committing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionAction {
    /// Add units of a product (merges with an existing line).
    AddProduct { product: Product, quantity: i64 },
    /// Set a line's quantity outright; 0 removes the line.
    SetQuantity { product_id: String, quantity: i64 },
    /// Remove a line.
    RemoveItem { product_id: String },
    /// Empty the cart; discounts and redemption reset with it.
    ClearCart,
    /// Attach or detach the loyalty customer. Detaching drops any
    /// pending redemption.
    SetCustomer { customer: Option<Customer> },
    /// Request a number of loyalty points to redeem. Validated against
    /// the attached customer's balance.
    SetRedeemPoints { points: i64 },
    /// Set or clear the manual discount.
    SetDiscount { input: Option<DiscountInput> },
    /// Choose how the customer pays.
    SetPaymentMethod { method: PaymentMethod },
    /// Cash only: record the tendered amount.
    SetCashTendered { amount_cents: Option<i64> },
}

// =============================================================================
// POS Session
// =============================================================================

/// A sale in progress.
///
/// Construct one per till; `apply` actions as the cashier works; hand it
/// to [`crate::checkout::commit_sale`] to finish. On success the session
/// is reset for the next customer; on failure it is preserved untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosSession {
    /// The cart with frozen product snapshots.
    pub cart: Cart,
    /// Attached loyalty customer, if any.
    pub customer: Option<Customer>,
    /// Points the cashier asked to redeem (validated against balance).
    pub redeem_points: i64,
    /// Manual discount as entered; re-resolved on every totals() call.
    pub discount: Option<DiscountInput>,
    /// Selected payment method.
    pub payment_method: PaymentMethod,
    /// Cash only: tendered amount in paise.
    pub cash_tendered_cents: Option<i64>,
    /// Set for the duration of a checkout; blocks mutation.
    pub committing: bool,
}

impl PosSession {
    /// Creates an empty session paying by cash.
    pub fn new() -> Self {
        PosSession {
            cart: Cart::new(),
            customer: None,
            redeem_points: 0,
            discount: None,
            payment_method: PaymentMethod::Cash,
            cash_tendered_cents: None,
            committing: false,
        }
    }

    /// Applies an action, mutating the session.
    ///
    /// Rejected wholesale while a checkout is in flight.
    pub fn apply(&mut self, action: SessionAction) -> BillingResult<()> {
        if self.committing {
            return Err(CoreError::CheckoutInFlight.into());
        }

        match action {
            SessionAction::AddProduct { product, quantity } => {
                self.cart.add_item(&product, quantity)?;
            }
            SessionAction::SetQuantity {
                product_id,
                quantity,
            } => {
                self.cart.set_quantity(&product_id, quantity)?;
            }
            SessionAction::RemoveItem { product_id } => {
                self.cart.remove_item(&product_id)?;
            }
            SessionAction::ClearCart => {
                self.reset_sale_state();
            }
            SessionAction::SetCustomer { customer } => {
                if customer.is_none() {
                    self.redeem_points = 0;
                }
                self.customer = customer;
            }
            SessionAction::SetRedeemPoints { points } => {
                let balance = self.customer.as_ref().map_or(0, |c| c.loyalty_points);
                self.redeem_points = LoyaltyRedemption::validated(points, balance)?;
            }
            SessionAction::SetDiscount { input } => {
                if let Some(input) = input {
                    // Validate against the current post-loyalty base so the
                    // cashier hears about an oversized discount immediately.
                    let totals = compute_totals(&self.cart, self.redeem_points, None);
                    let base = totals.gross - totals.loyalty.amount;
                    ManualDiscount::validated(input, base)?;
                    self.discount = Some(input);
                } else {
                    self.discount = None;
                }
            }
            SessionAction::SetPaymentMethod { method } => {
                self.payment_method = method;
                if !method.is_cash() {
                    self.cash_tendered_cents = None;
                }
            }
            SessionAction::SetCashTendered { amount_cents } => {
                self.cash_tendered_cents = amount_cents;
            }
        }

        Ok(())
    }

    /// The current totals breakdown, recomputed from scratch.
    pub fn totals(&self) -> TotalsBreakdown {
        compute_totals(&self.cart, self.redeem_points, self.discount)
    }

    /// Change due on the current cash tender, if any.
    pub fn change_due(&self) -> Option<Money> {
        let tendered = Money::from_cents(self.cash_tendered_cents?);
        let total = self.totals().rounded_total;
        (tendered >= total).then(|| tendered - total)
    }

    /// Marks a checkout as started.
    ///
    /// Errors if one is already in flight (double-submit).
    pub fn begin_commit(&mut self) -> BillingResult<()> {
        if self.committing {
            return Err(BillingError::from(CoreError::CheckoutInFlight));
        }
        if self.cart.is_empty() {
            return Err(BillingError::from(CoreError::EmptyCart));
        }
        self.committing = true;
        Ok(())
    }

    /// Clears the committing flag after a failed checkout, preserving the
    /// cart so the cashier can retry.
    pub fn abort_commit(&mut self) {
        self.committing = false;
    }

    /// Resets the session for the next customer after a successful commit.
    pub fn finish_commit(&mut self) {
        self.reset_sale_state();
        self.customer = None;
        self.committing = false;
    }

    fn reset_sale_state(&mut self) {
        self.cart.clear();
        self.redeem_points = 0;
        self.discount = None;
        self.payment_method = PaymentMethod::Cash;
        self.cash_tendered_cents = None;
    }
}

impl Default for PosSession {
    fn default() -> Self {
        PosSession::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::Utc;

    fn product(id: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            brand: "Generic".to_string(),
            hsn_code: format!("100{id}"),
            barcode: None,
            mrp_cents: price_cents,
            cost_price_cents: 0,
            selling_price_cents: Some(price_cents),
            gst_rate_bps: 1800,
            price_includes_gst: true,
            stock_quantity: stock,
            min_stock_level: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn customer(points: i64) -> Customer {
        Customer {
            id: "c1".to_string(),
            name: "Asha Patel".to_string(),
            phone: "9876543210".to_string(),
            email: None,
            loyalty_points: points,
            total_spent_cents: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_and_totals() {
        let mut session = PosSession::new();
        session
            .apply(SessionAction::AddProduct {
                product: product("1", 11800, 10),
                quantity: 2,
            })
            .unwrap();

        let totals = session.totals();
        assert_eq!(totals.subtotal.cents(), 20_000);
        assert_eq!(totals.gst.cents(), 3_600);
        assert_eq!(totals.rounded_total.cents(), 23_600);
    }

    #[test]
    fn test_redeem_requires_balance() {
        let mut session = PosSession::new();

        // No customer attached: any redemption is over balance.
        let err = session
            .apply(SessionAction::SetRedeemPoints { points: 5 })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        session
            .apply(SessionAction::SetCustomer {
                customer: Some(customer(10)),
            })
            .unwrap();
        session
            .apply(SessionAction::SetRedeemPoints { points: 5 })
            .unwrap();
        assert_eq!(session.redeem_points, 5);
    }

    #[test]
    fn test_detaching_customer_drops_redemption() {
        let mut session = PosSession::new();
        session
            .apply(SessionAction::SetCustomer {
                customer: Some(customer(10)),
            })
            .unwrap();
        session
            .apply(SessionAction::SetRedeemPoints { points: 5 })
            .unwrap();

        session
            .apply(SessionAction::SetCustomer { customer: None })
            .unwrap();
        assert_eq!(session.redeem_points, 0);
    }

    #[test]
    fn test_oversized_discount_rejected_at_entry() {
        let mut session = PosSession::new();
        session
            .apply(SessionAction::AddProduct {
                product: product("1", 5000, 10),
                quantity: 1,
            })
            .unwrap();

        let err = session
            .apply(SessionAction::SetDiscount {
                input: Some(DiscountInput::Flat { amount_cents: 10_000 }),
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[test]
    fn test_stale_discount_capped_on_recompute() {
        let mut session = PosSession::new();
        session
            .apply(SessionAction::AddProduct {
                product: product("1", 10_000, 10),
                quantity: 2,
            })
            .unwrap();
        session
            .apply(SessionAction::SetDiscount {
                input: Some(DiscountInput::Flat { amount_cents: 15_000 }),
            })
            .unwrap();

        // Shrink the cart under the discount.
        session
            .apply(SessionAction::SetQuantity {
                product_id: "1".to_string(),
                quantity: 1,
            })
            .unwrap();

        let totals = session.totals();
        assert_eq!(totals.discount.amount.cents(), 10_000);
        assert_eq!(totals.rounded_total.cents(), 0);
        assert!(totals.reconciles());
    }

    #[test]
    fn test_committing_blocks_mutation() {
        let mut session = PosSession::new();
        session
            .apply(SessionAction::AddProduct {
                product: product("1", 5000, 10),
                quantity: 1,
            })
            .unwrap();

        session.begin_commit().unwrap();

        let err = session
            .apply(SessionAction::ClearCart)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CheckoutInFlight);

        // Double begin is also rejected.
        assert_eq!(
            session.begin_commit().unwrap_err().code,
            ErrorCode::CheckoutInFlight
        );

        session.abort_commit();
        assert_eq!(session.cart.item_count(), 1);
        session.apply(SessionAction::ClearCart).unwrap();
    }

    #[test]
    fn test_begin_commit_rejects_empty_cart() {
        let mut session = PosSession::new();
        assert_eq!(
            session.begin_commit().unwrap_err().code,
            ErrorCode::CartError
        );
    }

    #[test]
    fn test_change_due() {
        let mut session = PosSession::new();
        session
            .apply(SessionAction::AddProduct {
                product: product("1", 11_800, 10),
                quantity: 1,
            })
            .unwrap();
        session
            .apply(SessionAction::SetCashTendered {
                amount_cents: Some(15_000),
            })
            .unwrap();

        assert_eq!(session.change_due().unwrap().cents(), 3_200);

        session
            .apply(SessionAction::SetCashTendered {
                amount_cents: Some(10_000),
            })
            .unwrap();
        assert!(session.change_due().is_none());
    }

    #[test]
    fn test_card_clears_tender() {
        let mut session = PosSession::new();
        session
            .apply(SessionAction::SetCashTendered {
                amount_cents: Some(5_000),
            })
            .unwrap();
        session
            .apply(SessionAction::SetPaymentMethod {
                method: PaymentMethod::Card,
            })
            .unwrap();
        assert!(session.cash_tendered_cents.is_none());
    }
}
