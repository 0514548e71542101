//! # Checkout
//!
//! The ordered commit sequence that turns a session into a permanent sale.
//!
//! ## Commit Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      commit_sale                                        │
//! │                                                                         │
//! │  0. begin_commit      ── double-submit + empty-cart guard               │
//! │  1. AllocateInvoice   ── next "NM NNNN"                                 │
//! │  2. InsertTransaction ── header with full money derivation              │
//! │  3. InsertItems       ── frozen product snapshots                       │
//! │  4. DecrementStock    ── conditional UPDATE per line                    │
//! │  5. UpdateCustomer    ── points delta (clamped) + spend                 │
//! │  6. RecordLoyalty     ── ledger append  (NON-FATAL: warning only)       │
//! │                                                                         │
//! │  Steps 1-5: first failure aborts the sequence. No compensating          │
//! │  rollback is attempted; earlier writes stand (an orphaned header is     │
//! │  visible in reports and can be voided by hand, which beats silently     │
//! │  deleting money records). The session is preserved so the cashier       │
//! │  can fix the cause and retry.                                           │
//! │                                                                         │
//! │  Step 6 failing loses an audit row but not the balance update from      │
//! │  step 5, so the sale still completes with a warning.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{BillingError, BillingResult};
use crate::invoice::next_invoice_number;
use crate::session::PosSession;
use minimart_core::{
    change_due, Cashier, CoreError, Money, Transaction, TransactionItem, TransactionStatus,
};
use minimart_db::repository::loyalty::entry_for_sale;
use minimart_db::Database;

// =============================================================================
// Commit Step
// =============================================================================

/// The stages of the commit sequence, for logging and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStep {
    AllocateInvoice,
    InsertTransaction,
    InsertItems,
    DecrementStock,
    UpdateCustomer,
    RecordLoyalty,
}

impl CommitStep {
    fn label(&self) -> &'static str {
        match self {
            CommitStep::AllocateInvoice => "allocate invoice",
            CommitStep::InsertTransaction => "insert transaction",
            CommitStep::InsertItems => "insert items",
            CommitStep::DecrementStock => "decrement stock",
            CommitStep::UpdateCustomer => "update customer",
            CommitStep::RecordLoyalty => "record loyalty",
        }
    }
}

// =============================================================================
// Checkout Outcome
// =============================================================================

/// Result of a successful commit.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    /// The committed transaction header.
    pub transaction: Transaction,
    /// The committed line items.
    pub items: Vec<TransactionItem>,
    /// Cash only: change returned.
    pub change: Option<Money>,
    /// Set when step 6 (loyalty ledger) failed; the sale itself stands.
    pub warning: Option<String>,
}

// =============================================================================
// Commit
// =============================================================================

/// Commits the session as a sale.
///
/// On success the session resets for the next customer. On failure the
/// session (cart, customer, discounts) is preserved untouched so the
/// cashier can retry.
pub async fn commit_sale(
    db: &Database,
    session: &mut PosSession,
    cashier: &Cashier,
) -> BillingResult<CheckoutOutcome> {
    session.begin_commit()?;

    let result = run_commit(db, session, cashier).await;
    match result {
        Ok(outcome) => {
            session.finish_commit();
            info!(
                invoice = %outcome.transaction.invoice_number,
                total = %outcome.transaction.total_cents,
                "Sale committed"
            );
            Ok(outcome)
        }
        Err(err) => {
            session.abort_commit();
            Err(err)
        }
    }
}

async fn run_commit(
    db: &Database,
    session: &PosSession,
    cashier: &Cashier,
) -> BillingResult<CheckoutOutcome> {
    let totals = session.totals();
    let total = totals.rounded_total;

    // Cash sales must be covered before anything is written.
    let (tendered_cents, change) = if session.payment_method.is_cash() {
        let tendered = Money::from_cents(
            session
                .cash_tendered_cents
                .ok_or_else(|| BillingError::from(CoreError::InsufficientCash {
                    required: total.cents(),
                    tendered: 0,
                }))?,
        );
        let change = change_due(total, tendered)?;
        (Some(tendered.cents()), Some(change))
    } else {
        (None, None)
    };

    // Step 1: allocate invoice number
    debug!(step = ?CommitStep::AllocateInvoice, "Commit step");
    let invoice_number = next_invoice_number(db)
        .await
        .map_err(|e| at_step(CommitStep::AllocateInvoice, e))?;

    let now = Utc::now();
    let transaction_id = Uuid::new_v4().to_string();

    let transaction = Transaction {
        id: transaction_id.clone(),
        invoice_number,
        cashier_id: cashier.id.clone(),
        cashier_name: cashier.name.clone(),
        customer_id: session.customer.as_ref().map(|c| c.id.clone()),
        customer_name: session.customer.as_ref().map(|c| c.name.clone()),
        customer_phone: session.customer.as_ref().map(|c| c.phone.clone()),
        subtotal_cents: totals.subtotal.cents(),
        gst_cents: totals.gst.cents(),
        discount_cents: totals.discount.amount.cents(),
        discount_bps: totals.discount.bps,
        loyalty_discount_cents: totals.loyalty.amount.cents(),
        rounding_cents: totals.rounding_adjustment.cents(),
        total_cents: total.cents(),
        payment_method: session.payment_method,
        cash_tendered_cents: tendered_cents,
        change_cents: change.map(|c| c.cents()),
        loyalty_points_earned: if session.customer.is_some() {
            totals.points_earned
        } else {
            0
        },
        loyalty_points_redeemed: totals.loyalty.points,
        status: TransactionStatus::Completed,
        created_at: now,
    };

    // Step 2: insert header
    debug!(step = ?CommitStep::InsertTransaction, "Commit step");
    db.transactions()
        .insert(&transaction)
        .await
        .map_err(|e| at_step(CommitStep::InsertTransaction, e.into()))?;

    // Step 3: insert item snapshots
    debug!(step = ?CommitStep::InsertItems, "Commit step");
    let items: Vec<TransactionItem> = session
        .cart
        .items
        .iter()
        .map(|item| TransactionItem {
            id: Uuid::new_v4().to_string(),
            transaction_id: transaction_id.clone(),
            product_id: Some(item.product_id.clone()),
            name_snapshot: item.name.clone(),
            brand_snapshot: item.brand.clone(),
            hsn_snapshot: item.hsn_code.clone(),
            quantity: item.quantity,
            mrp_cents: item.mrp_cents,
            cost_price_cents: item.cost_price_cents,
            selling_price_cents: item.unit_price_cents,
            gst_rate_bps: item.gst_rate_bps,
            price_includes_gst: item.price_includes_gst,
            line_total_cents: item.line_total().cents(),
            created_at: now,
        })
        .collect();
    db.transactions()
        .insert_items(&items)
        .await
        .map_err(|e| at_step(CommitStep::InsertItems, e.into()))?;

    // Step 4: decrement stock per line
    debug!(step = ?CommitStep::DecrementStock, "Commit step");
    for item in &session.cart.items {
        db.products()
            .decrement_stock(&item.product_id, item.quantity)
            .await
            .map_err(|e| at_step(CommitStep::DecrementStock, e.into()))?;
    }

    // Steps 5-6 only apply to loyalty sales.
    let mut warning = None;
    if let Some(customer) = &session.customer {
        // Step 5: points delta + spend
        debug!(step = ?CommitStep::UpdateCustomer, "Commit step");
        db.customers()
            .apply_sale(
                &customer.id,
                transaction.loyalty_points_earned,
                transaction.loyalty_points_redeemed,
                transaction.total_cents,
            )
            .await
            .map_err(|e| at_step(CommitStep::UpdateCustomer, e.into()))?;

        // Step 6: ledger append. The balance already moved; losing the
        // audit row is not worth failing the whole sale over.
        if transaction.loyalty_points_earned > 0 || transaction.loyalty_points_redeemed > 0 {
            debug!(step = ?CommitStep::RecordLoyalty, "Commit step");
            let entry = entry_for_sale(
                &customer.id,
                &transaction_id,
                transaction.loyalty_points_earned,
                transaction.loyalty_points_redeemed,
                transaction.loyalty_discount_cents,
            );
            if let Err(e) = db.loyalty().append(&entry).await {
                warn!(error = %e, "Loyalty ledger append failed; sale stands");
                warning = Some(format!("Loyalty ledger entry not recorded: {e}"));
            }
        }
    }

    Ok(CheckoutOutcome {
        transaction,
        items,
        change,
        warning,
    })
}

fn at_step(step: CommitStep, err: BillingError) -> BillingError {
    BillingError::new(err.code, format!("Checkout failed at {}: {}", step.label(), err.message))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::session::SessionAction;
    use minimart_core::{DiscountInput, PaymentMethod};
    use minimart_db::repository::customer::new_customer;
    use minimart_db::repository::product::new_product;
    use minimart_db::DbConfig;

    fn cashier() -> Cashier {
        Cashier {
            id: "cashier-1".to_string(),
            name: "Admin".to_string(),
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Worked bill: ₹118 incl 18% × 2 plus ₹50 excl 5% × 1 → ₹289 payable.
    async fn seeded_session(db: &Database) -> PosSession {
        let p1 = new_product(
            "Biscuits", "Parle", "1905", None, 11_800, Some(11_800), 1800, true, 10,
        );
        let p2 = new_product(
            "Loose Rice", "Local", "1006", None, 5_000, Some(5_000), 500, false, 10,
        );
        db.products().insert(&p1).await.unwrap();
        db.products().insert(&p2).await.unwrap();

        let mut session = PosSession::new();
        session
            .apply(SessionAction::AddProduct { product: p1, quantity: 2 })
            .unwrap();
        session
            .apply(SessionAction::AddProduct { product: p2, quantity: 1 })
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_full_cash_checkout() {
        let db = test_db().await;
        let mut session = seeded_session(&db).await;
        session
            .apply(SessionAction::SetCashTendered { amount_cents: Some(30_000) })
            .unwrap();

        let outcome = commit_sale(&db, &mut session, &cashier()).await.unwrap();

        assert_eq!(outcome.transaction.invoice_number, "NM 0001");
        assert_eq!(outcome.transaction.subtotal_cents, 25_000);
        assert_eq!(outcome.transaction.gst_cents, 3_850);
        assert_eq!(outcome.transaction.rounding_cents, 50);
        assert_eq!(outcome.transaction.total_cents, 28_900);
        assert_eq!(outcome.change.unwrap().cents(), 1_100);
        assert_eq!(outcome.items.len(), 2);
        assert!(outcome.warning.is_none());

        // Session reset for the next customer.
        assert!(session.cart.is_empty());
        assert!(!session.committing);

        // Stock went down.
        let biscuits = db.products().search("biscuits", 1).await.unwrap();
        assert_eq!(biscuits[0].stock_quantity, 8);

        // Header persisted and reconciles.
        let stored = db
            .transactions()
            .get_by_invoice("NM 0001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.subtotal_cents + stored.gst_cents - stored.loyalty_discount_cents
                - stored.discount_cents
                + stored.rounding_cents,
            stored.total_cents
        );
    }

    #[tokio::test]
    async fn test_insufficient_cash_writes_nothing() {
        let db = test_db().await;
        let mut session = seeded_session(&db).await;
        session
            .apply(SessionAction::SetCashTendered { amount_cents: Some(20_000) })
            .unwrap();

        let err = commit_sale(&db, &mut session, &cashier()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);

        // Cart preserved, nothing persisted, no invoice consumed.
        assert_eq!(session.cart.item_count(), 2);
        assert!(!session.committing);
        assert!(db.transactions().last_invoice_number().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stock_failure_aborts_and_preserves_cart() {
        let db = test_db().await;
        let mut session = seeded_session(&db).await;
        session
            .apply(SessionAction::SetPaymentMethod { method: PaymentMethod::Upi })
            .unwrap();

        // Another till sells the biscuits out from under this session.
        let biscuits = db.products().search("biscuits", 1).await.unwrap();
        db.products().decrement_stock(&biscuits[0].id, 9).await.unwrap();

        let err = commit_sale(&db, &mut session, &cashier()).await.unwrap_err();
        assert!(err.message.contains("decrement stock"));

        // Session preserved for retry.
        assert_eq!(session.cart.item_count(), 2);
        assert!(!session.committing);
    }

    #[tokio::test]
    async fn test_item_insert_failure_preserves_session() {
        let db = test_db().await;
        let mut session = seeded_session(&db).await;
        session
            .apply(SessionAction::SetPaymentMethod { method: PaymentMethod::Upi })
            .unwrap();

        // Break the items table so the commit fails after the header lands.
        sqlx::query("DROP TABLE transaction_items")
            .execute(db.pool())
            .await
            .unwrap();

        let err = commit_sale(&db, &mut session, &cashier()).await.unwrap_err();
        assert!(err.message.contains("insert items"));

        // The header stands (no rollback), stock was never touched, and the
        // session is preserved for retry.
        assert!(db.transactions().get_by_invoice("NM 0001").await.unwrap().is_some());
        let biscuits = db.products().search("biscuits", 1).await.unwrap();
        assert_eq!(biscuits[0].stock_quantity, 10);
        assert_eq!(session.cart.item_count(), 2);
        assert!(!session.committing);
    }

    #[tokio::test]
    async fn test_loyalty_sale_updates_customer_and_ledger() {
        let db = test_db().await;
        let mut session = seeded_session(&db).await;

        let mut customer = new_customer("Asha Patel", "9876543210", None);
        customer.loyalty_points = 50;
        db.customers().insert(&customer).await.unwrap();

        session
            .apply(SessionAction::SetCustomer { customer: Some(customer.clone()) })
            .unwrap();
        session
            .apply(SessionAction::SetRedeemPoints { points: 50 })
            .unwrap();
        session
            .apply(SessionAction::SetDiscount {
                input: Some(DiscountInput::Percentage { bps: 1000 }),
            })
            .unwrap();
        session
            .apply(SessionAction::SetPaymentMethod { method: PaymentMethod::Upi })
            .unwrap();

        // Gross ₹288.50 − ₹50 loyalty = ₹238.50; −10% = ₹214.65 → ₹215.
        let outcome = commit_sale(&db, &mut session, &cashier()).await.unwrap();
        assert_eq!(outcome.transaction.total_cents, 21_500);
        assert_eq!(outcome.transaction.loyalty_points_redeemed, 50);
        assert_eq!(outcome.transaction.loyalty_points_earned, 2);

        // 50 − 50 redeemed + 2 earned.
        let updated = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(updated.loyalty_points, 2);
        assert_eq!(updated.total_spent_cents, 21_500);

        let history = db.loyalty().history(&customer.id, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].points_redeemed, 50);
        assert_eq!(history[0].points_earned, 2);
    }

    #[tokio::test]
    async fn test_anonymous_sale_earns_no_points() {
        let db = test_db().await;
        let mut session = seeded_session(&db).await;
        session
            .apply(SessionAction::SetPaymentMethod { method: PaymentMethod::Card })
            .unwrap();

        let outcome = commit_sale(&db, &mut session, &cashier()).await.unwrap();
        assert_eq!(outcome.transaction.loyalty_points_earned, 0);
        assert!(outcome.transaction.customer_id.is_none());
        assert!(outcome.change.is_none());
    }

    #[tokio::test]
    async fn test_sequential_invoices() {
        let db = test_db().await;

        let p = new_product("Soap", "Lux", "3401", None, 3_500, None, 1800, true, 50);
        db.products().insert(&p).await.unwrap();

        for expected in ["NM 0001", "NM 0002", "NM 0003"] {
            let product = db.products().get_by_id(&p.id).await.unwrap().unwrap();
            let mut session = PosSession::new();
            session
                .apply(SessionAction::AddProduct { product, quantity: 1 })
                .unwrap();
            session
                .apply(SessionAction::SetPaymentMethod { method: PaymentMethod::Upi })
                .unwrap();
            let outcome = commit_sale(&db, &mut session, &cashier()).await.unwrap();
            assert_eq!(outcome.transaction.invoice_number, expected);
        }
    }
}
