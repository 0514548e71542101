//! # Domain Types
//!
//! Core domain types used throughout Minimart POS.
//!
//! ## Snapshot Pattern
//! A committed sale must render the same receipt forever. Transaction
//! items therefore carry frozen copies of the product fields they were
//! sold under (name, brand, HSN, prices, GST rate and inclusion flag)
//! instead of live references; editing or deleting the product later
//! never rewrites history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// GST rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000.
/// 1800 bps = 18% (a common GST slab); no floats anywhere in tax math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
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

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// `selling_price_cents` is the actual sale price and is optional; when
/// absent the product sells at MRP. `selling_price ≤ mrp` is expected but
/// not enforced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name. Unique among products (enforced by the store,
    /// pre-checked before insert for a friendly error).
    pub name: String,

    /// Brand label shown on the POS grid and receipts.
    pub brand: String,

    /// HSN tax-classification code. Unique; used for reporting, not pricing.
    pub hsn_code: String,

    /// Barcode (EAN-13, UPC-A, etc.). Unique when present.
    pub barcode: Option<String>,

    /// Maximum retail price in paise.
    pub mrp_cents: i64,

    /// Cost price in paise (for margin reporting).
    pub cost_price_cents: i64,

    /// Actual sale price in paise. Falls back to MRP when unset.
    pub selling_price_cents: Option<i64>,

    /// GST rate in basis points (1800 = 18%).
    pub gst_rate_bps: u32,

    /// Whether the selling price already includes GST.
    pub price_includes_gst: bool,

    /// Current stock level. Never negative.
    pub stock_quantity: i64,

    /// Reorder threshold for the low-stock report.
    pub min_stock_level: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Effective unit price: selling price if set, else MRP.
    #[inline]
    pub fn effective_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents.unwrap_or(self.mrp_cents))
    }

    /// The list price as Money.
    #[inline]
    pub fn mrp(&self) -> Money {
        Money::from_cents(self.mrp_cents)
    }

    /// Returns the GST rate.
    #[inline]
    pub fn gst_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.gst_rate_bps)
    }

    /// Per-unit savings versus MRP, floored at zero.
    pub fn mrp_savings(&self) -> Money {
        (self.mrp() - self.effective_price()).max(Money::zero())
    }

    /// Checks whether `quantity` units can be sold from current stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity > 0 && self.stock_quantity >= quantity
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A loyalty customer. Mutated only as a side effect of a committed
/// transaction (points earned/redeemed, spend accumulated).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    /// Loyalty point balance. Non-negative by contract.
    pub loyalty_points: i64,
    /// Cumulative spend in paise.
    pub total_spent_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cashier
// =============================================================================

/// The authenticated identity running the till. Authentication itself is
/// external; this is what gets stamped onto transaction headers and receipts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cashier {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash. The only method with tendered amount and change.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// UPI transfer.
    Upi,
}

impl PaymentMethod {
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }

    /// Uppercase label used on receipts.
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Upi => "UPI",
        }
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

/// Status of a committed transaction. Transactions are immutable once
/// committed except for this denormalized flag in exceptional flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Refunded,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Completed
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A committed sale.
///
/// The money columns record the full derivation chain and must reconcile
/// exactly:
///
/// ```text
/// subtotal + gst − loyalty_discount − discount + rounding == total
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Transaction {
    pub id: String,
    /// Human-facing sequential invoice number, e.g. "NM 0042".
    pub invoice_number: String,
    pub cashier_id: String,
    pub cashier_name: String,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    /// Tax-exclusive base, in paise.
    pub subtotal_cents: i64,
    /// Total GST in paise.
    pub gst_cents: i64,
    /// Manual discount amount in paise.
    pub discount_cents: i64,
    /// Manual discount percentage in basis points.
    pub discount_bps: u32,
    /// Loyalty-redemption discount in paise.
    pub loyalty_discount_cents: i64,
    /// Signed rounding adjustment in paise (rounded − unrounded).
    pub rounding_cents: i64,
    /// Final payable amount, a whole-rupee value in paise.
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    /// Cash only: amount the customer handed over.
    pub cash_tendered_cents: Option<i64>,
    /// Cash only: change returned.
    pub change_cents: Option<i64>,
    pub loyalty_points_earned: i64,
    pub loyalty_points_redeemed: i64,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn gst(&self) -> Money {
        Money::from_cents(self.gst_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A line item of a committed sale. Frozen product snapshot; see the
/// module docs for why nothing here references live product state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    /// Original product id. Nullable in storage once the product is deleted.
    pub product_id: Option<String>,
    pub name_snapshot: String,
    pub brand_snapshot: String,
    pub hsn_snapshot: String,
    pub quantity: i64,
    pub mrp_cents: i64,
    pub cost_price_cents: i64,
    /// Effective unit price at time of sale.
    pub selling_price_cents: i64,
    pub gst_rate_bps: u32,
    pub price_includes_gst: bool,
    /// Listed line total (unit price × quantity).
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl TransactionItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }

    /// Line savings versus MRP, floored at zero.
    pub fn mrp_savings_total(&self) -> Money {
        (Money::from_cents(self.mrp_cents) - self.unit_price())
            .max(Money::zero())
            .multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Loyalty Ledger
// =============================================================================

/// Direction tag on a loyalty ledger row. When a sale both earns and
/// redeems points, `Earned` wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum LoyaltyEntryKind {
    Earned,
    Redeemed,
}

/// One row of the loyalty ledger, appended per transaction that moved points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LoyaltyEntry {
    pub id: String,
    pub customer_id: String,
    pub transaction_id: Option<String>,
    pub points_earned: i64,
    pub points_redeemed: i64,
    pub discount_cents: i64,
    pub kind: LoyaltyEntryKind,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(selling: Option<i64>, mrp: i64, stock: i64) -> Product {
        Product {
            id: "p1".to_string(),
            name: "Test".to_string(),
            brand: "Generic".to_string(),
            hsn_code: "1001".to_string(),
            barcode: None,
            mrp_cents: mrp,
            cost_price_cents: 0,
            selling_price_cents: selling,
            gst_rate_bps: 1800,
            price_includes_gst: true,
            stock_quantity: stock,
            min_stock_level: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_price_falls_back_to_mrp() {
        assert_eq!(product(Some(9000), 10000, 5).effective_price().cents(), 9000);
        assert_eq!(product(None, 10000, 5).effective_price().cents(), 10000);
    }

    #[test]
    fn test_mrp_savings_floors_at_zero() {
        assert_eq!(product(Some(9000), 10000, 5).mrp_savings().cents(), 1000);
        // Selling above MRP is odd but must not produce negative savings.
        assert_eq!(product(Some(11000), 10000, 5).mrp_savings().cents(), 0);
    }

    #[test]
    fn test_can_sell() {
        let p = product(None, 10000, 3);
        assert!(p.can_sell(3));
        assert!(!p.can_sell(4));
        assert!(!p.can_sell(0));
    }

    #[test]
    fn test_tax_rate_conversions() {
        let rate = TaxRate::from_percentage(18.0);
        assert_eq!(rate.bps(), 1800);
        assert!((rate.percentage() - 18.0).abs() < 0.001);
    }

    #[test]
    fn test_payment_method_labels() {
        assert_eq!(PaymentMethod::Cash.label(), "CASH");
        assert_eq!(PaymentMethod::Upi.label(), "UPI");
        assert!(PaymentMethod::Cash.is_cash());
        assert!(!PaymentMethod::Card.is_cash());
    }
}
