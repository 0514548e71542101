//! # minimart-core: Pure Business Logic for Minimart POS
//!
//! This crate is the **heart** of Minimart POS. It contains all billing
//! business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Minimart POS Architecture                        │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │              minimart-billing (Engine Layer)                  │ │
//! │  │      PosSession ──► checkout ──► receipt rendering            │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │              ★ minimart-core (THIS CRATE) ★                   │ │
//! │  │                                                               │ │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌───────┐ │ │
//! │  │   │  types  │ │  money  │ │  cart   │ │ discount │ │pricing│ │ │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └───────┘ │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │               minimart-db (Storage Layer)                     │ │
//! │  │          SQLite queries, migrations, repositories             │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use minimart_core::money::Money;
//! use minimart_core::types::TaxRate;
//!
//! // ₹118.00, GST included at 18%
//! let listed = Money::from_cents(11800);
//! let rate = TaxRate::from_bps(1800);
//!
//! let base = listed.base_excluding(rate);
//! assert_eq!(base.cents(), 10000);             // ₹100.00
//! assert_eq!((listed - base).cents(), 1800);   // ₹18.00 GST
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod discount;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem};
pub use discount::{DiscountInput, LoyaltyRedemption, ManualDiscount};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{change_due, compute_totals, TotalsBreakdown};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Invoice number prefix. Invoices are human-facing and sequential:
/// `"NM 0001"`, `"NM 0002"`, ...
pub const INVOICE_PREFIX: &str = "NM ";

/// Zero-padded width of the numeric part of an invoice number.
pub const INVOICE_NUMBER_WIDTH: usize = 4;

/// Value of one loyalty point when redeemed, in paise (1 point = ₹1.00).
pub const LOYALTY_POINT_VALUE_CENTS: i64 = 100;

/// Spend slab that earns one loyalty point, in paise (₹100.00 spent = 1 point).
/// Points are earned on the post-discount, post-rounding total.
pub const LOYALTY_EARN_SLAB_CENTS: i64 = 10_000;

/// Maximum unique items allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in cart.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
