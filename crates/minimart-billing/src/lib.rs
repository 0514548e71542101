//! # minimart-billing: Billing Engine for Minimart POS
//!
//! This crate is the engine layer of Minimart POS: it drives a sale from
//! "cashier taps a product" to "receipt prints", using minimart-core for
//! every rupee of arithmetic and minimart-db for every byte of storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Sale Lifecycle                                     │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │              minimart-billing (THIS CRATE)                       │  │
//! │  │                                                                  │  │
//! │  │   PosSession ───► compute_totals ───► checkout::commit_sale     │  │
//! │  │    (reducer)       (minimart-core)        │                      │  │
//! │  │                                           ▼                      │  │
//! │  │                                    receipt::render               │  │
//! │  │                                                                  │  │
//! │  │   live::ChangeFeed keeps the product grid fresh in background   │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                        minimart-db ───► SQLite                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`session`] - The POS session reducer (cart, customer, discounts, payment)
//! - [`checkout`] - The ordered commit sequence
//! - [`invoice`] - Invoice number parsing and allocation
//! - [`receipt`] - Receipt figure derivation and the two HTML layouts
//! - [`live`] - Polling change feed for catalog staleness
//! - [`error`] - Engine error type with machine-readable codes

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod invoice;
pub mod live;
pub mod receipt;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{commit_sale, CheckoutOutcome, CommitStep};
pub use error::{BillingError, BillingResult, ErrorCode};
pub use invoice::{format_invoice, next_invoice_number, parse_invoice};
pub use live::{poll_once, CatalogSnapshot, ChangeFeed};
pub use receipt::{ReceiptData, ReceiptFigures, StoreProfile};
pub use session::{PosSession, SessionAction};
