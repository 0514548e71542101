//! # Receipt Rendering
//!
//! Turns a committed transaction into printable HTML.
//!
//! ## Two Layouts, One Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Transaction + items                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReceiptFigures::derive  ── CGST/SGST split, savings, change            │
//! │       │                                                                 │
//! │       ├──► thermal::render  (80mm monospace roll, [`thermal`])          │
//! │       │                                                                 │
//! │       └──► page::render     (A4/A5 table layout, [`page`])              │
//! │                                                                         │
//! │  Both layouts print the same numbers because neither recomputes         │
//! │  anything the header already states; only the CGST/SGST presentation   │
//! │  split is derived here.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod page;
pub mod thermal;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use minimart_core::{Money, Transaction, TransactionItem};

// =============================================================================
// Store Profile
// =============================================================================

/// Store identity printed on receipt headers and footers.
///
/// Loaded from the settings table; every field has a built-in default so
/// a fresh database still prints a complete receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreProfile {
    pub name: String,
    pub tagline: String,
    pub address: String,
    pub phone: String,
    pub gstin: String,
    pub footer: String,
}

impl StoreProfile {
    /// Builds a profile from the settings map, falling back per key.
    pub fn from_settings(settings: &HashMap<String, String>) -> Self {
        let get = |key: &str, default: &str| {
            settings
                .get(key)
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        StoreProfile {
            name: get("store_name", "NATIONAL MINI MART"),
            tagline: get("store_tagline", "Your Trusted Store"),
            address: get("store_address", ""),
            phone: get("store_phone", ""),
            gstin: get("store_gstin", ""),
            footer: get("receipt_footer", "Thank You! Visit Again!"),
        }
    }
}

impl Default for StoreProfile {
    fn default() -> Self {
        StoreProfile::from_settings(&HashMap::new())
    }
}

// =============================================================================
// Receipt Figures
// =============================================================================

/// Presentation figures derived from a committed transaction.
///
/// GST on the receipt is shown as equal CGST and SGST halves;
/// `sgst = gst − cgst` so an odd paise lands on SGST and the halves
/// always sum to the recorded GST exactly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReceiptFigures {
    pub subtotal: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub loyalty_discount: Money,
    pub manual_discount: Money,
    pub rounding: Money,
    pub total: Money,
    /// Discounts plus MRP savings, recomputed from item snapshots.
    pub total_savings: Money,
}

impl ReceiptFigures {
    /// Derives the display figures from a transaction and its items.
    pub fn derive(txn: &Transaction, items: &[TransactionItem]) -> Self {
        let gst = txn.gst();
        let cgst = Money::from_cents(gst.cents() / 2);
        let sgst = gst - cgst;

        let mrp_savings: Money = items.iter().map(|i| i.mrp_savings_total()).sum();
        let total_savings = Money::from_cents(
            txn.discount_cents + txn.loyalty_discount_cents,
        ) + mrp_savings;

        ReceiptFigures {
            subtotal: txn.subtotal(),
            cgst,
            sgst,
            loyalty_discount: Money::from_cents(txn.loyalty_discount_cents),
            manual_discount: Money::from_cents(txn.discount_cents),
            rounding: Money::from_cents(txn.rounding_cents),
            total: txn.total(),
            total_savings,
        }
    }
}

// =============================================================================
// Receipt Data
// =============================================================================

/// Everything a layout needs to render.
#[derive(Debug, Clone)]
pub struct ReceiptData {
    pub profile: StoreProfile,
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
    pub figures: ReceiptFigures,
}

impl ReceiptData {
    /// Bundles a transaction for rendering.
    pub fn new(profile: StoreProfile, transaction: Transaction, items: Vec<TransactionItem>) -> Self {
        let figures = ReceiptFigures::derive(&transaction, &items);
        ReceiptData {
            profile,
            transaction,
            items,
            figures,
        }
    }
}

/// Escapes text for embedding in HTML.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
