//! # Invoice Numbering
//!
//! Human-facing sequential invoice numbers: `"NM 0001"`, `"NM 0002"`, ...
//!
//! ## Allocation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  next_invoice_number(db)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Fast path: ORDER BY invoice_number DESC LIMIT 1                        │
//! │       │                                                                 │
//! │       ├── parses? ──► increment, done                                  │
//! │       │                                                                 │
//! │       ▼ (malformed rows from imports/manual edits)                      │
//! │  Fallback: scan ALL numbers, take max parseable                        │
//! │       │                                                                 │
//! │       ▼ (empty table)                                                   │
//! │  Default: "NM 0001" (sequence starts after "NM 0000")                  │
//! │                                                                         │
//! │  Uniqueness under races is enforced by the UNIQUE index on              │
//! │  invoice_number; a loser re-allocates and retries once.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use minimart_db::Database;
use tracing::debug;

use crate::error::BillingResult;
use minimart_core::{INVOICE_NUMBER_WIDTH, INVOICE_PREFIX};

/// Parses the numeric part of a well-formed invoice number.
///
/// Accepts any digit count (so a sequence past 9999 keeps working) but
/// requires the exact prefix.
///
/// ## Example
/// ```rust
/// use minimart_billing::invoice::parse_invoice;
///
/// assert_eq!(parse_invoice("NM 0042"), Some(42));
/// assert_eq!(parse_invoice("NM 12345"), Some(12345));
/// assert_eq!(parse_invoice("INV-42"), None);
/// ```
pub fn parse_invoice(invoice: &str) -> Option<u64> {
    let digits = invoice.strip_prefix(INVOICE_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Formats a sequence value as an invoice number, zero-padded to the
/// standard width. Values beyond 4 digits widen naturally.
///
/// ## Example
/// ```rust
/// use minimart_billing::invoice::format_invoice;
///
/// assert_eq!(format_invoice(42), "NM 0042");
/// assert_eq!(format_invoice(12345), "NM 12345");
/// ```
pub fn format_invoice(sequence: u64) -> String {
    let width = INVOICE_NUMBER_WIDTH;
    format!("{INVOICE_PREFIX}{sequence:0width$}")
}

/// Allocates the next invoice number.
///
/// Fast path reads the lexicographic maximum; if that row is malformed,
/// falls back to scanning every stored number. An empty table starts the
/// sequence at 1.
pub async fn next_invoice_number(db: &Database) -> BillingResult<String> {
    let repo = db.transactions();

    if let Some(last) = repo.last_invoice_number().await? {
        if let Some(seq) = parse_invoice(&last) {
            debug!(last = %last, "Invoice fast path");
            return Ok(format_invoice(seq + 1));
        }
    }

    // Fallback: malformed rows exist; take the max parseable anywhere.
    let max_seq = repo
        .all_invoice_numbers()
        .await?
        .iter()
        .filter_map(|inv| parse_invoice(inv))
        .max()
        .unwrap_or(0);

    debug!(max_seq = %max_seq, "Invoice fallback scan");
    Ok(format_invoice(max_seq + 1))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use minimart_core::{PaymentMethod, Transaction, TransactionStatus};
    use minimart_db::DbConfig;
    use uuid::Uuid;

    #[test]
    fn test_parse_invoice() {
        assert_eq!(parse_invoice("NM 0000"), Some(0));
        assert_eq!(parse_invoice("NM 0042"), Some(42));
        assert_eq!(parse_invoice("NM 9999"), Some(9999));
        assert_eq!(parse_invoice("NM 10000"), Some(10000));
        assert_eq!(parse_invoice("NM "), None);
        assert_eq!(parse_invoice("NM 12a4"), None);
        assert_eq!(parse_invoice("XX 0042"), None);
        assert_eq!(parse_invoice(""), None);
    }

    #[test]
    fn test_format_invoice() {
        assert_eq!(format_invoice(1), "NM 0001");
        assert_eq!(format_invoice(42), "NM 0042");
        assert_eq!(format_invoice(9999), "NM 9999");
        assert_eq!(format_invoice(10000), "NM 10000");
    }

    #[test]
    fn test_parse_format_round_trip() {
        for seq in [0, 1, 99, 9999, 123456] {
            assert_eq!(parse_invoice(&format_invoice(seq)), Some(seq));
        }
    }

    fn txn(invoice: &str) -> Transaction {
        Transaction {
            id: Uuid::new_v4().to_string(),
            invoice_number: invoice.to_string(),
            cashier_id: "c1".to_string(),
            cashier_name: "Admin".to_string(),
            customer_id: None,
            customer_name: None,
            customer_phone: None,
            subtotal_cents: 100,
            gst_cents: 0,
            discount_cents: 0,
            discount_bps: 0,
            loyalty_discount_cents: 0,
            rounding_cents: 0,
            total_cents: 100,
            payment_method: PaymentMethod::Cash,
            cash_tendered_cents: Some(100),
            change_cents: Some(0),
            loyalty_points_earned: 0,
            loyalty_points_redeemed: 0,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_first_invoice_on_empty_db() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert_eq!(next_invoice_number(&db).await.unwrap(), "NM 0001");
    }

    #[tokio::test]
    async fn test_fast_path_increments_latest() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for inv in ["NM 0001", "NM 0002", "NM 0010"] {
            db.transactions().insert(&txn(inv)).await.unwrap();
        }
        assert_eq!(next_invoice_number(&db).await.unwrap(), "NM 0011");
    }

    #[tokio::test]
    async fn test_fallback_skips_malformed_numbers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        // "NM ZZZZ" sorts above every digit string, forcing the scan.
        for inv in ["NM 0007", "NM ZZZZ", "LEGACY-3"] {
            db.transactions().insert(&txn(inv)).await.unwrap();
        }
        assert_eq!(next_invoice_number(&db).await.unwrap(), "NM 0008");
    }
}
