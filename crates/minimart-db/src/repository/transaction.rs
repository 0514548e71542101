//! # Transaction Repository
//!
//! Database operations for committed sales and their line items.
//!
//! ## Immutability
//! Transactions are written once at checkout and never updated (the
//! `status` flag being the lone exception for refund flows). There is
//! deliberately no `update` method here.
//!
//! ## Invoice Numbering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Invoices look like "NM 0042": fixed prefix, 4-digit zero-pad.          │
//! │                                                                         │
//! │  Fast path:  well-formed numbers sort lexicographically, so a single   │
//! │              ORDER BY invoice_number DESC LIMIT 1 finds the latest.    │
//! │                                                                         │
//! │  Fallback:   if rows with malformed numbers exist (imports, manual     │
//! │              edits), the caller scans all numbers and takes the max    │
//! │              parseable value.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use minimart_core::{Transaction, TransactionItem, INVOICE_PREFIX};

/// Repository for transaction database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

const TXN_COLUMNS: &str = "id, invoice_number, cashier_id, cashier_name, \
     customer_id, customer_name, customer_phone, \
     subtotal_cents, gst_cents, discount_cents, discount_bps, \
     loyalty_discount_cents, rounding_cents, total_cents, \
     payment_method, cash_tendered_cents, change_cents, \
     loyalty_points_earned, loyalty_points_redeemed, status, created_at";

const ITEM_COLUMNS: &str = "id, transaction_id, product_id, \
     name_snapshot, brand_snapshot, hsn_snapshot, quantity, \
     mrp_cents, cost_price_cents, selling_price_cents, \
     gst_rate_bps, price_includes_gst, line_total_cents, created_at";

/// Aggregate figures for a reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesSummary {
    /// Number of completed transactions in the window.
    pub transaction_count: i64,
    /// Sum of payable totals, in paise.
    pub total_cents: i64,
    /// Sum of GST collected, in paise.
    pub gst_cents: i64,
    /// Sum of discounts granted (manual + loyalty), in paise.
    pub discount_cents: i64,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Inserts a transaction header.
    pub async fn insert(&self, txn: &Transaction) -> DbResult<()> {
        debug!(id = %txn.id, invoice = %txn.invoice_number, "Inserting transaction");

        sqlx::query(
            "INSERT INTO transactions ( \
                id, invoice_number, cashier_id, cashier_name, \
                customer_id, customer_name, customer_phone, \
                subtotal_cents, gst_cents, discount_cents, discount_bps, \
                loyalty_discount_cents, rounding_cents, total_cents, \
                payment_method, cash_tendered_cents, change_cents, \
                loyalty_points_earned, loyalty_points_redeemed, status, created_at \
            ) VALUES ( \
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, \
                ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21 \
            )",
        )
        .bind(&txn.id)
        .bind(&txn.invoice_number)
        .bind(&txn.cashier_id)
        .bind(&txn.cashier_name)
        .bind(&txn.customer_id)
        .bind(&txn.customer_name)
        .bind(&txn.customer_phone)
        .bind(txn.subtotal_cents)
        .bind(txn.gst_cents)
        .bind(txn.discount_cents)
        .bind(txn.discount_bps)
        .bind(txn.loyalty_discount_cents)
        .bind(txn.rounding_cents)
        .bind(txn.total_cents)
        .bind(txn.payment_method)
        .bind(txn.cash_tendered_cents)
        .bind(txn.change_cents)
        .bind(txn.loyalty_points_earned)
        .bind(txn.loyalty_points_redeemed)
        .bind(txn.status)
        .bind(txn.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts the line-item snapshots for a transaction.
    ///
    /// ## Snapshot Pattern
    /// Product details (name, brand, HSN, prices, GST) are frozen into the
    /// item rows so the sale history survives later product edits/deletes.
    pub async fn insert_items(&self, items: &[TransactionItem]) -> DbResult<()> {
        for item in items {
            debug!(
                transaction_id = %item.transaction_id,
                name = %item.name_snapshot,
                "Inserting transaction item"
            );

            sqlx::query(
                "INSERT INTO transaction_items ( \
                    id, transaction_id, product_id, \
                    name_snapshot, brand_snapshot, hsn_snapshot, quantity, \
                    mrp_cents, cost_price_cents, selling_price_cents, \
                    gst_rate_bps, price_includes_gst, line_total_cents, created_at \
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            )
            .bind(&item.id)
            .bind(&item.transaction_id)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(&item.brand_snapshot)
            .bind(&item.hsn_snapshot)
            .bind(item.quantity)
            .bind(item.mrp_cents)
            .bind(item.cost_price_cents)
            .bind(item.selling_price_cents)
            .bind(item.gst_rate_bps)
            .bind(item.price_includes_gst)
            .bind(item.line_total_cents)
            .bind(item.created_at)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Gets a transaction by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let sql = format!("SELECT {TXN_COLUMNS} FROM transactions WHERE id = ?1");
        let txn = sqlx::query_as::<_, Transaction>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(txn)
    }

    /// Gets a transaction by invoice number.
    pub async fn get_by_invoice(&self, invoice: &str) -> DbResult<Option<Transaction>> {
        let sql = format!("SELECT {TXN_COLUMNS} FROM transactions WHERE invoice_number = ?1");
        let txn = sqlx::query_as::<_, Transaction>(&sql)
            .bind(invoice)
            .fetch_optional(&self.pool)
            .await?;

        Ok(txn)
    }

    /// Gets all line items for a transaction, in insertion order.
    pub async fn get_items(&self, transaction_id: &str) -> DbResult<Vec<TransactionItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM transaction_items \
             WHERE transaction_id = ?1 ORDER BY created_at, id"
        );
        let items = sqlx::query_as::<_, TransactionItem>(&sql)
            .bind(transaction_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Most recent transactions, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {TXN_COLUMNS} FROM transactions ORDER BY created_at DESC LIMIT ?1"
        );
        let txns = sqlx::query_as::<_, Transaction>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(txns)
    }

    /// Latest well-formed invoice number, by lexicographic sort.
    ///
    /// Fast path for invoice allocation: correct whenever every stored
    /// number uses the standard prefix + zero-pad format.
    pub async fn last_invoice_number(&self) -> DbResult<Option<String>> {
        let invoice: Option<String> = sqlx::query_scalar(
            "SELECT invoice_number FROM transactions \
             WHERE invoice_number LIKE ?1 \
             ORDER BY invoice_number DESC LIMIT 1",
        )
        .bind(format!("{INVOICE_PREFIX}%"))
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Every stored invoice number. Fallback path for invoice allocation
    /// when the table may contain malformed numbers.
    pub async fn all_invoice_numbers(&self) -> DbResult<Vec<String>> {
        let invoices: Vec<String> =
            sqlx::query_scalar("SELECT invoice_number FROM transactions")
                .fetch_all(&self.pool)
                .await?;

        Ok(invoices)
    }

    /// Aggregates completed sales over a time window.
    pub async fn sales_summary(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<SalesSummary> {
        let row: (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT \
                COUNT(*), \
                COALESCE(SUM(total_cents), 0), \
                COALESCE(SUM(gst_cents), 0), \
                COALESCE(SUM(discount_cents + loyalty_discount_cents), 0) \
             FROM transactions \
             WHERE status = 'completed' AND created_at >= ?1 AND created_at < ?2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(SalesSummary {
            transaction_count: row.0,
            total_cents: row.1,
            gst_cents: row.2,
            discount_cents: row.3,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use minimart_core::{PaymentMethod, TransactionStatus};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn txn(invoice: &str, total_cents: i64) -> Transaction {
        Transaction {
            id: Uuid::new_v4().to_string(),
            invoice_number: invoice.to_string(),
            cashier_id: "cashier-1".to_string(),
            cashier_name: "Admin".to_string(),
            customer_id: None,
            customer_name: None,
            customer_phone: None,
            subtotal_cents: total_cents - 100,
            gst_cents: 100,
            discount_cents: 0,
            discount_bps: 0,
            loyalty_discount_cents: 0,
            rounding_cents: 0,
            total_cents,
            payment_method: PaymentMethod::Cash,
            cash_tendered_cents: Some(total_cents),
            change_cents: Some(0),
            loyalty_points_earned: 0,
            loyalty_points_redeemed: 0,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        }
    }

    fn item(transaction_id: &str) -> TransactionItem {
        TransactionItem {
            id: Uuid::new_v4().to_string(),
            transaction_id: transaction_id.to_string(),
            product_id: None,
            name_snapshot: "Parle-G 250g".to_string(),
            brand_snapshot: "Parle".to_string(),
            hsn_snapshot: "1905".to_string(),
            quantity: 2,
            mrp_cents: 2000,
            cost_price_cents: 0,
            selling_price_cents: 1800,
            gst_rate_bps: 1800,
            price_includes_gst: true,
            line_total_cents: 3600,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_with_items() {
        let db = test_db().await;
        let repo = db.transactions();

        let t = txn("NM 0001", 28_900);
        repo.insert(&t).await.unwrap();
        repo.insert_items(&[item(&t.id)]).await.unwrap();

        let fetched = repo.get_by_invoice("NM 0001").await.unwrap().unwrap();
        assert_eq!(fetched.total_cents, 28_900);
        assert_eq!(fetched.payment_method, PaymentMethod::Cash);

        let items = repo.get_items(&t.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name_snapshot, "Parle-G 250g");
    }

    #[tokio::test]
    async fn test_duplicate_invoice_rejected() {
        let db = test_db().await;
        let repo = db.transactions();

        repo.insert(&txn("NM 0001", 100)).await.unwrap();
        let err = repo.insert(&txn("NM 0001", 200)).await.unwrap_err();
        assert!(matches!(err, crate::error::DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_last_invoice_number_sorts_lexicographically() {
        let db = test_db().await;
        let repo = db.transactions();

        for inv in ["NM 0001", "NM 0010", "NM 0003"] {
            repo.insert(&txn(inv, 100)).await.unwrap();
        }

        let last = repo.last_invoice_number().await.unwrap().unwrap();
        assert_eq!(last, "NM 0010");
    }

    #[tokio::test]
    async fn test_empty_table_has_no_last_invoice() {
        let db = test_db().await;
        assert!(db.transactions().last_invoice_number().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sales_summary() {
        let db = test_db().await;
        let repo = db.transactions();

        repo.insert(&txn("NM 0001", 10_000)).await.unwrap();
        repo.insert(&txn("NM 0002", 20_000)).await.unwrap();

        let now = Utc::now();
        let summary = repo
            .sales_summary(now - Duration::hours(1), now + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(summary.transaction_count, 2);
        assert_eq!(summary.total_cents, 30_000);
        assert_eq!(summary.gst_cents, 200);

        // Window excluding everything
        let empty = repo
            .sales_summary(now + Duration::hours(1), now + Duration::hours(2))
            .await
            .unwrap();
        assert_eq!(empty.transaction_count, 0);
        assert_eq!(empty.total_cents, 0);
    }
}
