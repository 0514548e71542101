//! # Loyalty Repository
//!
//! Append-only loyalty ledger.
//!
//! One row per transaction that moved points, tagged `earned` or
//! `redeemed` (earned wins when a sale does both). The ledger is an
//! audit trail; the live balance lives on the customer row.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use minimart_core::{LoyaltyEntry, LoyaltyEntryKind};

/// Repository for loyalty ledger operations.
#[derive(Debug, Clone)]
pub struct LoyaltyRepository {
    pool: SqlitePool,
}

const LEDGER_COLUMNS: &str = "id, customer_id, transaction_id, \
     points_earned, points_redeemed, discount_cents, kind, created_at";

impl LoyaltyRepository {
    /// Creates a new LoyaltyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LoyaltyRepository { pool }
    }

    /// Appends a ledger row for a committed sale.
    pub async fn append(&self, entry: &LoyaltyEntry) -> DbResult<()> {
        debug!(
            customer_id = %entry.customer_id,
            earned = %entry.points_earned,
            redeemed = %entry.points_redeemed,
            "Appending loyalty ledger entry"
        );

        sqlx::query(
            "INSERT INTO loyalty_transactions ( \
                id, customer_id, transaction_id, \
                points_earned, points_redeemed, discount_cents, kind, created_at \
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&entry.id)
        .bind(&entry.customer_id)
        .bind(&entry.transaction_id)
        .bind(entry.points_earned)
        .bind(entry.points_redeemed)
        .bind(entry.discount_cents)
        .bind(entry.kind)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// A customer's ledger history, newest first.
    pub async fn history(&self, customer_id: &str, limit: u32) -> DbResult<Vec<LoyaltyEntry>> {
        let sql = format!(
            "SELECT {LEDGER_COLUMNS} FROM loyalty_transactions \
             WHERE customer_id = ?1 ORDER BY created_at DESC LIMIT ?2"
        );
        let entries = sqlx::query_as::<_, LoyaltyEntry>(&sql)
            .bind(customer_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }
}

/// Builds a ledger row for a sale that moved points.
///
/// The kind tag follows the dominant direction: `Earned` when any points
/// were earned, otherwise `Redeemed`.
pub fn entry_for_sale(
    customer_id: &str,
    transaction_id: &str,
    points_earned: i64,
    points_redeemed: i64,
    discount_cents: i64,
) -> LoyaltyEntry {
    LoyaltyEntry {
        id: Uuid::new_v4().to_string(),
        customer_id: customer_id.to_string(),
        transaction_id: Some(transaction_id.to_string()),
        points_earned,
        points_redeemed,
        discount_cents,
        kind: if points_earned > 0 {
            LoyaltyEntryKind::Earned
        } else {
            LoyaltyEntryKind::Redeemed
        },
        created_at: Utc::now(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::customer::new_customer;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_append_and_history() {
        let db = test_db().await;

        let customer = new_customer("Asha Patel", "9876543210", None);
        db.customers().insert(&customer).await.unwrap();

        // transaction_id left NULL: adjustments outside a sale are legal.
        let mut entry = entry_for_sale(&customer.id, "ignored", 3, 0, 0);
        entry.transaction_id = None;
        db.loyalty().append(&entry).await.unwrap();

        let history = db.loyalty().history(&customer.id, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].points_earned, 3);
        assert_eq!(history[0].kind, LoyaltyEntryKind::Earned);
    }

    #[test]
    fn test_kind_follows_dominant_direction() {
        let e = entry_for_sale("c", "t", 2, 5, 500);
        assert_eq!(e.kind, LoyaltyEntryKind::Earned);

        let e = entry_for_sale("c", "t", 0, 5, 500);
        assert_eq!(e.kind, LoyaltyEntryKind::Redeemed);
    }
}
