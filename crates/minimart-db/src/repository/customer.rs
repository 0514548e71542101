//! # Customer Repository
//!
//! Database operations for loyalty customers.
//!
//! ## The Sale Side Effect
//! A committed sale updates the customer exactly once:
//! ```text
//! loyalty_points += earned − redeemed   (clamped at zero)
//! total_spent    += rounded total paid
//! ```
//! The clamp matters: a stale session could otherwise redeem points the
//! customer no longer holds and push the balance negative.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use minimart_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

const CUSTOMER_COLUMNS: &str =
    "id, name, phone, email, loyalty_points, total_spent_cents, created_at";

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Gets a customer by phone number (the till's usual lookup key).
    pub async fn get_by_phone(&self, phone: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Searches customers by name or phone prefix.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Customer>> {
        let query = query.trim();
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE name LIKE ?1 OR phone LIKE ?2 \
             ORDER BY name LIMIT ?3"
        );
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(format!("%{query}%"))
            .bind(format!("{query}%"))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            "INSERT INTO customers ( \
                id, name, phone, email, loyalty_points, total_spent_cents, created_at \
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.loyalty_points)
        .bind(customer.total_spent_cents)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Applies a committed sale's side effects to a customer.
    ///
    /// Adjusts the point balance by `points_earned − points_redeemed`,
    /// clamped at zero, and accumulates the amount paid into total spend.
    /// Single UPDATE so concurrent sales interleave safely.
    pub async fn apply_sale(
        &self,
        id: &str,
        points_earned: i64,
        points_redeemed: i64,
        amount_paid_cents: i64,
    ) -> DbResult<()> {
        debug!(
            id = %id,
            points_earned = %points_earned,
            points_redeemed = %points_redeemed,
            "Applying sale to customer"
        );

        let delta = points_earned - points_redeemed;
        let result = sqlx::query(
            "UPDATE customers SET \
                loyalty_points = MAX(0, loyalty_points + ?1), \
                total_spent_cents = total_spent_cents + ?2 \
             WHERE id = ?3",
        )
        .bind(delta)
        .bind(amount_paid_cents)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}

/// Builds a new customer row with generated ID and timestamp.
pub fn new_customer(name: &str, phone: &str, email: Option<&str>) -> Customer {
    Customer {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        email: email.map(str::to_string),
        loyalty_points: 0,
        total_spent_cents: 0,
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

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db().await;
        let repo = db.customers();

        let c = new_customer("Asha Patel", "9876543210", None);
        repo.insert(&c).await.unwrap();

        let by_phone = repo.get_by_phone("9876543210").await.unwrap().unwrap();
        assert_eq!(by_phone.name, "Asha Patel");
        assert_eq!(by_phone.loyalty_points, 0);

        let hits = repo.search("asha", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_apply_sale_updates_points_and_spend() {
        let db = test_db().await;
        let repo = db.customers();

        let c = new_customer("Ravi Kumar", "9812345678", None);
        repo.insert(&c).await.unwrap();

        repo.apply_sale(&c.id, 3, 0, 28_900).await.unwrap();
        let fetched = repo.get_by_id(&c.id).await.unwrap().unwrap();
        assert_eq!(fetched.loyalty_points, 3);
        assert_eq!(fetched.total_spent_cents, 28_900);

        repo.apply_sale(&c.id, 1, 2, 10_000).await.unwrap();
        let fetched = repo.get_by_id(&c.id).await.unwrap().unwrap();
        assert_eq!(fetched.loyalty_points, 2);
        assert_eq!(fetched.total_spent_cents, 38_900);
    }

    #[tokio::test]
    async fn test_apply_sale_clamps_balance_at_zero() {
        let db = test_db().await;
        let repo = db.customers();

        let c = new_customer("Meena Shah", "9800000001", None);
        repo.insert(&c).await.unwrap();
        repo.apply_sale(&c.id, 2, 0, 20_000).await.unwrap();

        // Redeeming more than held clamps instead of going negative.
        repo.apply_sale(&c.id, 0, 10, 5_000).await.unwrap();
        let fetched = repo.get_by_id(&c.id).await.unwrap().unwrap();
        assert_eq!(fetched.loyalty_points, 0);
    }

    #[tokio::test]
    async fn test_apply_sale_unknown_customer() {
        let db = test_db().await;
        let err = db
            .customers()
            .apply_sale("missing", 1, 0, 100)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
