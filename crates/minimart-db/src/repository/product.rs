//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Listing and name/brand/HSN/barcode search
//! - CRUD with duplicate pre-checks
//! - Atomic stock decrements (the commit path)
//! - Low-stock report
//!
//! ## Stock Decrement Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stock is decremented with a single conditional UPDATE:                 │
//! │                                                                         │
//! │    UPDATE products                                                      │
//! │    SET stock_quantity = stock_quantity - ?qty                           │
//! │    WHERE id = ?id AND stock_quantity >= ?qty                            │
//! │                                                                         │
//! │  Zero rows affected means someone else sold the units first; the       │
//! │  caller gets a NotFound-style error instead of negative stock. The     │
//! │  CHECK (stock_quantity >= 0) constraint backstops the guard.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use minimart_core::Product;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
/// let results = repo.search("parle", 20).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str = "id, name, brand, hsn_code, barcode, mrp_cents, cost_price_cents, \
     selling_price_cents, gst_rate_bps, price_includes_gst, stock_quantity, min_stock_level, \
     created_at, updated_at";

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products with stock on hand, sorted by name.
    ///
    /// This is what the POS grid shows: out-of-stock products are hidden
    /// from the till but stay in the catalog.
    pub async fn list_in_stock(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE stock_quantity > 0 ORDER BY name LIMIT ?1"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Lists the full catalog, in and out of stock.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Searches products by name, brand, HSN code, or barcode prefix.
    ///
    /// An empty query falls back to the in-stock listing. LIKE with a
    /// leading wildcard is fine at mini-mart catalog sizes (hundreds to a
    /// few thousand rows).
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_in_stock(limit).await;
        }

        let pattern = format!("%{query}%");
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE (name LIKE ?1 OR brand LIKE ?1 OR hsn_code LIKE ?1 OR barcode LIKE ?2) \
             AND stock_quantity > 0 \
             ORDER BY name LIMIT ?3"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(&pattern)
            .bind(format!("{query}%"))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by barcode (scanner path).
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// Pre-checks name, HSN code, and barcode for duplicates so callers
    /// get a field-specific error rather than a raw constraint message.
    /// The UNIQUE indexes still enforce the invariant under races.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        if self.name_exists(&product.name, None).await? {
            return Err(DbError::duplicate("name", &product.name));
        }
        if self.hsn_exists(&product.hsn_code, None).await? {
            return Err(DbError::duplicate("hsn_code", &product.hsn_code));
        }
        if let Some(barcode) = &product.barcode {
            if self.barcode_exists(barcode, None).await? {
                return Err(DbError::duplicate("barcode", barcode));
            }
        }

        sqlx::query(
            "INSERT INTO products ( \
                id, name, brand, hsn_code, barcode, \
                mrp_cents, cost_price_cents, selling_price_cents, \
                gst_rate_bps, price_includes_gst, \
                stock_quantity, min_stock_level, created_at, updated_at \
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(&product.hsn_code)
        .bind(&product.barcode)
        .bind(product.mrp_cents)
        .bind(product.cost_price_cents)
        .bind(product.selling_price_cents)
        .bind(product.gst_rate_bps)
        .bind(product.price_includes_gst)
        .bind(product.stock_quantity)
        .bind(product.min_stock_level)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product (all mutable columns).
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        if self.name_exists(&product.name, Some(&product.id)).await? {
            return Err(DbError::duplicate("name", &product.name));
        }
        if self.hsn_exists(&product.hsn_code, Some(&product.id)).await? {
            return Err(DbError::duplicate("hsn_code", &product.hsn_code));
        }
        if let Some(barcode) = &product.barcode {
            if self.barcode_exists(barcode, Some(&product.id)).await? {
                return Err(DbError::duplicate("barcode", barcode));
            }
        }

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE products SET \
                name = ?1, brand = ?2, hsn_code = ?3, barcode = ?4, \
                mrp_cents = ?5, cost_price_cents = ?6, selling_price_cents = ?7, \
                gst_rate_bps = ?8, price_includes_gst = ?9, \
                stock_quantity = ?10, min_stock_level = ?11, updated_at = ?12 \
             WHERE id = ?13",
        )
        .bind(&product.name)
        .bind(&product.brand)
        .bind(&product.hsn_code)
        .bind(&product.barcode)
        .bind(product.mrp_cents)
        .bind(product.cost_price_cents)
        .bind(product.selling_price_cents)
        .bind(product.gst_rate_bps)
        .bind(product.price_includes_gst)
        .bind(product.stock_quantity)
        .bind(product.min_stock_level)
        .bind(now)
        .bind(&product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Atomically decrements stock for a sold line.
    ///
    /// Fails without touching the row when stock is insufficient; see the
    /// module docs for the conditional-UPDATE pattern.
    pub async fn decrement_stock(&self, id: &str, quantity: i64) -> DbResult<()> {
        debug!(id = %id, quantity = %quantity, "Decrementing stock");

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE products \
             SET stock_quantity = stock_quantity - ?1, updated_at = ?2 \
             WHERE id = ?3 AND stock_quantity >= ?1",
        )
        .bind(quantity)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product with sufficient stock", id));
        }

        Ok(())
    }

    /// Deletes a product.
    ///
    /// Committed sales keep their snapshots; their `product_id` goes NULL
    /// via ON DELETE SET NULL.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Newest `updated_at` across the catalog, or `None` when empty.
    ///
    /// Pollers compare this high-water mark between ticks to decide
    /// whether a full re-fetch is worth it.
    pub async fn latest_update(&self) -> DbResult<Option<DateTime<Utc>>> {
        let high_water: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MAX(updated_at) FROM products")
                .fetch_one(&self.pool)
                .await?;
        Ok(high_water)
    }

    /// Total number of products in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Products at or below their reorder threshold.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE stock_quantity <= min_stock_level \
             ORDER BY stock_quantity ASC, name"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    async fn name_exists(&self, name: &str, exclude_id: Option<&str>) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE name = ?1 AND id != COALESCE(?2, '')",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn hsn_exists(&self, hsn: &str, exclude_id: Option<&str>) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE hsn_code = ?1 AND id != COALESCE(?2, '')",
        )
        .bind(hsn)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn barcode_exists(&self, barcode: &str, exclude_id: Option<&str>) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE barcode = ?1 AND id != COALESCE(?2, '')",
        )
        .bind(barcode)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }
}

/// Builds a new product row with generated ID and timestamps.
///
/// Convenience for seeding and admin flows; pricing fields are paise/bps.
#[allow(clippy::too_many_arguments)]
pub fn new_product(
    name: &str,
    brand: &str,
    hsn_code: &str,
    barcode: Option<&str>,
    mrp_cents: i64,
    selling_price_cents: Option<i64>,
    gst_rate_bps: u32,
    price_includes_gst: bool,
    stock_quantity: i64,
) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        brand: brand.to_string(),
        hsn_code: hsn_code.to_string(),
        barcode: barcode.map(str::to_string),
        mrp_cents,
        cost_price_cents: 0,
        selling_price_cents,
        gst_rate_bps,
        price_includes_gst,
        stock_quantity,
        min_stock_level: 5,
        created_at: now,
        updated_at: now,
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
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let p = new_product(
            "Parle-G 250g",
            "Parle",
            "1905",
            Some("8901063010116"),
            2000,
            Some(1800),
            1800,
            true,
            50,
        );
        repo.insert(&p).await.unwrap();

        let fetched = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Parle-G 250g");
        assert_eq!(fetched.selling_price_cents, Some(1800));
        assert!(fetched.price_includes_gst);

        let by_barcode = repo.get_by_barcode("8901063010116").await.unwrap();
        assert!(by_barcode.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = test_db().await;
        let repo = db.products();

        let p1 = new_product("Maggi 70g", "Nestle", "1902", None, 1400, None, 1200, true, 20);
        repo.insert(&p1).await.unwrap();

        let p2 = new_product("Maggi 70g", "Nestle", "1903", None, 1400, None, 1200, true, 20);
        let err = repo.insert(&p2).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_search_by_name_and_barcode() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&new_product(
            "Parle-G 250g", "Parle", "1905", Some("8901063010116"),
            2000, None, 1800, true, 50,
        ))
        .await
        .unwrap();
        repo.insert(&new_product(
            "Maggi 70g", "Nestle", "1902", None, 1400, None, 1200, true, 0,
        ))
        .await
        .unwrap();

        // Out-of-stock items don't surface at the till.
        let hits = repo.search("maggi", 10).await.unwrap();
        assert!(hits.is_empty());

        let hits = repo.search("parle", 10).await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = repo.search("8901063", 10).await.unwrap();
        assert_eq!(hits.len(), 1);

        // HSN code is searchable too.
        let hits = repo.search("1905", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Parle-G 250g");
    }

    #[tokio::test]
    async fn test_update_duplicate_hsn_rejected() {
        let db = test_db().await;
        let repo = db.products();

        let p1 = new_product("Salt 1kg", "Tata", "2501", None, 2800, None, 0, true, 40);
        repo.insert(&p1).await.unwrap();

        let mut p2 = new_product("Sugar 1kg", "Madhur", "1701", None, 4500, None, 500, true, 35);
        repo.insert(&p2).await.unwrap();

        // Colliding with another product's HSN fails with a field error,
        // not a raw constraint message.
        p2.hsn_code = "2501".to_string();
        let err = repo.update(&p2).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "hsn_code"));

        // Re-saving with its own HSN still works.
        p2.hsn_code = "1701".to_string();
        repo.update(&p2).await.unwrap();
    }

    #[tokio::test]
    async fn test_decrement_stock_guards_against_oversell() {
        let db = test_db().await;
        let repo = db.products();

        let p = new_product("Soap", "Lux", "3401", None, 3500, None, 1800, true, 3);
        repo.insert(&p).await.unwrap();

        repo.decrement_stock(&p.id, 2).await.unwrap();
        let fetched = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(fetched.stock_quantity, 1);

        // Only 1 left; selling 2 must fail and leave stock untouched.
        assert!(repo.decrement_stock(&p.id, 2).await.is_err());
        let fetched = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(fetched.stock_quantity, 1);
    }

    #[tokio::test]
    async fn test_low_stock_report() {
        let db = test_db().await;
        let repo = db.products();

        let mut low = new_product("Salt 1kg", "Tata", "2501", None, 2800, None, 0, true, 2);
        low.min_stock_level = 5;
        repo.insert(&low).await.unwrap();

        let mut fine = new_product("Sugar 1kg", "Madhur", "1701", None, 4500, None, 500, true, 40);
        fine.min_stock_level = 5;
        repo.insert(&fine).await.unwrap();

        let report = repo.low_stock().await.unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].name, "Salt 1kg");
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let repo = db.products();

        let p = new_product("Temp", "X", "9999", None, 100, None, 0, true, 1);
        repo.insert(&p).await.unwrap();
        repo.delete(&p.id).await.unwrap();

        assert!(repo.get_by_id(&p.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&p.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
