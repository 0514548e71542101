//! # Live Catalog Feed
//!
//! Background polling that keeps the product grid close to fresh.
//!
//! ## Why Polling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Several tills share one database. A product repriced or sold out on   │
//! │  till A should stop being offered at its old state on till B within a  │
//! │  few seconds, without any push infrastructure.                          │
//! │                                                                         │
//! │  ChangeFeed polls MAX(updated_at) over products on an interval and      │
//! │  publishes fresh snapshots through a tokio watch channel. Subscribers  │
//! │  (the grid) hold the Receiver and re-render on change.                  │
//! │                                                                         │
//! │  Polling REDUCES staleness; it cannot eliminate it. The real guard     │
//! │  against overselling is the conditional stock decrement at commit.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::BillingResult;
use minimart_core::Product;
use minimart_db::Database;

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How many products a snapshot carries.
const SNAPSHOT_LIMIT: u32 = 500;

// =============================================================================
// Snapshot
// =============================================================================

/// One published view of the catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    /// In-stock products, name order.
    pub products: Vec<Product>,
    /// Newest `updated_at` across the whole products table.
    pub high_water: Option<DateTime<Utc>>,
}

/// Reads the catalog high-water mark and, when it moved past `since`,
/// fetches a fresh snapshot. Returns `None` when nothing changed.
pub async fn poll_once(
    db: &Database,
    since: Option<DateTime<Utc>>,
) -> BillingResult<Option<CatalogSnapshot>> {
    let high_water = db.products().latest_update().await?;

    if high_water.is_none() || high_water <= since {
        return Ok(None);
    }

    let products = db.products().list_in_stock(SNAPSHOT_LIMIT).await?;
    debug!(count = products.len(), "Catalog snapshot refreshed");

    Ok(Some(CatalogSnapshot {
        products,
        high_water,
    }))
}

// =============================================================================
// Change Feed
// =============================================================================

/// Handle to a running change feed.
pub struct ChangeFeed {
    rx: watch::Receiver<CatalogSnapshot>,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl ChangeFeed {
    /// Spawns the polling task and primes the channel with an initial
    /// snapshot.
    pub async fn spawn(db: Database, poll_interval: Duration) -> BillingResult<Self> {
        let initial = poll_once(&db, None).await?.unwrap_or_default();
        let (tx, rx) = watch::channel(initial);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(async move {
            info!("Catalog change feed starting");

            let mut interval = tokio::time::interval(poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let since = tx.borrow().high_water;
                        match poll_once(&db, since).await {
                            Ok(Some(snapshot)) => {
                                // send_replace never fails; stale receivers
                                // simply see the latest value.
                                tx.send_replace(snapshot);
                            }
                            Ok(None) => {}
                            Err(e) => {
                                error!(error = %e, "Catalog poll failed");
                            }
                        }
                    }

                    _ = shutdown_rx.recv() => {
                        info!("Catalog change feed shutting down");
                        break;
                    }
                }
            }
        });

        Ok(ChangeFeed {
            rx,
            shutdown_tx,
            task,
        })
    }

    /// A receiver for catalog snapshots. Clone freely; `changed().await`
    /// wakes on every published refresh.
    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.rx.clone()
    }

    /// Stops the polling task and waits for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.task.await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use minimart_db::repository::product::new_product;
    use minimart_db::DbConfig;

    #[tokio::test]
    async fn test_poll_once_detects_changes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // Empty catalog: nothing to report.
        assert!(poll_once(&db, None).await.unwrap().is_none());

        let p = new_product("Soap", "Lux", "3401", None, 3500, None, 1800, true, 5);
        db.products().insert(&p).await.unwrap();

        let snapshot = poll_once(&db, None).await.unwrap().unwrap();
        assert_eq!(snapshot.products.len(), 1);
        let high_water = snapshot.high_water;
        assert!(high_water.is_some());

        // Nothing changed since the high-water mark.
        assert!(poll_once(&db, high_water).await.unwrap().is_none());

        // A stock decrement bumps updated_at and surfaces again.
        db.products().decrement_stock(&p.id, 1).await.unwrap();
        let snapshot = poll_once(&db, high_water).await.unwrap().unwrap();
        assert_eq!(snapshot.products[0].stock_quantity, 4);
    }

    #[tokio::test]
    async fn test_feed_publishes_and_shuts_down() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = new_product("Soap", "Lux", "3401", None, 3500, None, 1800, true, 5);
        db.products().insert(&p).await.unwrap();

        let feed = ChangeFeed::spawn(db.clone(), Duration::from_millis(20))
            .await
            .unwrap();
        let mut rx = feed.subscribe();

        // Primed snapshot is already there.
        assert_eq!(rx.borrow().products.len(), 1);

        db.products().decrement_stock(&p.id, 2).await.unwrap();

        // The next tick publishes the refresh.
        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .expect("feed did not publish in time")
            .unwrap();
        assert_eq!(rx.borrow().products[0].stock_quantity, 3);

        feed.shutdown().await;
    }
}
