//! # minimart-db: Database Layer for Minimart POS
//!
//! This crate provides database access for the Minimart POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Minimart POS Data Flow                            │
//! │                                                                         │
//! │  minimart-billing (checkout, session)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   minimart-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CustomerRepo  │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ TxnRepo       │    │              │  │   │
//! │  │   │ Management    │    │ LoyaltyRepo   │    │              │  │   │
//! │  │   └───────────────┘    │ SettingsRepo  │    └──────────────┘  │   │
//! │  │                        └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL mode, foreign keys on)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, customer, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use minimart_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/minimart.db");
//! let db = Database::new(config).await?;
//!
//! let products = db.products().search("parle", 20).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::loyalty::LoyaltyRepository;
pub use repository::product::ProductRepository;
pub use repository::settings::SettingsRepository;
pub use repository::transaction::TransactionRepository;
