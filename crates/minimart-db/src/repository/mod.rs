//! # Repository Module
//!
//! Database repository implementations for Minimart POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Checkout / caller                                                     │
//! │       │                                                                 │
//! │       │  db.products().search("parle", 20)                             │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── search(&self, query, limit)                                       │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, product)                                            │
//! │  └── decrement_stock(&self, id, qty)                                   │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Repositories are cheap handles over the shared pool                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product CRUD, search, stock decrements
//! - [`customer::CustomerRepository`] - Customer lookup and loyalty/spend updates
//! - [`transaction::TransactionRepository`] - Committed sales and line items
//! - [`loyalty::LoyaltyRepository`] - Append-only loyalty ledger
//! - [`settings::SettingsRepository`] - Store profile key/value settings

pub mod customer;
pub mod loyalty;
pub mod product;
pub mod settings;
pub mod transaction;
