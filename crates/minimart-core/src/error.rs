//! # Error Types
//!
//! Domain-specific error types for minimart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  minimart-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  minimart-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  minimart-billing errors (engine crate)                                │
//! │  └── BillingError     - Checkout/session failures with error codes     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → BillingError → caller             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, amounts, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product is not in the cart.
    #[error("Product not in cart: {0}")]
    ProductNotInCart(String),

    /// Insufficient stock to complete the operation.
    ///
    /// ## When This Occurs
    /// - Adding or increasing a cart line beyond available stock
    /// - Committing a sale after stock dropped underneath the cart
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Parle-G 250g", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Parle-G 250g in stock"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Cart has exceeded maximum allowed unique items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Checkout was attempted on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cash tendered does not cover the payable total.
    #[error("Insufficient cash: required {required}, tendered {tendered}")]
    InsufficientCash { required: i64, tendered: i64 },

    /// A flat discount amount exceeds the amount it discounts.
    #[error("Discount {amount} exceeds discountable amount {base}")]
    DiscountExceedsBase { amount: i64, base: i64 },

    /// A percentage discount is outside 0-100%.
    #[error("Discount percentage {bps} bps is out of range (0-10000)")]
    DiscountPercentOutOfRange { bps: u32 },

    /// Customer tried to redeem more points than they hold.
    #[error("Cannot redeem {requested} points: balance is {balance}")]
    RedemptionExceedsBalance { requested: i64, balance: i64 },

    /// A checkout is already in flight for this session.
    #[error("A checkout is already in progress")]
    CheckoutInFlight,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad barcode characters, malformed phone).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate product name or barcode).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
