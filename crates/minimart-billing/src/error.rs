//! # Billing Error Type
//!
//! Unified error type for the billing engine.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Minimart POS                           │
//! │                                                                         │
//! │  CoreError (business rule) ──┐                                          │
//! │                              ├──► BillingError { code, message }        │
//! │  DbError (storage)        ───┘         │                                │
//! │                                        ▼                                │
//! │           caller matches on `code` for programmatic handling,           │
//! │           shows `message` to the cashier                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use minimart_core::CoreError;
use minimart_db::DbError;

/// Machine-readable error codes.
///
/// Serialized SCREAMING_SNAKE_CASE so callers can switch on them:
/// `INSUFFICIENT_STOCK`, `PAYMENT_ERROR`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Business logic error
    BusinessLogic,

    /// Cart operation failed
    CartError,

    /// Insufficient stock
    InsufficientStock,

    /// Payment processing error (insufficient cash, bad tender)
    PaymentError,

    /// A checkout is already in flight
    CheckoutInFlight,

    /// Internal error
    Internal,
}

/// Engine error returned from session and checkout operations.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{message}")]
pub struct BillingError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

impl BillingError {
    /// Creates a new billing error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        BillingError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        BillingError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        BillingError::new(ErrorCode::Internal, message)
    }
}

/// Converts business rule errors to billing errors.
impl From<CoreError> for BillingError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::InsufficientCash { .. } => ErrorCode::PaymentError,
            CoreError::CheckoutInFlight => ErrorCode::CheckoutInFlight,
            CoreError::ProductNotInCart(_)
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::EmptyCart => ErrorCode::CartError,
            CoreError::DiscountExceedsBase { .. }
            | CoreError::DiscountPercentOutOfRange { .. }
            | CoreError::RedemptionExceedsBalance { .. } => ErrorCode::BusinessLogic,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        BillingError::new(code, err.to_string())
    }
}

/// Converts storage errors to billing errors.
impl From<DbError> for BillingError {
    fn from(err: DbError) -> Self {
        let code = match &err {
            DbError::NotFound { .. } => ErrorCode::NotFound,
            DbError::UniqueViolation { .. } | DbError::CheckViolation { .. } => {
                ErrorCode::ValidationError
            }
            _ => ErrorCode::DatabaseError,
        };
        BillingError::new(code, err.to_string())
    }
}

/// Result type for billing operations.
pub type BillingResult<T> = Result<T, BillingError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: BillingError = CoreError::InsufficientStock {
            name: "Soap".to_string(),
            available: 1,
            requested: 2,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("Soap"));

        let err: BillingError = CoreError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[test]
    fn test_db_error_mapping() {
        let err: BillingError = DbError::not_found("Customer", "c1").into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: BillingError = DbError::duplicate("invoice_number", "NM 0001").into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::InsufficientStock).unwrap();
        assert_eq!(json, "\"INSUFFICIENT_STOCK\"");
    }
}
