//! # Validation Module
//!
//! Input validation utilities for Minimart POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller / UI                                                  │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rule validation before any write                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (name, hsn_code, barcode)                      │
//! │  └── CHECK constraints (stock_quantity >= 0)                           │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use minimart_core::validation::{validate_product_name, validate_quantity};
//!
//! assert!(validate_product_name("Parle-G 250g").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trim)
/// - Must be at most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an HSN tax-classification code.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 8 characters (HSN codes are 2-8 digits)
/// - Digits only
pub fn validate_hsn_code(hsn: &str) -> ValidationResult<()> {
    let hsn = hsn.trim();

    if hsn.is_empty() {
        return Err(ValidationError::Required {
            field: "hsn_code".to_string(),
        });
    }

    if hsn.len() > 8 {
        return Err(ValidationError::TooLong {
            field: "hsn_code".to_string(),
            max: 8,
        });
    }

    if !hsn.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "hsn_code".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a barcode.
///
/// ## Rules
/// - Must not be empty (use `None`, not `Some("")`, for no barcode)
/// - Must be at most 32 characters
/// - Alphanumeric only (covers EAN-13, UPC-A, Code 39 subsets)
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 32,
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a customer phone number.
///
/// ## Rules
/// - Must not be empty
/// - 10 to 15 characters, digits with optional leading `+`
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.len() < 10 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must be 10-15 digits with optional leading +".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item quantity for cart operations.
///
/// ## Rules
/// - Must be positive
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in paise.
///
/// ## Rules
/// - Must be positive (free items are not a thing at the till)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a GST rate in basis points.
///
/// ## Rules
/// - At most 10000 bps (100%); zero is legal (exempt goods)
pub fn validate_gst_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "gst_rate_bps".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
