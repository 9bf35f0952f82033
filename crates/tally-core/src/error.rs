//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule failures (cart, stock, lookups)  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── StoreError       - Rejected(CoreError) | Persistence(DbError)     │
//! │                                                                         │
//! │  tally-api errors                                                      │
//! │  └── ApiError         - What the HTTP client sees (serialized)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → ApiError → client    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant carries enough context for the client to point at the
/// offending cart line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The submitted cart has no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart line asks for a quantity outside `1..=MAX_ITEM_QUANTITY`.
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: String, quantity: i64 },

    /// Cart has more distinct lines than allowed.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// A cart line references a product that does not exist or is inactive.
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// Not enough stock to cover a cart line.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: [{P, qty: 5}]
    ///      │
    ///      ▼
    /// Conditional decrement: available=2
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: "P", available: 2, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 2 left", salesman adjusts the cart
    /// ```
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Product lookup by id failed (admin and catalog paths).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Bill lookup by id failed.
    #[error("Bill not found: {0}")]
    BillNotFound(String),

    /// A computed amount does not fit in the money representation.
    #[error("Amount overflow while pricing product {product_id}")]
    AmountOverflow { product_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the product id the error refers to, if any.
    pub fn product_id(&self) -> Option<&str> {
        match self {
            CoreError::InvalidQuantity { product_id, .. }
            | CoreError::InsufficientStock { product_id, .. }
            | CoreError::AmountOverflow { product_id } => Some(product_id),
            CoreError::UnknownProduct(id) | CoreError::ProductNotFound(id) => Some(id),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements and are
/// raised before any stock is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
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

    /// Invalid format (e.g., invalid date, whitespace in an id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "P".to_string(),
            available: 2,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for P: available 2, requested 5"
        );
        assert_eq!(CoreError::EmptyCart.to_string(), "Cart is empty");
    }

    #[test]
    fn test_product_id_accessor() {
        let err = CoreError::InvalidQuantity {
            product_id: "abc".to_string(),
            quantity: 0,
        };
        assert_eq!(err.product_id(), Some("abc"));
        assert_eq!(CoreError::UnknownProduct("x".into()).product_id(), Some("x"));
        assert_eq!(CoreError::EmptyCart.product_id(), None);
        assert_eq!(CoreError::BillNotFound("b".into()).product_id(), None);
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "productName".to_string(),
        };
        assert_eq!(err.to_string(), "productName is required");

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 999,
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 999");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "startDate".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
