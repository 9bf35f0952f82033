//! # Validation Module
//!
//! Input validation utilities for Tally POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web client                                                   │
//! │  └── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE / FOREIGN KEY constraints                       │
//! │  └── CHECK (available_quantity >= 0)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_product_id, validate_quantity};
//!
//! validate_product_id("p-1").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use chrono::{DateTime, NaiveDate};

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY, MAX_STOCK_LEVEL, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted product or customer identifier.
const MAX_ID_LEN: usize = 64;

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a product id referenced by a cart line or URL path.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_product_id;
///
/// assert!(validate_product_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_product_id("").is_err());
/// assert!(validate_product_id("has space").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    validate_identifier("productId", id)
}

/// Validates an optional customer reference.
///
/// Returns the trimmed value, or `None` for a blank string.
pub fn validate_customer_id(id: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(id) = id.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if id.chars().count() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "customerId".to_string(),
            max: MAX_ID_LEN,
        });
    }
    Ok(Some(id.to_string()))
}

/// Validates a client supplied bill id (idempotency key).
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_bill_id;
///
/// assert!(validate_bill_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_bill_id("not-a-uuid").is_err());
/// ```
pub fn validate_bill_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "billId".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "billId".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

fn validate_identifier(field: &str, id: &str) -> ValidationResult<()> {
    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LEN,
        });
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "productName".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "productName".to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

/// Validates an optional product category label.
///
/// A blank label is treated as absent.
pub fn validate_product_type(product_type: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(label) = product_type.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if label.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "productType".to_string(),
            max: 100,
        });
    }

    Ok(Some(label.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Salesman enters quantity: 5                                            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0?  → Error: "quantity must be positive"              │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       └── OK → line accepted into the cart                             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price (sale or purchase).
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_price;
/// use tally_core::Money;
///
/// assert!(validate_price("priceSale", Money::from_minor(1099)).is_ok());
/// assert!(validate_price("priceSale", Money::zero()).is_ok());
/// assert!(validate_price("priceSale", Money::from_minor(-1)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() || price.minor() > MAX_UNIT_PRICE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_UNIT_PRICE,
        });
    }

    Ok(())
}

/// Validates an absolute stock level (opening stock, stock count).
pub fn validate_stock_level(qty: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK_LEVEL).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "availableQuantity".to_string(),
            min: 0,
            max: MAX_STOCK_LEVEL,
        });
    }

    Ok(())
}

/// Validates a quantity of received goods (delta, at least one unit).
pub fn validate_receive_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_STOCK_LEVEL {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_STOCK_LEVEL,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size (number of distinct lines).
pub fn validate_cart_size(lines: usize) -> ValidationResult<()> {
    if lines > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart".to_string(),
            min: 1,
            max: MAX_CART_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Parses a calendar date sent by the client.
///
/// Accepts `YYYY-MM-DD`, or a full RFC 3339 timestamp whose date part is
/// taken as-is (date pickers often send `2026-10-19T00:00:00.000Z`).
///
/// ## Example
/// ```rust
/// use tally_core::validation::parse_date;
///
/// assert!(parse_date("startDate", "2026-10-19").is_ok());
/// assert!(parse_date("startDate", "2026-10-19T00:00:00Z").is_ok());
/// assert!(parse_date("startDate", "19/10/2026").is_err());
/// ```
pub fn parse_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected a date like 2026-10-19".to_string(),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("p-1").is_ok());
        assert!(validate_product_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_product_id("SKU_42").is_ok());

        assert!(matches!(
            validate_product_id(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_product_id(" p-1").is_err());
        assert!(validate_product_id("p;drop").is_err());
        assert!(validate_product_id(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_customer_id() {
        assert_eq!(validate_customer_id(None).unwrap(), None);
        assert_eq!(validate_customer_id(Some("   ")).unwrap(), None);
        assert_eq!(
            validate_customer_id(Some(" walk-in ")).unwrap(),
            Some("walk-in".to_string())
        );
        assert!(validate_customer_id(Some(&"c".repeat(65))).is_err());
    }

    #[test]
    fn test_validate_bill_id() {
        assert!(validate_bill_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_bill_id("").is_err());
        assert!(validate_bill_id("123").is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert_eq!(validate_product_name("  Tea 250g ").unwrap(), "Tea 250g");
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_product_type() {
        assert_eq!(validate_product_type(None).unwrap(), None);
        assert_eq!(validate_product_type(Some("")).unwrap(), None);
        assert_eq!(
            validate_product_type(Some("Grocery")).unwrap(),
            Some("Grocery".to_string())
        );
        assert!(validate_product_type(Some(&"x".repeat(101))).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("priceSale", Money::zero()).is_ok());
        assert!(validate_price("priceSale", Money::from_minor(MAX_UNIT_PRICE)).is_ok());
        assert!(validate_price("priceSale", Money::from_minor(MAX_UNIT_PRICE + 1)).is_err());
        assert!(validate_price("pricePurchase", Money::from_minor(-100)).is_err());
    }

    #[test]
    fn test_stock_validators() {
        assert!(validate_stock_level(0).is_ok());
        assert!(validate_stock_level(-1).is_err());
        assert!(validate_receive_quantity(1).is_ok());
        assert!(validate_receive_quantity(0).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(MAX_CART_LINES).is_ok());
        assert!(validate_cart_size(MAX_CART_LINES + 1).is_err());
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(parse_date("startDate", "2026-10-19").unwrap(), expected);
        assert_eq!(
            parse_date("startDate", "2026-10-19T23:00:00+05:00").unwrap(),
            expected
        );
        assert!(matches!(
            parse_date("startDate", ""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_date("endDate", "2026-13-01"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }
}
