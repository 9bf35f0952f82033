//! # Bill Module
//!
//! Cart normalization and server-side pricing of bill lines.
//!
//! ## Checkout Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  BillRequest { cart, billId?, customerId? }                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  normalize_cart()      ← THIS MODULE (pure)                            │
//! │  ├── empty?             → EmptyCart                                    │
//! │  ├── bad quantity?      → InvalidQuantity { product_id, quantity }     │
//! │  ├── duplicate lines    → merged, first position kept                  │
//! │  └── > 100 lines?       → CartTooLarge                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tally-db: conditional stock decrement per line (transaction)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price_lines()         ← THIS MODULE (pure)                            │
//! │  ├── name + price come from the catalog snapshot, never the request    │
//! │  └── total = Σ line amounts (checked arithmetic)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PricedBill::into_bill() → Bill (immutable)                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Bill, BillLine, CartLine};
use crate::validation::{
    validate_bill_id, validate_cart_size, validate_customer_id, validate_product_id,
    validate_quantity,
};

// =============================================================================
// Bill Request
// =============================================================================

/// A request to turn a cart into a bill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillRequest {
    /// Requested lines; prices are never part of the request.
    pub cart: Vec<CartLine>,

    /// Client generated id, reused on retries to avoid double billing.
    pub bill_id: Option<String>,

    pub customer_id: Option<String>,
}

impl BillRequest {
    pub fn new(cart: Vec<CartLine>) -> Self {
        BillRequest {
            cart,
            ..Default::default()
        }
    }

    pub fn with_bill_id(mut self, bill_id: impl Into<String>) -> Self {
        self.bill_id = Some(bill_id.into());
        self
    }

    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    /// Validates every field and returns a copy with the cart normalized.
    ///
    /// Nothing outside this function has to re-check the request.
    pub fn normalized(&self) -> CoreResult<BillRequest> {
        let cart = normalize_cart(&self.cart)?;

        if let Some(id) = &self.bill_id {
            validate_bill_id(id)?;
        }
        let customer_id = validate_customer_id(self.customer_id.as_deref())?;

        Ok(BillRequest {
            cart,
            bill_id: self.bill_id.clone(),
            customer_id,
        })
    }
}

// =============================================================================
// Cart Normalization
// =============================================================================

/// Validates a cart and merges duplicate product lines.
///
/// ## Rules
/// - The cart must contain at least one line
/// - Every product id must be well formed
/// - Every line quantity must be within `1..=MAX_ITEM_QUANTITY`
/// - Lines for the same product are summed; the merged quantity is
///   checked again against `MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_LINES` distinct products
///
/// ## Example
/// ```rust
/// use tally_core::bill::normalize_cart;
/// use tally_core::CartLine;
///
/// let cart = normalize_cart(&[
///     CartLine::new("tea", 2),
///     CartLine::new("sugar", 1),
///     CartLine::new("tea", 3),
/// ]).unwrap();
///
/// assert_eq!(cart, vec![CartLine::new("tea", 5), CartLine::new("sugar", 1)]);
/// ```
pub fn normalize_cart(lines: &[CartLine]) -> CoreResult<Vec<CartLine>> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(lines.len());

    for line in lines {
        validate_product_id(&line.product_id)?;
        check_quantity(&line.product_id, line.quantity)?;

        match positions.get(line.product_id.as_str()).copied() {
            Some(idx) => {
                let existing = &mut merged[idx];
                existing.quantity += line.quantity;
                check_quantity(&existing.product_id, existing.quantity)?;
            }
            None => {
                positions.insert(line.product_id.as_str(), merged.len());
                merged.push(line.clone());
            }
        }
    }

    if validate_cart_size(merged.len()).is_err() {
        return Err(CoreError::CartTooLarge {
            max: crate::MAX_CART_LINES,
        });
    }

    Ok(merged)
}

/// Reports a bad quantity against the line's product.
fn check_quantity(product_id: &str, quantity: i64) -> CoreResult<()> {
    validate_quantity(quantity).map_err(|_| CoreError::InvalidQuantity {
        product_id: product_id.to_string(),
        quantity,
    })
}

// =============================================================================
// Pricing
// =============================================================================

/// Authoritative name and sale price of a product, read from the catalog
/// inside the checkout transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductSnapshot {
    pub product_id: String,
    pub name: String,
    pub price_sale: Money,
}

/// Priced lines plus their exact total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedBill {
    pub lines: Vec<BillLine>,
    pub total: Money,
}

/// Header fields assigned when a priced cart becomes a bill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillHeader {
    pub id: String,
    pub receipt_number: String,
    pub created_at: DateTime<Utc>,
    pub customer_id: Option<String>,
    pub sold_by: Option<String>,
}

impl PricedBill {
    pub fn into_bill(self, header: BillHeader) -> Bill {
        Bill {
            id: header.id,
            receipt_number: header.receipt_number,
            created_at: header.created_at,
            customer_id: header.customer_id,
            sold_by: header.sold_by,
            lines: self.lines,
            total_sale_amount: self.total,
        }
    }
}

/// Prices a normalized cart against catalog snapshots.
///
/// Line order follows the cart. `line_no` starts at 1.
///
/// ## Errors
/// - `UnknownProduct` if a cart line has no snapshot
/// - `AmountOverflow` if a line amount or the total cannot be represented
pub fn price_lines(cart: &[CartLine], snapshots: &[ProductSnapshot]) -> CoreResult<PricedBill> {
    let by_id: HashMap<&str, &ProductSnapshot> = snapshots
        .iter()
        .map(|s| (s.product_id.as_str(), s))
        .collect();

    let mut lines = Vec::with_capacity(cart.len());
    let mut total = Money::zero();

    for (idx, item) in cart.iter().enumerate() {
        let snapshot = by_id
            .get(item.product_id.as_str())
            .ok_or_else(|| CoreError::UnknownProduct(item.product_id.clone()))?;

        let overflow = || CoreError::AmountOverflow {
            product_id: item.product_id.clone(),
        };
        let amount = snapshot
            .price_sale
            .checked_multiply_quantity(item.quantity)
            .ok_or_else(overflow)?;
        total = total.checked_add(amount).ok_or_else(overflow)?;

        lines.push(BillLine {
            line_no: idx as i64 + 1,
            product_id: item.product_id.clone(),
            product_name: snapshot.name.clone(),
            quantity_sold: item.quantity,
            price_sale_per_unit: snapshot.price_sale,
            price_sale_amount: amount,
        });
    }

    Ok(PricedBill { lines, total })
}

// =============================================================================
// Identifiers
// =============================================================================

/// Generates a new bill id (UUID v4).
pub fn generate_bill_id() -> String {
    Uuid::new_v4().to_string()
}

/// Formats a receipt number: `YYYYMMDD-NNNN`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use tally_core::bill::format_receipt_number;
///
/// let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
/// assert_eq!(format_receipt_number(day, 7), "20261019-0007");
/// assert_eq!(format_receipt_number(day, 12345), "20261019-12345");
/// ```
pub fn format_receipt_number(day: NaiveDate, sequence: i64) -> String {
    format!("{}-{:04}", day.format("%Y%m%d"), sequence)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::MAX_CART_LINES;

    fn snapshot(id: &str, name: &str, price: i64) -> ProductSnapshot {
        ProductSnapshot {
            product_id: id.to_string(),
            name: name.to_string(),
            price_sale: Money::from_minor(price),
        }
    }

    #[test]
    fn test_empty_cart_rejected() {
        assert_eq!(normalize_cart(&[]), Err(CoreError::EmptyCart));
    }

    #[test]
    fn test_invalid_quantity_names_product() {
        let err = normalize_cart(&[CartLine::new("a", 1), CartLine::new("b", 0)]).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidQuantity {
                product_id: "b".to_string(),
                quantity: 0
            }
        );

        let err = normalize_cart(&[CartLine::new("a", 1000)]).unwrap_err();
        assert_eq!(err.product_id(), Some("a"));
    }

    #[test]
    fn test_merged_quantity_is_rechecked() {
        let err = normalize_cart(&[CartLine::new("a", 500), CartLine::new("a", 500)]).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidQuantity {
                product_id: "a".to_string(),
                quantity: 1000
            }
        );
    }

    #[test]
    fn test_malformed_product_id() {
        let err = normalize_cart(&[CartLine::new("", 1)]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_cart_too_large() {
        let lines: Vec<CartLine> = (0..=MAX_CART_LINES)
            .map(|i| CartLine::new(format!("p{i}"), 1))
            .collect();
        assert_eq!(
            normalize_cart(&lines),
            Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES
            })
        );
    }

    #[test]
    fn test_price_lines_uses_snapshot_prices() {
        let cart = normalize_cart(&[CartLine::new("tea", 3), CartLine::new("sugar", 2)]).unwrap();
        let priced = price_lines(
            &cart,
            &[snapshot("sugar", "Sugar 1kg", 250), snapshot("tea", "Tea 250g", 100)],
        )
        .unwrap();

        assert_eq!(priced.lines.len(), 2);
        assert_eq!(priced.lines[0].line_no, 1);
        assert_eq!(priced.lines[0].product_name, "Tea 250g");
        assert_eq!(priced.lines[0].price_sale_amount, Money::from_minor(300));
        assert_eq!(priced.lines[1].line_no, 2);
        assert_eq!(priced.lines[1].price_sale_amount, Money::from_minor(500));
        assert_eq!(priced.total, Money::from_minor(800));

        let sum: Money = priced.lines.iter().map(|l| l.price_sale_amount).sum();
        assert_eq!(sum, priced.total);
    }

    #[test]
    fn test_price_lines_missing_snapshot() {
        let cart = vec![CartLine::new("ghost", 1)];
        assert_eq!(
            price_lines(&cart, &[]),
            Err(CoreError::UnknownProduct("ghost".to_string()))
        );
    }

    #[test]
    fn test_price_lines_overflow() {
        let cart = vec![CartLine::new("gold", 999)];
        let err = price_lines(&cart, &[snapshot("gold", "Gold", i64::MAX / 10)]).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { .. }));
    }

    #[test]
    fn test_into_bill() {
        let cart = vec![CartLine::new("tea", 2)];
        let priced = price_lines(&cart, &[snapshot("tea", "Tea", 150)]).unwrap();
        let now = Utc::now();
        let bill = priced.into_bill(BillHeader {
            id: "b-1".to_string(),
            receipt_number: "20261019-0001".to_string(),
            created_at: now,
            customer_id: None,
            sold_by: Some("clerk".to_string()),
        });

        assert_eq!(bill.total_sale_amount, Money::from_minor(300));
        assert_eq!(bill.lines_total(), bill.total_sale_amount);
        assert_eq!(bill.sold_by.as_deref(), Some("clerk"));
    }

    #[test]
    fn test_request_normalized() {
        let req = BillRequest::new(vec![CartLine::new("a", 1), CartLine::new("a", 2)])
            .with_customer_id("  ");
        let normalized = req.normalized().unwrap();
        assert_eq!(normalized.cart, vec![CartLine::new("a", 3)]);
        assert_eq!(normalized.customer_id, None);

        let bad = BillRequest::new(vec![CartLine::new("a", 1)]).with_bill_id("nope");
        assert!(matches!(bad.normalized(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_generate_bill_id_is_uuid() {
        let id = generate_bill_id();
        assert!(validate_bill_id(&id).is_ok());
        assert_ne!(id, generate_bill_id());
    }
}
