//! # Domain Types
//!
//! Core domain types used throughout Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │──►│   StockEntry    │   │    CartLine     │       │
//! │  │  id (UUID)      │1:1│  product_id     │   │  (transient)    │       │
//! │  │  name           │   │  available_qty  │   │  product_id     │       │
//! │  │  price_sale     │   │  (never < 0)    │   │  quantity       │       │
//! │  │  price_purchase │   └─────────────────┘   └────────┬────────┘       │
//! │  └─────────────────┘                                  │ checkout       │
//! │                                                        ▼                │
//! │                        ┌─────────────────┐   ┌─────────────────┐       │
//! │                        │      Bill       │──►│    BillLine     │       │
//! │                        │  id, receipt #  │1:n│  name snapshot  │       │
//! │                        │  total (derived)│   │  price snapshot │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `BillLine` copies the product name and sale price at the moment of
//! sale. Editing or deactivating the product later never rewrites history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the salesman and printed on bills.
    pub name: String,

    /// Optional category label ("Grocery", "Beverage", ...).
    pub product_type: Option<String>,

    /// Unit sale price.
    pub price_sale: Money,

    /// Unit purchase price (admin only, never printed).
    pub price_purchase: Money,

    /// Whether the product can still be sold (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for the admin add-product flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub product_type: Option<String>,
    pub price_sale: Money,
    pub price_purchase: Money,
    /// Opening stock level.
    pub quantity: i64,
}

/// Input for the admin update-product flow.
///
/// Stock is not part of this update; it goes through the stock ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductUpdate {
    pub name: String,
    pub product_type: Option<String>,
    pub price_sale: Money,
    pub price_purchase: Money,
}

// =============================================================================
// Stock
// =============================================================================

/// Available quantity of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockEntry {
    pub product_id: String,

    /// Units on hand. Invariant: never negative.
    pub available_quantity: i64,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// An active product joined with its stock level and sale price.
///
/// This is what the salesman picks from when building a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SellableProduct {
    pub product_id: String,
    pub name: String,
    pub product_type: Option<String>,
    pub price_sale: Money,
    pub available_quantity: i64,
}

// =============================================================================
// Cart
// =============================================================================

/// One requested line of a cart. Never carries a price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        CartLine {
            product_id: product_id.into(),
            quantity,
        }
    }
}

// =============================================================================
// Bill
// =============================================================================

/// A completed sale. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Bill {
    /// Unique identifier (UUID v4), also the idempotency key.
    pub id: String,

    /// Human readable number printed on the receipt: `YYYYMMDD-NNNN`.
    pub receipt_number: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Optional customer reference captured at the counter.
    pub customer_id: Option<String>,

    /// Principal that generated the bill, for audit.
    pub sold_by: Option<String>,

    pub lines: Vec<BillLine>,

    /// Sum of `lines[*].price_sale_amount`.
    pub total_sale_amount: Money,
}

impl Bill {
    /// Recomputes the total from the lines.
    pub fn lines_total(&self) -> Money {
        self.lines.iter().map(|l| l.price_sale_amount).sum()
    }
}

/// A line item of a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillLine {
    /// 1-based position within the bill.
    pub line_no: i64,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity_sold: i64,
    /// Unit sale price at time of sale (frozen).
    pub price_sale_per_unit: Money,
    /// `quantity_sold × price_sale_per_unit`.
    pub price_sale_amount: Money,
}

// =============================================================================
// Request Context
// =============================================================================

/// Per-request context passed explicitly into every state-changing operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Correlation id for logs.
    pub request_id: String,

    /// Authenticated principal forwarded by the gateway, if any.
    pub principal: Option<String>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, principal: Option<String>) -> Self {
        RequestContext {
            request_id: request_id.into(),
            principal,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bill() -> Bill {
        Bill {
            id: "b-1".to_string(),
            receipt_number: "20261019-0001".to_string(),
            created_at: Utc::now(),
            customer_id: None,
            sold_by: Some("salesman@example.com".to_string()),
            lines: vec![
                BillLine {
                    line_no: 1,
                    product_id: "p-1".to_string(),
                    product_name: "Tea".to_string(),
                    quantity_sold: 3,
                    price_sale_per_unit: Money::from_minor(100),
                    price_sale_amount: Money::from_minor(300),
                },
                BillLine {
                    line_no: 2,
                    product_id: "p-2".to_string(),
                    product_name: "Sugar".to_string(),
                    quantity_sold: 1,
                    price_sale_per_unit: Money::from_minor(250),
                    price_sale_amount: Money::from_minor(250),
                },
            ],
            total_sale_amount: Money::from_minor(550),
        }
    }

    #[test]
    fn test_bill_derived_values() {
        let bill = sample_bill();
        assert_eq!(bill.lines_total(), bill.total_sale_amount);
    }

    #[test]
    fn test_bill_serializes_camel_case() {
        let json = serde_json::to_value(sample_bill()).unwrap();
        assert_eq!(json["receiptNumber"], "20261019-0001");
        assert_eq!(json["totalSaleAmount"], 550);
        assert_eq!(json["lines"][0]["priceSalePerUnit"], 100);
        assert_eq!(json["lines"][0]["quantitySold"], 3);
    }

    #[test]
    fn test_cart_line_deserializes() {
        let line: CartLine =
            serde_json::from_str(r#"{"productId":"p-9","quantity":2}"#).unwrap();
        assert_eq!(line, CartLine::new("p-9", 2));
    }
}
