//! # tally-core: Pure Business Logic for Tally POS
//!
//! This crate holds every rule of the sale flow that can be expressed
//! without touching a database: money arithmetic, cart normalization,
//! line pricing, report aggregation and receipt layout.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web client (salesman / admin)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ REST / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-api (axum handlers)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (SQLite)                            │   │
//! │  │   ProductCatalog · StockLedger · BillBuilder · BillStore        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ calls pure functions               │   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │   types · money · bill · report · receipt · validation          │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, StockEntry, Bill, BillLine, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`bill`] - Cart normalization and server-side line pricing
//! - [`report`] - Date ranges and per-day aggregation of bills
//! - [`receipt`] - Plain-text receipt rendering
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::bill::{normalize_cart, price_lines, ProductSnapshot};
//! use tally_core::{CartLine, Money};
//!
//! let cart = normalize_cart(&[CartLine::new("p-1", 3)]).unwrap();
//! let snapshot = ProductSnapshot {
//!     product_id: "p-1".to_string(),
//!     name: "Tea 250g".to_string(),
//!     price_sale: Money::from_minor(100),
//! };
//!
//! let priced = price_lines(&cart, &[snapshot]).unwrap();
//! assert_eq!(priced.total, Money::from_minor(300));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bill;
pub mod error;
pub mod money;
pub mod receipt;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
///
/// ## Business Reason
/// Keeps a single checkout transaction short; a counter sale never needs more.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single product in one bill.
///
/// Prevents accidental over-selling (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum unit price accepted for a product, in minor units.
///
/// Bounds every line amount so that `price × quantity × lines` stays far
/// away from `i64::MAX`.
pub const MAX_UNIT_PRICE: i64 = 1_000_000_000_000;

/// Upper bound for an absolute stock level or a single goods receipt.
pub const MAX_STOCK_LEVEL: i64 = 1_000_000_000;

/// Longest date range a bill report may cover.
pub const MAX_REPORT_RANGE_DAYS: i64 = 366;
