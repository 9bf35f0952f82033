//! # Repository Module
//!
//! Table-level components of Tally POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │  db.catalog().list_sellable()                                  │
//! │       ▼                                                                 │
//! │  ProductCatalog / StockLedger / BillStore                              │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Each repository owns its tables. Operations that must run inside     │
//! │  someone else's transaction are exposed as `pub(crate)` functions     │
//! │  taking a `&mut SqliteConnection`.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductCatalog`](product::ProductCatalog) - Products, soft delete, sellable listing
//! - [`StockLedger`](stock::StockLedger) - Stock levels, conditional decrement
//! - [`BillStore`](bill::BillStore) - Immutable bills and date-range queries

pub mod bill;
pub mod product;
pub mod stock;
