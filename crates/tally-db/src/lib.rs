//! # tally-db: Database Layer for Tally POS
//!
//! This crate owns every byte Tally POS keeps: products, stock levels and
//! bills, in SQLite via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /bills)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Components    │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductCatalog │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │◄───│ StockLedger    │    │ _schema.sql  │  │   │
//! │  │   │ Connection    │    │ BillStore      │    │              │  │   │
//! │  │   │ Management    │    │ BillBuilder    │    │              │  │   │
//! │  │   │               │    │ ReportingQuery │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │   ./tally.db                                                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and store error types
//! - [`repository`] - Catalog, stock ledger and bill store
//! - [`checkout`] - The bill-building transaction
//! - [`report`] - Bill history summaries
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_db::{Database, DbConfig};
//! use tally_core::{bill::BillRequest, CartLine, RequestContext};
//!
//! let db = Database::new(DbConfig::new("tally.db")).await?;
//!
//! let outcome = db
//!     .bill_builder()
//!     .build(&RequestContext::default(), &BillRequest::new(vec![CartLine::new("p-1", 2)]))
//!     .await?;
//! println!("{}", outcome.bill.receipt_number);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod report;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{BillBuilder, BillOutcome};
pub use error::{DbError, DbResult, StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use report::ReportingQuery;

// Repository re-exports for convenience
pub use repository::bill::BillStore;
pub use repository::product::ProductCatalog;
pub use repository::stock::StockLedger;
