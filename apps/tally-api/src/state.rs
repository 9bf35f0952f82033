//! # Application State
//!
//! Shared by every handler through axum's `State` extractor.
//!
//! ## Thread Safety
//! `Database` wraps a `SqlitePool`, which is reference counted and safe to
//! use from many requests at once; the rest is read-only after startup.
//! Cloning `AppState` per request is therefore cheap and needs no locking.

use std::sync::Arc;

use chrono::FixedOffset;
use tally_core::receipt::ReceiptLayout;
use tally_db::{Database, ReportingQuery};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,

    /// Offset that decides which local day a bill belongs to.
    pub utc_offset: FixedOffset,

    pub receipt_layout: Arc<ReceiptLayout>,
}

impl AppState {
    pub fn new(db: Database, utc_offset: FixedOffset, receipt_layout: ReceiptLayout) -> Self {
        AppState {
            db,
            utc_offset,
            receipt_layout: Arc::new(receipt_layout),
        }
    }

    /// Bill history at the configured offset.
    pub fn reports(&self) -> ReportingQuery {
        self.db.reports(self.utc_offset)
    }
}
