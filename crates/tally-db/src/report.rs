//! # Reporting Query
//!
//! Read-only bill history for a range of local calendar days.
//!
//! ```text
//! "2026-10-19", "2026-10-21"  (+05:00)
//!        │
//!        ▼  DateRange::from_request
//! [2026-10-18T19:00Z, 2026-10-21T19:00Z)
//!        │
//!        ▼  BillStore::query_by_date_range
//! Vec<BillDay>  (grouped by local day)
//!        │
//!        ▼  tally_core::report::summarize
//! ReportSummary
//! ```

use chrono::FixedOffset;
use tracing::debug;

use crate::error::StoreResult;
use crate::repository::bill::BillStore;
use tally_core::report::{summarize, DateRange, ReportSummary};

/// Bill history queries at a fixed reporting offset.
#[derive(Debug, Clone)]
pub struct ReportingQuery {
    bills: BillStore,
    utc_offset: FixedOffset,
}

impl ReportingQuery {
    pub fn new(bills: BillStore, utc_offset: FixedOffset) -> Self {
        ReportingQuery { bills, utc_offset }
    }

    /// Summarizes the bills between two `YYYY-MM-DD` dates, both inclusive.
    /// A missing `end` reports the start day only.
    ///
    /// ## Errors
    /// * `Rejected(Validation)` - unparseable dates, `end < start`, range too long
    pub async fn summarize(&self, start: &str, end: Option<&str>) -> StoreResult<ReportSummary> {
        let range = DateRange::from_request(start, end)?;
        self.summarize_range(range).await
    }

    /// Summarizes an already validated range.
    pub async fn summarize_range(&self, range: DateRange) -> StoreResult<ReportSummary> {
        let days = self.bills.query_by_date_range(range, self.utc_offset).await?;
        let summary = summarize(range, days);

        debug!(
            start = %summary.start_date,
            end = %summary.end_date,
            bills = summary.bill_count,
            total = %summary.grand_total,
            "Report summarized"
        );
        Ok(summary)
    }
}
