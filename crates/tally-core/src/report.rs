//! # Report Module
//!
//! Date ranges and per-day aggregation for the bill history screen.
//!
//! ## Day Boundaries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Bills are stored with a UTC instant. A "day" in a report is a local    │
//! │  calendar day at the configured reporting offset.                       │
//! │                                                                         │
//! │  range 2026-10-19 ..= 2026-10-20, offset +05:00                         │
//! │                                                                         │
//! │  local  2026-10-19 00:00 ────────────────────────► 2026-10-21 00:00     │
//! │  UTC    2026-10-18 19:00 ────────────────────────► 2026-10-20 19:00     │
//! │         [ inclusive                                  exclusive )        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The database layer turns the range into UTC bounds with
//! [`DateRange::utc_bounds`], loads the bills, and everything else
//! (grouping, totals) happens here.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Bill;
use crate::validation::parse_date;
use crate::MAX_REPORT_RANGE_DAYS;

/// Largest accepted distance from UTC, in minutes (UTC+14:00).
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Calendar years a report may cover. Keeps `utc_bounds` arithmetic in range.
pub const REPORT_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

// =============================================================================
// Date Range
// =============================================================================

/// An inclusive range of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `end < start`, years outside
    /// [`REPORT_YEARS`] and ranges longer than `MAX_REPORT_RANGE_DAYS`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        for (field, day) in [("startDate", start), ("endDate", end)] {
            if !REPORT_YEARS.contains(&day.year()) {
                return Err(ValidationError::OutOfRange {
                    field: format!("{field} year"),
                    min: i64::from(*REPORT_YEARS.start()),
                    max: i64::from(*REPORT_YEARS.end()),
                }
                .into());
            }
        }

        if end < start {
            return Err(ValidationError::InvalidFormat {
                field: "endDate".to_string(),
                reason: "must not be before startDate".to_string(),
            }
            .into());
        }

        let range = DateRange { start, end };
        if range.days() > MAX_REPORT_RANGE_DAYS {
            return Err(ValidationError::OutOfRange {
                field: "date range (days)".to_string(),
                min: 1,
                max: MAX_REPORT_RANGE_DAYS,
            }
            .into());
        }

        Ok(range)
    }

    /// Builds a range from the raw request fields.
    ///
    /// A missing or blank `end` means "just the start day".
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::report::DateRange;
    ///
    /// let range = DateRange::from_request("2026-10-19", None).unwrap();
    /// assert_eq!(range.days(), 1);
    ///
    /// assert!(DateRange::from_request("2026-10-19", Some("2026-10-18")).is_err());
    /// ```
    pub fn from_request(start: &str, end: Option<&str>) -> CoreResult<Self> {
        let start = parse_date("startDate", start)?;
        let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_date("endDate", raw)?,
            None => start,
        };
        DateRange::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered (at least 1).
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Half-open UTC interval `[start 00:00, end+1 00:00)` at `offset`.
    pub fn utc_bounds(&self, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
        let from = local_midnight_utc(self.start, offset);
        let until = local_midnight_utc(self.end, offset) + Duration::days(1);
        (from, until)
    }
}

fn local_midnight_utc(day: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = day.and_time(NaiveTime::MIN);
    (local - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

/// Builds the reporting offset from a minute count such as `300` (UTC+05:00).
pub fn offset_from_minutes(minutes: i32) -> CoreResult<FixedOffset> {
    if minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        return Err(ValidationError::OutOfRange {
            field: "utcOffsetMinutes".to_string(),
            min: -i64::from(MAX_UTC_OFFSET_MINUTES),
            max: i64::from(MAX_UTC_OFFSET_MINUTES),
        }
        .into());
    }

    FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
        ValidationError::InvalidFormat {
            field: "utcOffsetMinutes".to_string(),
            reason: "not a valid UTC offset".to_string(),
        }
        .into()
    })
}

/// Local calendar day of an instant.
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

// =============================================================================
// Grouping
// =============================================================================

/// Bills of one local calendar day, ascending by creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillDay {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub bills: Vec<Bill>,
}

/// Groups bills by local calendar day.
///
/// Days ascend; bills within a day ascend by `created_at` (ties broken by
/// receipt number so the output is stable).
pub fn group_by_day(mut bills: Vec<Bill>, offset: FixedOffset) -> Vec<BillDay> {
    bills.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.receipt_number.cmp(&b.receipt_number))
    });

    let mut days: Vec<BillDay> = Vec::new();
    for bill in bills {
        let date = local_date(bill.created_at, offset);
        match days.last_mut() {
            Some(day) if day.date == date => day.bills.push(bill),
            _ => days.push(BillDay {
                date,
                bills: vec![bill],
            }),
        }
    }
    days
}

// =============================================================================
// Summary
// =============================================================================

/// Totals for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DayTotal {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub bill_count: i64,
    pub total_sale_amount: Money,
}

/// Result of a bill history query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReportSummary {
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    pub per_day_totals: Vec<DayTotal>,
    pub grand_total: Money,
    pub bill_count: i64,
    pub bills: Vec<BillDay>,
}

/// Aggregates grouped bills into a summary. Pure; reads only its inputs.
pub fn summarize(range: DateRange, days: Vec<BillDay>) -> ReportSummary {
    let per_day_totals: Vec<DayTotal> = days
        .iter()
        .map(|day| DayTotal {
            date: day.date,
            bill_count: day.bills.len() as i64,
            total_sale_amount: day.bills.iter().map(|b| b.total_sale_amount).sum(),
        })
        .collect();

    ReportSummary {
        start_date: range.start(),
        end_date: range.end(),
        grand_total: per_day_totals.iter().map(|d| d.total_sale_amount).sum(),
        bill_count: per_day_totals.iter().map(|d| d.bill_count).sum(),
        per_day_totals,
        bills: days,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
