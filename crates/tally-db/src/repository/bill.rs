//! # Bill Store
//!
//! Write-once storage for bills and their lines.
//!
//! ## Bill Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bill Lifecycle                                   │
//! │                                                                         │
//! │  1. BUILD (checkout transaction, see checkout.rs)                      │
//! │     └── stock deducted, lines priced, receipt number assigned          │
//! │                                                                         │
//! │  2. INSERT (same transaction)                                          │
//! │     └── INSERT ... ON CONFLICT DO NOTHING                              │
//! │         ├── 1 row  → new bill, lines inserted                          │
//! │         └── 0 rows → same id already stored; the stored bill wins      │
//! │                                                                         │
//! │  3. READ (forever)                                                     │
//! │     └── get_by_id / query_by_date_range                                │
//! │                                                                         │
//! │  There is no UPDATE or DELETE on bills.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult, StoreResult};
use tally_core::report::{group_by_day, BillDay, DateRange};
use tally_core::validation::validate_bill_id;
use tally_core::{Bill, BillLine, CoreError, Money, ValidationError};

/// Header row of the `bills` table.
#[derive(Debug, FromRow)]
struct BillRow {
    id: String,
    receipt_number: String,
    created_at: DateTime<Utc>,
    customer_id: Option<String>,
    sold_by: Option<String>,
    total_sale_amount: Money,
}

impl BillRow {
    fn into_bill(self, lines: Vec<BillLine>) -> Bill {
        Bill {
            id: self.id,
            receipt_number: self.receipt_number,
            created_at: self.created_at,
            customer_id: self.customer_id,
            sold_by: self.sold_by,
            lines,
            total_sale_amount: self.total_sale_amount,
        }
    }
}

/// A line row together with the bill it belongs to.
#[derive(Debug, FromRow)]
struct BillLineRow {
    bill_id: String,
    #[sqlx(flatten)]
    line: BillLine,
}

const BILL_COLUMNS: &str =
    "id, receipt_number, created_at, customer_id, sold_by, total_sale_amount";

const LINE_COLUMNS: &str = r#"
    line_no,
    product_id,
    product_name,
    quantity_sold,
    price_sale_per_unit,
    price_sale_amount
"#;

/// Repository for bill database operations.
#[derive(Debug, Clone)]
pub struct BillStore {
    pool: SqlitePool,
}

impl BillStore {
    /// Creates a new BillStore.
    pub fn new(pool: SqlitePool) -> Self {
        BillStore { pool }
    }

    /// Stores a complete bill.
    ///
    /// Idempotent on `bill.id`: saving the same id again stores nothing and
    /// returns the id; the record written first is kept.
    ///
    /// A bill whose total differs from the sum of its lines is rejected.
    pub async fn save(&self, bill: &Bill) -> StoreResult<String> {
        if bill.lines_total() != bill.total_sale_amount {
            return Err(ValidationError::InvalidFormat {
                field: "totalSaleAmount".to_string(),
                reason: format!("{} does not equal the sum of the lines", bill.total_sale_amount),
            }
            .into());
        }

        let mut tx = self.pool.begin().await?;

        if insert_bill(&mut *tx, bill).await? {
            tx.commit().await?;
            info!(bill_id = %bill.id, receipt_number = %bill.receipt_number, "Bill saved");
        } else {
            tx.rollback().await?;
            debug!(bill_id = %bill.id, "Bill already stored, keeping existing record");
        }

        Ok(bill.id.clone())
    }

    /// Gets a bill with its lines.
    ///
    /// ## Returns
    /// * `Ok(Bill)` - Bill found
    /// * `Err(Rejected(BillNotFound))` - No such id
    pub async fn get_by_id(&self, bill_id: &str) -> StoreResult<Bill> {
        if validate_bill_id(bill_id).is_err() {
            // Anything that is not a UUID cannot name a stored bill.
            return Err(CoreError::BillNotFound(bill_id.to_string()).into());
        }

        let mut conn = self.pool.acquire().await?;
        fetch_bill(&mut *conn, bill_id)
            .await?
            .ok_or_else(|| CoreError::BillNotFound(bill_id.to_string()).into())
    }

    /// Bills created within `range` (local days at `utc_offset`), grouped by
    /// local day.
    pub async fn query_by_date_range(
        &self,
        range: DateRange,
        utc_offset: FixedOffset,
    ) -> DbResult<Vec<BillDay>> {
        let (from, until) = range.utc_bounds(utc_offset);
        debug!(from = %from, until = %until, "Querying bills by date range");

        let sql = format!(
            r#"
            SELECT {BILL_COLUMNS}
            FROM bills
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at, receipt_number
            "#
        );
        let headers: Vec<BillRow> = sqlx::query_as(&sql)
            .bind(from)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;

        let line_sql = format!(
            r#"
            SELECT bl.bill_id, {LINE_COLUMNS}
            FROM bill_lines bl
            JOIN bills b ON b.id = bl.bill_id
            WHERE b.created_at >= ?1 AND b.created_at < ?2
            ORDER BY bl.bill_id, bl.line_no
            "#
        );
        let line_rows: Vec<BillLineRow> = sqlx::query_as(&line_sql)
            .bind(from)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;

        let mut lines_by_bill: HashMap<String, Vec<BillLine>> = HashMap::new();
        for row in line_rows {
            lines_by_bill.entry(row.bill_id).or_default().push(row.line);
        }

        let bills: Vec<Bill> = headers
            .into_iter()
            .map(|header| {
                let lines = lines_by_bill.remove(&header.id).unwrap_or_default();
                header.into_bill(lines)
            })
            .collect();

        debug!(count = bills.len(), "Bills loaded for range");
        Ok(group_by_day(bills, utc_offset))
    }

    /// Counts stored bills (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bills")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Connection-scoped helpers (shared with the checkout transaction)
// =============================================================================

/// Inserts a bill and its lines. Returns `false` when a bill with the same
/// id already exists, in which case nothing was written.
///
/// A clash on the receipt number alone is an error.
pub(crate) async fn insert_bill(conn: &mut SqliteConnection, bill: &Bill) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO bills (
            id, receipt_number, bill_date, created_at,
            customer_id, sold_by, total_sale_amount
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(&bill.id)
    .bind(&bill.receipt_number)
    .bind(receipt_day(bill.created_at))
    .bind(bill.created_at)
    .bind(&bill.customer_id)
    .bind(&bill.sold_by)
    .bind(bill.total_sale_amount)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM bills WHERE id = ?1")
            .bind(&bill.id)
            .fetch_optional(&mut *conn)
            .await?;
        if exists.is_none() {
            return Err(DbError::duplicate("bills.receipt_number", &bill.receipt_number));
        }
        return Ok(false);
    }

    for line in &bill.lines {
        sqlx::query(
            r#"
            INSERT INTO bill_lines (
                bill_id, line_no, product_id, product_name,
                quantity_sold, price_sale_per_unit, price_sale_amount
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&bill.id)
        .bind(line.line_no)
        .bind(&line.product_id)
        .bind(&line.product_name)
        .bind(line.quantity_sold)
        .bind(line.price_sale_per_unit)
        .bind(line.price_sale_amount)
        .execute(&mut *conn)
        .await?;
    }

    Ok(true)
}

/// Loads a bill and its lines on the given connection.
pub(crate) async fn fetch_bill(conn: &mut SqliteConnection, bill_id: &str) -> DbResult<Option<Bill>> {
    let sql = format!("SELECT {BILL_COLUMNS} FROM bills WHERE id = ?1");
    let header: Option<BillRow> = sqlx::query_as(&sql)
        .bind(bill_id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(header) = header else {
        return Ok(None);
    };

    let line_sql = format!("SELECT {LINE_COLUMNS} FROM bill_lines WHERE bill_id = ?1 ORDER BY line_no");
    let lines: Vec<BillLine> = sqlx::query_as(&line_sql)
        .bind(bill_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(Some(header.into_bill(lines)))
}

/// Next receipt sequence number for a UTC day (1 for the first bill).
///
/// Must run while holding the write lock (inside the checkout transaction,
/// after the first stock update) so two bills never get the same number.
pub(crate) async fn next_receipt_sequence(conn: &mut SqliteConnection, day: NaiveDate) -> DbResult<i64> {
    let issued: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bills WHERE bill_date = ?1")
        .bind(day.format("%Y-%m-%d").to_string())
        .fetch_one(&mut *conn)
        .await?;
    Ok(issued + 1)
}

/// UTC day a bill's receipt number belongs to, as stored in `bill_date`.
fn receipt_day(created_at: DateTime<Utc>) -> String {
    created_at.date_naive().format("%Y-%m-%d").to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::{Database, DbConfig};
    use chrono::TimeZone;
    use tally_core::bill::generate_bill_id;
    use tally_core::report::offset_from_minutes;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn bill_at(receipt: &str, created_at: DateTime<Utc>, unit: i64, qty: i64) -> Bill {
        let amount = Money::from_minor(unit * qty);
        Bill {
            id: generate_bill_id(),
            receipt_number: receipt.to_string(),
            created_at,
            customer_id: None,
            sold_by: Some("clerk-1".to_string()),
            lines: vec![BillLine {
                line_no: 1,
                product_id: "p-1".to_string(),
                product_name: "Tea".to_string(),
                quantity_sold: qty,
                price_sale_per_unit: Money::from_minor(unit),
                price_sale_amount: amount,
            }],
            total_sale_amount: amount,
        }
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let db = test_db().await;
        let bill = bill_at("20261019-0001", Utc::now(), 100, 3);

        let id = db.bills().save(&bill).await.unwrap();
        assert_eq!(id, bill.id);

        let loaded = db.bills().get_by_id(&id).await.unwrap();
        assert_eq!(loaded.receipt_number, bill.receipt_number);
        assert_eq!(loaded.lines, bill.lines);
        assert_eq!(loaded.total_sale_amount, Money::from_minor(300));
        assert_eq!(loaded.sold_by.as_deref(), Some("clerk-1"));
    }

    #[tokio::test]
    async fn test_save_twice_keeps_one_record() {
        let db = test_db().await;
        let bill = bill_at("20261019-0001", Utc::now(), 100, 3);

        db.bills().save(&bill).await.unwrap();

        let mut retry = bill_at("20261019-0002", Utc::now(), 50, 1);
        retry.id = bill.id.clone();
        db.bills().save(&retry).await.unwrap();

        assert_eq!(db.bills().count().await.unwrap(), 1);
        let stored = db.bills().get_by_id(&bill.id).await.unwrap();
        assert_eq!(stored.receipt_number, "20261019-0001");
        assert_eq!(stored.total_sale_amount, Money::from_minor(300));
        assert_eq!(stored.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_save_rejects_total_that_disagrees_with_lines() {
        let db = test_db().await;
        let mut bill = bill_at("20261019-0001", Utc::now(), 300, 1);
        bill.total_sale_amount = Money::from_minor(1);

        let err = db.bills().save(&bill).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(CoreError::Validation(_))));
        assert_eq!(db.bills().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_unknown_bill() {
        let db = test_db().await;

        let err = db.bills().get_by_id(&generate_bill_id()).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(CoreError::BillNotFound(_))));

        let err = db.bills().get_by_id("not-a-uuid").await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(CoreError::BillNotFound(_))));
    }

    #[tokio::test]
    async fn test_query_by_date_range_groups_days() {
        let db = test_db().await;
        let d1_morning = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        let d1_evening = Utc.with_ymd_and_hms(2026, 10, 19, 18, 0, 0).unwrap();
        let d2 = Utc.with_ymd_and_hms(2026, 10, 20, 12, 0, 0).unwrap();
        let d3 = Utc.with_ymd_and_hms(2026, 10, 21, 12, 0, 0).unwrap();

        for bill in [
            bill_at("20261019-0002", d1_evening, 50, 2),
            bill_at("20261019-0001", d1_morning, 100, 1),
            bill_at("20261020-0001", d2, 250, 4),
            bill_at("20261021-0001", d3, 10, 1),
        ] {
            db.bills().save(&bill).await.unwrap();
        }

        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
        )
        .unwrap();
        let days = db
            .bills()
            .query_by_date_range(range, offset_from_minutes(0).unwrap())
            .await
            .unwrap();

        assert_eq!(days.len(), 2);
        let receipts: Vec<&str> = days[0].bills.iter().map(|b| b.receipt_number.as_str()).collect();
        assert_eq!(receipts, vec!["20261019-0001", "20261019-0002"]);
        assert_eq!(days[1].bills.len(), 1);
        assert_eq!(days[1].bills[0].lines[0].quantity_sold, 4);
    }

    #[tokio::test]
    async fn test_query_by_date_range_uses_offset() {
        let db = test_db().await;
        // 21:00 UTC on the 19th is already the 20th at UTC+05:00.
        let late = Utc.with_ymd_and_hms(2026, 10, 19, 21, 0, 0).unwrap();
        db.bills().save(&bill_at("20261019-0001", late, 100, 1)).await.unwrap();

        let oct20 = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let day20 = DateRange::new(oct20, oct20).unwrap();
        let local = db
            .bills()
            .query_by_date_range(day20, offset_from_minutes(300).unwrap())
            .await
            .unwrap();
        assert_eq!(local.len(), 1);

        let utc = db
            .bills()
            .query_by_date_range(day20, offset_from_minutes(0).unwrap())
            .await
            .unwrap();
        assert!(utc.is_empty());
    }

    #[tokio::test]
    async fn test_next_receipt_sequence() {
        let db = test_db().await;
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        let day = at.date_naive();

        let mut conn = db.pool().acquire().await.unwrap();
        assert_eq!(next_receipt_sequence(&mut *conn, day).await.unwrap(), 1);
        drop(conn);

        db.bills().save(&bill_at("20261019-0001", at, 1, 1)).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        assert_eq!(next_receipt_sequence(&mut *conn, day).await.unwrap(), 2);
    }
}
