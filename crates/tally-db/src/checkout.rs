//! # Checkout
//!
//! Turns a cart into a stored bill, with stock deduction and bill insertion
//! committed together or not at all.
//!
//! ## Transaction Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BillBuilder::build(ctx, request)                                       │
//! │                                                                         │
//! │  request.normalized()            pure checks, no I/O                   │
//! │       │                                                                 │
//! │  billId already stored? ───────► return it (replayed, no stock change) │
//! │       │                                                                 │
//! │  BEGIN                                                                 │
//! │  ├── for each line: conditional decrement     ← takes the write lock   │
//! │  │        └── refused? ROLLBACK (undoes earlier lines), return error   │
//! │  ├── read name + sale price of each product   ← never from request     │
//! │  ├── price_lines()  (tally-core)                                       │
//! │  ├── next receipt number for today                                     │
//! │  └── INSERT bill ON CONFLICT DO NOTHING                                │
//! │           └── 0 rows? ROLLBACK, return the stored bill (replayed)      │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock update is the first statement of the transaction, so SQLite
//! grants the write lock before anything is read; the reads that follow
//! can never observe a snapshot that is older than a concurrent commit.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::repository::bill::{fetch_bill, insert_bill, next_receipt_sequence};
use crate::repository::product::fetch_snapshot;
use crate::repository::stock::deduct;
use tally_core::bill::{
    format_receipt_number, generate_bill_id, price_lines, BillHeader, BillRequest,
};
use tally_core::{Bill, CoreError, RequestContext};

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillOutcome {
    pub bill: Bill,

    /// `false` when the request replayed a bill id that was already stored;
    /// no stock was deducted in that case.
    pub created: bool,
}

/// Builds bills from carts.
#[derive(Debug, Clone)]
pub struct BillBuilder {
    pool: SqlitePool,
}

impl BillBuilder {
    /// Creates a new BillBuilder.
    pub fn new(pool: SqlitePool) -> Self {
        BillBuilder { pool }
    }

    /// Validates the cart, deducts stock and stores the bill atomically.
    ///
    /// ## Errors
    /// * `Rejected(EmptyCart | InvalidQuantity | CartTooLarge | Validation)` - before any I/O
    /// * `Rejected(UnknownProduct)` - product missing or inactive
    /// * `Rejected(InsufficientStock)` - not enough units for a line
    /// * `Persistence(_)` - database failure; nothing was changed
    pub async fn build(&self, ctx: &RequestContext, request: &BillRequest) -> StoreResult<BillOutcome> {
        let request = request.normalized().inspect_err(|err| {
            warn!(request_id = %ctx.request_id, error = %err, "Bill request rejected");
        })?;

        if let Some(bill_id) = &request.bill_id {
            let mut conn = self.pool.acquire().await?;
            if let Some(bill) = fetch_bill(&mut *conn, bill_id).await? {
                info!(request_id = %ctx.request_id, bill_id = %bill.id, "Replayed existing bill");
                return Ok(BillOutcome {
                    bill,
                    created: false,
                });
            }
        }

        match self.run_transaction(ctx, &request).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                match &err {
                    StoreError::Rejected(reason) => {
                        warn!(request_id = %ctx.request_id, error = %reason, "Checkout refused");
                    }
                    StoreError::Persistence(db_err) => {
                        error!(request_id = %ctx.request_id, error = %db_err, "Checkout failed");
                    }
                }
                Err(err)
            }
        }
    }

    async fn run_transaction(&self, ctx: &RequestContext, request: &BillRequest) -> StoreResult<BillOutcome> {
        let mut tx = self.pool.begin().await?;

        // An early return drops `tx`, which rolls back every deduction
        // already applied for this request.
        for line in &request.cart {
            deduct(&mut *tx, &line.product_id, line.quantity).await?;
        }

        let mut snapshots = Vec::with_capacity(request.cart.len());
        for line in &request.cart {
            let snapshot = fetch_snapshot(&mut *tx, &line.product_id)
                .await?
                .ok_or_else(|| CoreError::UnknownProduct(line.product_id.clone()))?;
            snapshots.push(snapshot);
        }
        let priced = price_lines(&request.cart, &snapshots)?;

        let created_at = Utc::now();
        let sequence = next_receipt_sequence(&mut *tx, created_at.date_naive()).await?;
        let bill = priced.into_bill(BillHeader {
            id: request.bill_id.clone().unwrap_or_else(generate_bill_id),
            receipt_number: format_receipt_number(created_at.date_naive(), sequence),
            created_at,
            customer_id: request.customer_id.clone(),
            sold_by: ctx.principal.clone(),
        });

        if !insert_bill(&mut *tx, &bill).await? {
            // A concurrent request with the same bill id committed first.
            let existing = fetch_bill(&mut *tx, &bill.id).await?;
            tx.rollback().await?;
            let existing = existing.ok_or_else(|| CoreError::BillNotFound(bill.id.clone()))?;
            debug!(request_id = %ctx.request_id, bill_id = %existing.id, "Lost insert race, replaying");
            return Ok(BillOutcome {
                bill: existing,
                created: false,
            });
        }

        tx.commit().await?;

        info!(
            request_id = %ctx.request_id,
            bill_id = %bill.id,
            receipt_number = %bill.receipt_number,
            lines = bill.lines.len(),
            total = %bill.total_sale_amount,
            "Bill generated"
        );

        Ok(BillOutcome {
            bill,
            created: true,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
