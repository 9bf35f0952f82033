//! # Stock Ledger
//!
//! The only code that writes `stock.available_quantity`.
//!
//! ## Conditional Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Why One Statement?                                   │
//! │                                                                         │
//! │  ❌ WRONG: read, check, then write                                      │
//! │     SELECT available  → 1          (request A)                          │
//! │     SELECT available  → 1          (request B)                          │
//! │     UPDATE available = 0           (A)                                  │
//! │     UPDATE available = 0           (B)  ← two units sold, one in stock  │
//! │                                                                         │
//! │  ✅ CORRECT: check and write in one UPDATE                              │
//! │     UPDATE stock SET available = available - q                          │
//! │     WHERE product_id = ? AND available >= q                             │
//! │                                                                         │
//! │  SQLite serializes writers, so the WHERE clause always sees the         │
//! │  latest committed value. 0 rows affected = refused.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::StoreResult;
use tally_core::validation::{validate_product_id, validate_receive_quantity, validate_stock_level};
use tally_core::{CoreError, StockEntry};

/// Repository for stock levels.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    /// Creates a new StockLedger.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Atomically removes `quantity` units of an active product.
    ///
    /// ## Returns
    /// * `Ok(StockEntry)` - The new level
    /// * `Err(Rejected(UnknownProduct))` - No such product, or inactive
    /// * `Err(Rejected(InsufficientStock))` - Fewer than `quantity` units left
    ///
    /// Stock is unchanged on error.
    pub async fn reserve_and_deduct(&self, product_id: &str, quantity: i64) -> StoreResult<StockEntry> {
        let mut conn = self.pool.acquire().await?;
        deduct(&mut *conn, product_id, quantity).await
    }

    /// Current stock level of a product.
    pub async fn get(&self, product_id: &str) -> StoreResult<StockEntry> {
        validate_product_id(product_id)?;

        let entry: Option<StockEntry> = sqlx::query_as(
            "SELECT product_id, available_quantity, updated_at FROM stock WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        entry.ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()).into())
    }

    /// Sets an absolute stock level (after a physical count).
    pub async fn set_available(&self, product_id: &str, quantity: i64) -> StoreResult<StockEntry> {
        validate_product_id(product_id)?;
        validate_stock_level(quantity)?;

        debug!(product_id = %product_id, quantity = quantity, "Setting stock level");

        let entry: Option<StockEntry> = sqlx::query_as(
            r#"
            UPDATE stock
            SET available_quantity = ?2, updated_at = ?3
            WHERE product_id = ?1
            RETURNING product_id, available_quantity, updated_at
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        let entry = entry.ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
        info!(product_id = %product_id, available = entry.available_quantity, "Stock level set");
        Ok(entry)
    }

    /// Adds received goods to the current level.
    pub async fn receive(&self, product_id: &str, quantity: i64) -> StoreResult<StockEntry> {
        validate_product_id(product_id)?;
        validate_receive_quantity(quantity)?;

        debug!(product_id = %product_id, quantity = quantity, "Receiving stock");

        let entry: Option<StockEntry> = sqlx::query_as(
            r#"
            UPDATE stock
            SET available_quantity = available_quantity + ?2, updated_at = ?3
            WHERE product_id = ?1
            RETURNING product_id, available_quantity, updated_at
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        let entry = entry.ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
        info!(product_id = %product_id, available = entry.available_quantity, "Stock received");
        Ok(entry)
    }
}

/// Conditional decrement on an explicit connection.
///
/// Inside a transaction, a refusal leaves earlier deductions of the same
/// transaction in place; the caller rolls back to undo them.
pub(crate) async fn deduct(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> StoreResult<StockEntry> {
    if quantity <= 0 {
        return Err(CoreError::InvalidQuantity {
            product_id: product_id.to_string(),
            quantity,
        }
        .into());
    }

    let entry: Option<StockEntry> = sqlx::query_as(
        r#"
        UPDATE stock
        SET available_quantity = available_quantity - ?2, updated_at = ?3
        WHERE product_id = ?1
          AND available_quantity >= ?2
          AND EXISTS (
              SELECT 1 FROM products p
              WHERE p.id = stock.product_id AND p.is_active = 1
          )
        RETURNING product_id, available_quantity, updated_at
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(entry) = entry {
        debug!(
            product_id = %product_id,
            quantity = quantity,
            available = entry.available_quantity,
            "Stock deducted"
        );
        return Ok(entry);
    }

    // Refused: tell the caller why.
    let available: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT s.available_quantity
        FROM stock s
        JOIN products p ON p.id = s.product_id
        WHERE s.product_id = ?1 AND p.is_active = 1
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    let err = match available {
        Some(available) => CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            available,
            requested: quantity,
        },
        None => CoreError::UnknownProduct(product_id.to_string()),
    };
    warn!(product_id = %product_id, error = %err, "Stock deduction refused");
    Err(err.into())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::{Database, DbConfig};
    use tally_core::{Money, NewProduct};

    async fn setup(quantity: i64) -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (product, _) = db
            .catalog()
            .add_product(&NewProduct {
                name: "Tea".to_string(),
                product_type: None,
                price_sale: Money::from_minor(100),
                price_purchase: Money::from_minor(60),
                quantity,
            })
            .await
            .unwrap();
        (db, product.id)
    }

    #[tokio::test]
    async fn test_deduct_within_stock() {
        let (db, id) = setup(5).await;
        let entry = db.stock().reserve_and_deduct(&id, 3).await.unwrap();
        assert_eq!(entry.available_quantity, 2);
        assert_eq!(db.stock().get(&id).await.unwrap().available_quantity, 2);
    }

    #[tokio::test]
    async fn test_deduct_exact_stock_to_zero() {
        let (db, id) = setup(4).await;
        let entry = db.stock().reserve_and_deduct(&id, 4).await.unwrap();
        assert_eq!(entry.available_quantity, 0);
    }

    #[tokio::test]
    async fn test_deduct_insufficient_leaves_stock() {
        let (db, id) = setup(2).await;
        let err = db.stock().reserve_and_deduct(&id, 5).await.unwrap_err();
        match err {
            StoreError::Rejected(CoreError::InsufficientStock {
                product_id,
                available,
                requested,
            }) => {
                assert_eq!(product_id, id);
                assert_eq!(available, 2);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(db.stock().get(&id).await.unwrap().available_quantity, 2);
    }

    #[tokio::test]
    async fn test_deduct_unknown_or_inactive_product() {
        let (db, id) = setup(5).await;

        let err = db.stock().reserve_and_deduct("ghost", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(CoreError::UnknownProduct(_))));

        db.catalog().deactivate(&id).await.unwrap();
        let err = db.stock().reserve_and_deduct(&id, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(CoreError::UnknownProduct(_))));
        assert_eq!(db.stock().get(&id).await.unwrap().available_quantity, 5);
    }

    #[tokio::test]
    async fn test_deduct_rejects_non_positive_quantity() {
        let (db, id) = setup(5).await;
        let err = db.stock().reserve_and_deduct(&id, 0).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(CoreError::InvalidQuantity { .. })));
    }

    #[tokio::test]
    async fn test_set_and_receive() {
        let (db, id) = setup(5).await;

        let entry = db.stock().set_available(&id, 12).await.unwrap();
        assert_eq!(entry.available_quantity, 12);

        let entry = db.stock().receive(&id, 8).await.unwrap();
        assert_eq!(entry.available_quantity, 20);

        assert!(db.stock().set_available(&id, -1).await.is_err());
        assert!(db.stock().receive(&id, 0).await.is_err());
        assert!(matches!(
            db.stock().receive("ghost", 1).await.unwrap_err(),
            StoreError::Rejected(CoreError::ProductNotFound(_))
        ));
    }
}
