//! # Product Catalog
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Sellable listing for the sale screen (active products with stock)
//! - Admin add / update / deactivate
//! - Snapshot lookup used inside the checkout transaction
//!
//! ## Soft Delete
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Products are never removed. Deactivating one:                          │
//! │                                                                         │
//! │  • hides it from list_sellable()                                        │
//! │  • makes a cart line for it fail with UnknownProduct                    │
//! │  • keeps every existing BillLine pointing at a real row                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbResult, StoreResult};
use tally_core::bill::ProductSnapshot;
use tally_core::validation::{
    validate_price, validate_product_id, validate_product_name, validate_product_type,
    validate_stock_level,
};
use tally_core::{CoreError, NewProduct, Product, ProductUpdate, SellableProduct, StockEntry};

const PRODUCT_COLUMNS: &str = r#"
    id,
    name,
    product_type,
    price_sale,
    price_purchase,
    is_active,
    created_at,
    updated_at
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    pool: SqlitePool,
}

impl ProductCatalog {
    /// Creates a new ProductCatalog.
    pub fn new(pool: SqlitePool) -> Self {
        ProductCatalog { pool }
    }

    /// Gets a product by its ID, active or not.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Product found (check `is_active`)
    /// * `Err(Rejected(ProductNotFound))` - No such id
    pub async fn get_product(&self, id: &str) -> StoreResult<Product> {
        validate_product_id(id)?;

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product: Option<Product> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        product.ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Lists every active product with its stock level and sale price,
    /// ordered by name.
    pub async fn list_sellable(&self) -> DbResult<Vec<SellableProduct>> {
        let products: Vec<SellableProduct> = sqlx::query_as(
            r#"
            SELECT
                p.id AS product_id,
                p.name,
                p.product_type,
                p.price_sale,
                COALESCE(s.available_quantity, 0) AS available_quantity
            FROM products p
            LEFT JOIN stock s ON s.product_id = p.id
            WHERE p.is_active = 1
            ORDER BY p.name, p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed sellable products");
        Ok(products)
    }

    /// Adds a product together with its opening stock.
    ///
    /// Both rows are written in one transaction; a product never exists
    /// without a stock entry.
    pub async fn add_product(&self, input: &NewProduct) -> StoreResult<(Product, StockEntry)> {
        let name = validate_product_name(&input.name)?;
        let product_type = validate_product_type(input.product_type.as_deref())?;
        validate_price("priceSale", input.price_sale)?;
        validate_price("pricePurchase", input.price_purchase)?;
        validate_stock_level(input.quantity)?;

        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            name,
            product_type,
            price_sale: input.price_sale,
            price_purchase: input.price_purchase,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let stock = StockEntry {
            product_id: product.id.clone(),
            available_quantity: input.quantity,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, product_type, price_sale, price_purchase,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.product_type)
        .bind(product.price_sale)
        .bind(product.price_purchase)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO stock (product_id, available_quantity, updated_at) VALUES (?1, ?2, ?3)",
        )
        .bind(&stock.product_id)
        .bind(stock.available_quantity)
        .bind(stock.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id = %product.id, quantity = stock.available_quantity, "Product added");
        Ok((product, stock))
    }

    /// Updates name, category and prices of a product.
    ///
    /// Existing bills are unaffected: their lines carry snapshots.
    pub async fn update_product(&self, id: &str, update: &ProductUpdate) -> StoreResult<Product> {
        validate_product_id(id)?;
        let name = validate_product_name(&update.name)?;
        let product_type = validate_product_type(update.product_type.as_deref())?;
        validate_price("priceSale", update.price_sale)?;
        validate_price("pricePurchase", update.price_purchase)?;

        debug!(id = %id, "Updating product");

        let sql = format!(
            r#"
            UPDATE products SET
                name = ?2,
                product_type = ?3,
                price_sale = ?4,
                price_purchase = ?5,
                updated_at = ?6
            WHERE id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let product: Option<Product> = sqlx::query_as(&sql)
            .bind(id)
            .bind(&name)
            .bind(&product_type)
            .bind(update.price_sale)
            .bind(update.price_purchase)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        product.ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Soft-deletes a product. Deactivating twice is not an error.
    pub async fn deactivate(&self, id: &str) -> StoreResult<()> {
        validate_product_id(id)?;
        debug!(id = %id, "Deactivating product");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET
                updated_at = CASE WHEN is_active = 1 THEN ?2 ELSE updated_at END,
                is_active = 0
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        info!(id = %id, "Product deactivated");
        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Reads the authoritative name and sale price of an active product on the
/// given connection (typically inside the checkout transaction).
pub(crate) async fn fetch_snapshot(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> DbResult<Option<ProductSnapshot>> {
    let snapshot: Option<ProductSnapshot> = sqlx::query_as(
        r#"
        SELECT id AS product_id, name, price_sale
        FROM products
        WHERE id = ?1 AND is_active = 1
        "#,
    )
    .bind(product_id)
    .fetch_optional(conn)
    .await?;

    Ok(snapshot)
}

/// Generates a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::{Database, DbConfig};
    use tally_core::Money;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_product(name: &str, price: i64, quantity: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            product_type: Some("Grocery".to_string()),
            price_sale: Money::from_minor(price),
            price_purchase: Money::from_minor(price / 2),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_add_and_get_product() {
        let db = test_db().await;
        let (product, stock) = db
            .catalog()
            .add_product(&new_product("  Tea 250g ", 100, 5))
            .await
            .unwrap();

        assert_eq!(product.name, "Tea 250g");
        assert!(product.is_active);
        assert_eq!(stock.available_quantity, 5);

        let loaded = db.catalog().get_product(&product.id).await.unwrap();
        assert_eq!(loaded.id, product.id);
        assert_eq!(loaded.price_sale, Money::from_minor(100));
        assert_eq!(loaded.product_type.as_deref(), Some("Grocery"));
        assert_eq!(db.catalog().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_add_product_rejects_invalid_input() {
        let db = test_db().await;

        let err = db
            .catalog()
            .add_product(&new_product("", 100, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(CoreError::Validation(_))));

        let err = db
            .catalog()
            .add_product(&new_product("Tea", -1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(CoreError::Validation(_))));

        let err = db
            .catalog()
            .add_product(&new_product("Tea", 100, -3))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(CoreError::Validation(_))));

        assert_eq!(db.catalog().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_unknown_product() {
        let db = test_db().await;
        let err = db.catalog().get_product("missing").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Rejected(CoreError::ProductNotFound(id)) if id == "missing"
        ));
    }

    #[tokio::test]
    async fn test_list_sellable_orders_by_name_and_hides_inactive() {
        let db = test_db().await;
        let catalog = db.catalog();
        let (sugar, _) = catalog.add_product(&new_product("Sugar", 250, 10)).await.unwrap();
        let (apple, _) = catalog.add_product(&new_product("Apple", 50, 0)).await.unwrap();
        let (gone, _) = catalog.add_product(&new_product("Biscuit", 30, 4)).await.unwrap();
        catalog.deactivate(&gone.id).await.unwrap();

        let sellable = catalog.list_sellable().await.unwrap();
        let ids: Vec<&str> = sellable.iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids, vec![apple.id.as_str(), sugar.id.as_str()]);
        assert_eq!(sellable[1].available_quantity, 10);
        assert_eq!(sellable[1].price_sale, Money::from_minor(250));
    }

    #[tokio::test]
    async fn test_update_product() {
        let db = test_db().await;
        let (product, _) = db.catalog().add_product(&new_product("Tea", 100, 1)).await.unwrap();

        let updated = db
            .catalog()
            .update_product(
                &product.id,
                &ProductUpdate {
                    name: "Tea 500g".to_string(),
                    product_type: None,
                    price_sale: Money::from_minor(180),
                    price_purchase: Money::from_minor(120),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Tea 500g");
        assert_eq!(updated.product_type, None);
        assert_eq!(updated.price_sale, Money::from_minor(180));
        assert!(updated.updated_at >= product.updated_at);

        let err = db
            .catalog()
            .update_product(
                "nope",
                &ProductUpdate {
                    name: "X".to_string(),
                    product_type: None,
                    price_sale: Money::zero(),
                    price_purchase: Money::zero(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(CoreError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_deactivate_is_idempotent() {
        let db = test_db().await;
        let (product, _) = db.catalog().add_product(&new_product("Tea", 100, 1)).await.unwrap();

        db.catalog().deactivate(&product.id).await.unwrap();
        db.catalog().deactivate(&product.id).await.unwrap();

        let loaded = db.catalog().get_product(&product.id).await.unwrap();
        assert!(!loaded.is_active);
        assert_eq!(db.catalog().count().await.unwrap(), 0);

        assert!(db.catalog().deactivate("missing").await.is_err());
    }
}
