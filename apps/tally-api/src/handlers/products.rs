//! # Product Handlers
//!
//! Catalog reads for the sale screen and the admin product actions.
//!
//! ## Sale Screen Listing
//! ```text
//! GET /products
//! {
//!   "products": [{ "productId", "productName", "productType" }],
//!   "stock":    [{ "productId", "availableQuantity" }],
//!   "price":    [{ "productId", "priceSale" }]
//! }
//! ```
//! Three parallel arrays, one entry per sellable product, in the same
//! order (by name). Deactivated products are left out. The listing is a
//! hint only: checkout re-checks stock and reads prices itself.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::Ctx;
use crate::error::ApiResult;
use crate::state::AppState;
use tally_core::{Money, NewProduct, Product, ProductUpdate, SellableProduct, StockEntry};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<ProductItem>,
    pub stock: Vec<StockItem>,
    pub price: Vec<PriceItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductItem {
    pub product_id: String,
    pub product_name: String,
    pub product_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub product_id: String,
    pub available_quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceItem {
    pub product_id: String,
    pub price_sale: Money,
}

impl From<Vec<SellableProduct>> for ProductListResponse {
    fn from(rows: Vec<SellableProduct>) -> Self {
        let mut response = ProductListResponse {
            products: Vec::with_capacity(rows.len()),
            stock: Vec::with_capacity(rows.len()),
            price: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            response.stock.push(StockItem {
                product_id: row.product_id.clone(),
                available_quantity: row.available_quantity,
            });
            response.price.push(PriceItem {
                product_id: row.product_id.clone(),
                price_sale: row.price_sale,
            });
            response.products.push(ProductItem {
                product_id: row.product_id,
                product_name: row.name,
                product_type: row.product_type,
            });
        }
        response
    }
}

/// Admin view of one product, stock included.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub product_id: String,
    pub product_name: String,
    pub product_type: Option<String>,
    pub price_sale: Money,
    pub price_purchase: Money,
    pub available_quantity: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductView {
    fn new(product: Product, stock: &StockEntry) -> Self {
        ProductView {
            product_id: product.id,
            product_name: product.name,
            product_type: product.product_type,
            price_sale: product.price_sale,
            price_purchase: product.price_purchase,
            available_quantity: stock.available_quantity,
            is_active: product.is_active,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductBody {
    pub product_name: String,
    pub product_type: Option<String>,
    pub price_sale: Money,
    pub price_purchase: Money,
    #[serde(default)]
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductBody {
    pub product_name: String,
    pub product_type: Option<String>,
    pub price_sale: Money,
    pub price_purchase: Money,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /products`
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<ProductListResponse>> {
    let rows = state.db.catalog().list_sellable().await?;
    debug!(count = rows.len(), "Listing sellable products");
    Ok(Json(ProductListResponse::from(rows)))
}

/// `POST /products`
pub async fn create_product(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    body: Result<Json<CreateProductBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ProductView>)> {
    let Json(body) = body?;
    debug!(request_id = %ctx.request_id, name = %body.product_name, "Creating product");

    let (product, stock) = state
        .db
        .catalog()
        .add_product(&NewProduct {
            name: body.product_name,
            product_type: body.product_type,
            price_sale: body.price_sale,
            price_purchase: body.price_purchase,
            quantity: body.quantity,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ProductView::new(product, &stock))))
}

/// `GET /products/{productId}`
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<ProductView>> {
    let product = state.db.catalog().get_product(&product_id).await?;
    let stock = state.db.stock().get(&product_id).await?;
    Ok(Json(ProductView::new(product, &stock)))
}

/// `PUT /products/{productId}`
///
/// Bills already issued keep the name and price they were sold at.
pub async fn update_product(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(product_id): Path<String>,
    body: Result<Json<UpdateProductBody>, JsonRejection>,
) -> ApiResult<Json<ProductView>> {
    let Json(body) = body?;
    debug!(request_id = %ctx.request_id, product_id = %product_id, "Updating product");

    let product = state
        .db
        .catalog()
        .update_product(
            &product_id,
            &ProductUpdate {
                name: body.product_name,
                product_type: body.product_type,
                price_sale: body.price_sale,
                price_purchase: body.price_purchase,
            },
        )
        .await?;
    let stock = state.db.stock().get(&product_id).await?;

    Ok(Json(ProductView::new(product, &stock)))
}

/// `DELETE /products/{productId}`: deactivates, never removes.
pub async fn delete_product(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(product_id): Path<String>,
) -> ApiResult<StatusCode> {
    debug!(request_id = %ctx.request_id, product_id = %product_id, "Deactivating product");
    state.db.catalog().deactivate(&product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
