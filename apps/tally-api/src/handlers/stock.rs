//! Admin stock actions. Sales never come through here; they deduct stock
//! inside the checkout transaction.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::context::Ctx;
use crate::error::ApiResult;
use crate::state::AppState;
use tally_core::StockEntry;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStockBody {
    pub available_quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveStockBody {
    pub quantity: i64,
}

/// `PUT /products/{productId}/stock`: absolute level after a count.
pub async fn set_stock(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(product_id): Path<String>,
    body: Result<Json<SetStockBody>, JsonRejection>,
) -> ApiResult<Json<StockEntry>> {
    let Json(body) = body?;
    debug!(request_id = %ctx.request_id, product_id = %product_id, "Setting stock");

    let entry = state
        .db
        .stock()
        .set_available(&product_id, body.available_quantity)
        .await?;
    Ok(Json(entry))
}

/// `POST /products/{productId}/stock/receive`: adds delivered units.
pub async fn receive_stock(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    Path(product_id): Path<String>,
    body: Result<Json<ReceiveStockBody>, JsonRejection>,
) -> ApiResult<Json<StockEntry>> {
    let Json(body) = body?;
    debug!(request_id = %ctx.request_id, product_id = %product_id, "Receiving stock");

    let entry = state.db.stock().receive(&product_id, body.quantity).await?;
    Ok(Json(entry))
}
