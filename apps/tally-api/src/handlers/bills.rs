//! # Bill Handlers
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /bills                                                            │
//! │  { "cart": [{ "productId": "p-1", "quantitySale": 3 }],                │
//! │    "billId": "…optional idempotency key…", "customerId": "…" }         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BillBuilder::build(ctx, request)                                      │
//! │       │                                                                 │
//! │       ├── created  ──► 201 { billId, receiptNumber, totalSaleAmount }  │
//! │       ├── replayed ──► 200 { same body as the first response }         │
//! │       └── refused  ──► 4xx { errorKind, message, productId?, … }       │
//! │                                                                         │
//! │  No price is read from the request. A client that did not get an       │
//! │  answer can resend the same billId safely.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::Ctx;
use crate::error::ApiResult;
use crate::state::AppState;
use tally_core::bill::BillRequest;
use tally_core::receipt::render_receipt;
use tally_core::{Bill, CartLine, Money};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineBody {
    pub product_id: String,
    pub quantity_sale: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillBody {
    #[serde(default)]
    pub cart: Vec<CartLineBody>,
    pub bill_id: Option<String>,
    pub customer_id: Option<String>,
}

impl From<CreateBillBody> for BillRequest {
    fn from(body: CreateBillBody) -> Self {
        BillRequest {
            cart: body
                .cart
                .into_iter()
                .map(|line| CartLine::new(line.product_id, line.quantity_sale))
                .collect(),
            bill_id: body.bill_id,
            customer_id: body.customer_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBill {
    pub bill_id: String,
    pub receipt_number: String,
    pub total_sale_amount: Money,
}

impl From<&Bill> for CreatedBill {
    fn from(bill: &Bill) -> Self {
        CreatedBill {
            bill_id: bill.id.clone(),
            receipt_number: bill.receipt_number.clone(),
            total_sale_amount: bill.total_sale_amount,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /bills`
pub async fn create_bill(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    body: Result<Json<CreateBillBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedBill>)> {
    let Json(body) = body?;
    debug!(request_id = %ctx.request_id, lines = body.cart.len(), "Bill requested");

    let request = BillRequest::from(body);
    let outcome = state.db.bill_builder().build(&ctx, &request).await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(CreatedBill::from(&outcome.bill))))
}

/// `GET /bills/{billId}`
pub async fn get_bill(
    State(state): State<AppState>,
    Path(bill_id): Path<String>,
) -> ApiResult<Json<Bill>> {
    let bill = state.db.bills().get_by_id(&bill_id).await?;
    Ok(Json(bill))
}

/// `GET /bills/{billId}/receipt`: printable plain text.
pub async fn get_receipt(
    State(state): State<AppState>,
    Path(bill_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let bill = state.db.bills().get_by_id(&bill_id).await?;
    let text = render_receipt(&bill, &state.receipt_layout);
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_maps_quantity_sale() {
        let body: CreateBillBody = serde_json::from_str(
            r#"{"cart":[{"productId":"p-1","quantitySale":3}],"customerId":"c-9"}"#,
        )
        .unwrap();
        let request = BillRequest::from(body);

        assert_eq!(request.cart, vec![CartLine::new("p-1", 3)]);
        assert_eq!(request.customer_id.as_deref(), Some("c-9"));
        assert!(request.bill_id.is_none());
    }

    #[test]
    fn test_missing_cart_is_empty() {
        let body: CreateBillBody = serde_json::from_str("{}").unwrap();
        assert!(BillRequest::from(body).cart.is_empty());
    }
}
