//! Bill history.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::context::Ctx;
use crate::error::ApiResult;
use crate::state::AppState;
use tally_core::report::ReportSummary;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillQueryBody {
    pub start_date: String,
    pub end_date: Option<String>,
}

/// `POST /bills/query`: bills between two local dates, inclusive, grouped
/// by day. `endDate` defaults to `startDate`.
pub async fn query_bills(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    body: Result<Json<BillQueryBody>, JsonRejection>,
) -> ApiResult<Json<ReportSummary>> {
    let Json(body) = body?;
    debug!(
        request_id = %ctx.request_id,
        start = %body.start_date,
        end = ?body.end_date,
        "Bill history requested"
    );

    let summary = state
        .reports()
        .summarize(&body.start_date, body.end_date.as_deref())
        .await?;
    Ok(Json(summary))
}
