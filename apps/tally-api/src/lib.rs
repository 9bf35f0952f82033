//! # Tally API
//!
//! REST server for the Tally POS core.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tally API Routes                                │
//! │                                                                         │
//! │  ┌────────────────────────┐  ┌──────────────────────────────────────┐  │
//! │  │  Products              │  │  Bills                               │  │
//! │  │                        │  │                                      │  │
//! │  │ • GET    /products     │  │ • POST /bills            (checkout)  │  │
//! │  │ • POST   /products     │  │ • GET  /bills/{id}                   │  │
//! │  │ • GET    /products/{id}│  │ • GET  /bills/{id}/receipt           │  │
//! │  │ • PUT    /products/{id}│  │ • POST /bills/query      (history)   │  │
//! │  │ • DELETE /products/{id}│  │                                      │  │
//! │  │ • PUT    …/{id}/stock  │  └──────────────────────────────────────┘  │
//! │  │ • POST   …/stock/receive│                                           │
//! │  └────────────────────────┘  • GET /health                             │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  tally-db: ProductCatalog, StockLedger, BillBuilder,             │  │
//! │  │            BillStore, ReportingQuery  (SQLite)                    │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::ApiConfig`]):
//! - `TALLY_HTTP_PORT` - HTTP port (default: 8080)
//! - `TALLY_BIND_ADDR` - Interface to bind (default: 0.0.0.0)
//! - `TALLY_DB_PATH` - SQLite file (default: ./tally.db)
//! - `TALLY_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `TALLY_STORE_NAME` - Receipt header
//! - `TALLY_CURRENCY_SYMBOL` - Receipt currency prefix (default: Rs.)
//! - `TALLY_REPORT_UTC_OFFSET_MINUTES` - Shop time zone offset (default: 0)
//! - `TALLY_RECEIPT_WIDTH` - Receipt columns (default: 42)

pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{bills, health, products, reports, stock};

// Re-exports
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorKind};
pub use state::AppState;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/{product_id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/{product_id}/stock", put(stock::set_stock))
        .route(
            "/products/{product_id}/stock/receive",
            post(stock::receive_stock),
        )
        .route("/bills", post(bills::create_bill))
        .route("/bills/query", post(reports::query_bills))
        .route("/bills/{bill_id}", get(bills::get_bill))
        .route("/bills/{bill_id}/receipt", get(bills::get_receipt))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
