//! # HTTP Handlers
//!
//! ## Handler Organization
//! ```text
//! handlers/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── health.rs    ◄─── Liveness + database check
//! ├── products.rs  ◄─── Sale listing, admin product CRUD
//! ├── stock.rs     ◄─── Admin stock count / delivery
//! ├── bills.rs     ◄─── Checkout, bill lookup, receipt text
//! └── reports.rs   ◄─── Bill history by date range
//! ```
//!
//! ## How Handlers Work
//! Each handler takes only the extractors it needs:
//! ```rust,ignore
//! // Reads only
//! async fn get_bill(State(state): State<AppState>, Path(bill_id): Path<String>)
//!
//! // Writes: also takes the request context for logging and auditing
//! async fn create_bill(State(state): State<AppState>, Ctx(ctx): Ctx, body: ...)
//! ```
//! JSON bodies are taken as `Result<Json<T>, JsonRejection>` so malformed
//! input comes back in the same error shape as every other failure.

pub mod bills;
pub mod health;
pub mod products;
pub mod reports;
pub mod stock;
