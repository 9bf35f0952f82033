//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally API                              │
//! │                                                                         │
//! │  Handler: Result<T, ApiError>                                          │
//! │       │                                                                 │
//! │       ├── StoreError::Rejected(CoreError) ──► 400 / 404 / 409          │
//! │       │     (business rule; details returned to the client)            │
//! │       │                                                                 │
//! │       ├── StoreError::Persistence(DbError) ──► 503 / 500               │
//! │       │     (logged with error!, generic message returned)             │
//! │       │                                                                 │
//! │       └── JsonRejection ──────────────────────► 400                     │
//! │                                                                         │
//! │  Client receives:                                                      │
//! │  {                                                                      │
//! │    "errorKind": "INSUFFICIENT_STOCK",                                   │
//! │    "message": "Insufficient stock for p-1: 2 available, 5 requested",   │
//! │    "productId": "p-1", "available": 2, "requested": 5                   │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tally_core::{CoreError, ValidationError};
use tally_db::{DbError, StoreError};

/// API error returned from handlers.
///
/// ## Serialization
/// This is what the client receives when a request fails:
/// ```json
/// {
///   "errorKind": "UNKNOWN_PRODUCT",
///   "message": "Unknown product: p-42",
///   "productId": "p-42"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,

    /// Machine-readable error kind for programmatic handling
    pub error_kind: ErrorKind,

    /// Human-readable error message for display
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<i64>,
}

/// Error kinds for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Field-level input problem (400)
    ValidationError,

    /// Body is not valid JSON for the endpoint (400)
    MalformedRequest,

    /// Cart has no lines (400)
    EmptyCart,

    /// Line quantity outside 1..=999 (400)
    InvalidQuantity,

    /// Too many distinct lines (400)
    CartTooLarge,

    /// Line amount does not fit the money type (400)
    AmountOverflow,

    /// Cart references a missing or inactive product (404)
    UnknownProduct,

    /// Not enough stock for a line (409)
    InsufficientStock,

    /// Product id does not exist (404)
    ProductNotFound,

    /// Bill id does not exist (404)
    BillNotFound,

    /// A row the operation expected is gone (404)
    NotFound,

    /// Write clashed with an existing record (409)
    Conflict,

    /// Database unreachable or pool exhausted (503)
    ServiceUnavailable,

    /// Database operation failed (500)
    DatabaseError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, error_kind: ErrorKind, message: impl Into<String>) -> Self {
        ApiError {
            status,
            error_kind,
            message: message.into(),
            product_id: None,
            available: None,
            requested: None,
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, ErrorKind::ValidationError, message)
    }

    fn with_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }
}

/// Converts business rule failures to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::EmptyCart => {
                ApiError::new(StatusCode::BAD_REQUEST, ErrorKind::EmptyCart, message)
            }
            CoreError::InvalidQuantity { product_id, .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, ErrorKind::InvalidQuantity, message)
                    .with_product(product_id)
            }
            CoreError::CartTooLarge { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, ErrorKind::CartTooLarge, message)
            }
            CoreError::AmountOverflow { product_id } => {
                ApiError::new(StatusCode::BAD_REQUEST, ErrorKind::AmountOverflow, message)
                    .with_product(product_id)
            }
            CoreError::UnknownProduct(product_id) => {
                ApiError::new(StatusCode::NOT_FOUND, ErrorKind::UnknownProduct, message)
                    .with_product(product_id)
            }
            CoreError::InsufficientStock {
                product_id,
                available,
                requested,
            } => {
                let mut api =
                    ApiError::new(StatusCode::CONFLICT, ErrorKind::InsufficientStock, message)
                        .with_product(product_id);
                api.available = Some(available);
                api.requested = Some(requested);
                api
            }
            CoreError::ProductNotFound(product_id) => {
                ApiError::new(StatusCode::NOT_FOUND, ErrorKind::ProductNotFound, message)
                    .with_product(product_id)
            }
            CoreError::BillNotFound(_) => {
                ApiError::new(StatusCode::NOT_FOUND, ErrorKind::BillNotFound, message)
            }
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts database errors to API errors.
///
/// The database message stays in the log; the client gets a generic one.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::new(
                StatusCode::NOT_FOUND,
                ErrorKind::NotFound,
                format!("{} not found: {}", entity, id),
            ),
            DbError::UniqueViolation { field, .. } => {
                tracing::error!(field = %field, "Unique constraint violated");
                ApiError::new(
                    StatusCode::CONFLICT,
                    ErrorKind::Conflict,
                    "Record already exists, retry the request",
                )
            }
            err @ (DbError::PoolExhausted | DbError::ConnectionFailed(_)) => {
                tracing::error!(error = %err, "Database unavailable");
                ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorKind::ServiceUnavailable,
                    "Database unavailable",
                )
            }
            err => {
                tracing::error!(error = %err, "Database operation failed");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorKind::DatabaseError,
                    "Database operation failed",
                )
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected(e) => ApiError::from(e),
            StoreError::Persistence(e) => ApiError::from(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            ErrorKind::MalformedRequest,
            rejection.body_text(),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.error_kind, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
