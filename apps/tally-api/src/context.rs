//! # Request Context Extractor
//!
//! Builds the [`RequestContext`] that the components receive explicitly.
//!
//! ```text
//! x-request-id: 7f9c…      ──► request_id (generated UUID when absent)
//! x-principal-id: clerk-3  ──► principal  (recorded as bill.soldBy)
//! ```
//!
//! Authentication happens upstream; the principal header is trusted as-is
//! and only used for auditing.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use tally_core::RequestContext;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const PRINCIPAL_HEADER: &str = "x-principal-id";

const MAX_HEADER_VALUE_LEN: usize = 128;

/// Extracted request context.
#[derive(Debug, Clone)]
pub struct Ctx(pub RequestContext);

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Ctx(context_from_headers(&parts.headers)))
    }
}

/// Reads the context headers, ignoring values that are blank, too long or
/// not valid UTF-8.
pub fn context_from_headers(headers: &HeaderMap) -> RequestContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty() && v.len() <= MAX_HEADER_VALUE_LEN)
            .map(str::to_string)
    };

    let request_id = header(REQUEST_ID_HEADER).unwrap_or_else(|| Uuid::new_v4().to_string());
    RequestContext::new(request_id, header(PRINCIPAL_HEADER))
}
