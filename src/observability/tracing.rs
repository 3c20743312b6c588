//! Request correlation across services.
//!
//! # Responsibilities
//! - Extract the request ID assigned at the edge of each service
//! - Propagate it on calls to downstream services
//!
//! # Design Decisions
//! - The `x-request-id` header is the only propagated context
//! - A missing or non-ASCII header yields no correlation ID, never a rejection

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID of the current request, if one was assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationId(pub Option<String>);

impl CorrelationId {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(CorrelationId(id))
    }
}

/// Attach the correlation ID to an outbound request.
pub fn propagate(builder: reqwest::RequestBuilder, id: &CorrelationId) -> reqwest::RequestBuilder {
    match id.as_deref() {
        Some(id) => builder.header(X_REQUEST_ID, id),
        None => builder,
    }
}
