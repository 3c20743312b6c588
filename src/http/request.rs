//! Request ID assignment.
//!
//! # Responsibilities
//! - Give every inbound request an `x-request-id` (UUID v4) unless the caller
//!   already supplied one
//! - Echo the ID on the response
//!
//! # Design Decisions
//! - Assigned as the outermost layer so the trace span and handlers see it
//! - Handlers read it through `observability::tracing::CorrelationId`

use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub use crate::observability::tracing::X_REQUEST_ID;

/// Layer assigning a UUID request ID to requests that lack one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer copying the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}
