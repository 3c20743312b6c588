//! Request admission control.
//!
//! # Data Flow
//! ```text
//! Incoming request (orchestrator only, when enabled):
//!     → rate_limit.rs (fixed window per client IP)
//!     → scenario handler
//! ```

pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, FixedWindowLimiter};
