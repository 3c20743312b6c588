//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrator call to Downstream-B:
//!     → retries.rs (attempt loop, attempt log)
//!     → timeouts.rs (per-attempt deadline)
//!     → On failure: backoff.rs (delay before next attempt)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - The per-attempt deadline and the inter-attempt delay are separate timers
//! - No state survives the request that ran the loop

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use backoff::Backoff;
pub use retries::{retry, AttemptError, RetryAttempt, RetryExhausted, RetryPolicy, RetrySuccess};
pub use timeouts::{with_timeout, TimedOut};
