//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (request ID propagated across services)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape of /metrics)
//!     → External profiler/trace collector attached to the process
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows Orchestrator → Downstream-B / Downstream-C
//! - Pipeline steps and retry attempts are spans, so traces are deep trees

pub mod logging;
pub mod metrics;
pub mod tracing;
