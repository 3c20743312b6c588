//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign and echo the request ID)
//!     → service handler (services::{orchestrator, external, internal})
//!     → response.rs (scenario envelope, error mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{AppError, ScenarioResult, ScenarioTimer};
pub use server::{AppState, HttpServer};
