//! Telemetry testbed: three cooperating HTTP services that produce
//! recognisable runtime behaviour for traces, metrics and profiles.

pub mod config;
pub mod http;
pub mod injection;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod resilience;
pub mod scenarios;
pub mod security;
pub mod services;

pub use config::TestbedConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use services::ServiceKind;
