//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the testbed.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration shared by all three services.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct TestbedConfig {
    /// Orchestrator (scenario entry point) settings.
    pub orchestrator: OrchestratorConfig,

    /// Downstream-B ("external", unreliable dependency) settings.
    pub external: ExternalConfig,

    /// Downstream-C ("internal", step pipeline) settings.
    pub internal: InternalConfig,

    /// Retry driver used by the orchestrator against Downstream-B.
    pub retries: RetryConfig,

    /// Numeric knobs of the stress generators.
    pub scenarios: ScenarioConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Seed for a deterministic random source. Unset means thread RNG.
    pub random_seed: Option<u64>,
}

/// Orchestrator configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,

    /// Base URL of Downstream-B.
    pub external_service_url: String,

    /// Base URL of Downstream-C.
    pub internal_service_url: String,

    /// URL the traffic simulation uses to reach this orchestrator.
    pub self_url: String,

    /// Timeout for single-shot downstream calls in milliseconds.
    pub downstream_timeout_ms: u64,

    /// Prefix all scenario routes are nested under.
    pub route_prefix: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
            external_service_url: "http://localhost:3002".to_string(),
            internal_service_url: "http://localhost:3003".to_string(),
            self_url: "http://localhost:3001".to_string(),
            downstream_timeout_ms: 10_000,
            route_prefix: "/api".to_string(),
        }
    }
}

/// Downstream-B configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ExternalConfig {
    /// Bind address.
    pub bind_address: String,

    /// Probability that `/api/unreliable` fails.
    pub failure_probability: f64,

    /// Inclusive latency range of `/api/delay` in milliseconds.
    pub delay_range_ms: RangeMs,

    /// Inclusive processing range of `/api/slow` in milliseconds.
    pub slow_range_ms: RangeMs,
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3002".to_string(),
            failure_probability: 0.7,
            delay_range_ms: RangeMs::new(500, 2500),
            slow_range_ms: RangeMs::new(1000, 4000),
        }
    }
}

/// Downstream-C configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct InternalConfig {
    /// Bind address.
    pub bind_address: String,

    /// Probability that `/api/flaky` fails.
    pub flaky_failure_probability: f64,
}

impl Default for InternalConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3003".to_string(),
            flaky_failure_probability: 0.3,
        }
    }
}

/// Inclusive millisecond range.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct RangeMs {
    pub min: u64,
    pub max: u64,
}

impl RangeMs {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }
}

/// Delay strategy between retry attempts.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    /// Same delay before every retry.
    #[default]
    Fixed,
    /// Doubling delay with jitter, capped at `max_delay_ms`.
    Exponential,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds.
    pub retry_delay_ms: u64,

    /// Timeout of a single attempt in milliseconds.
    pub attempt_timeout_ms: u64,

    /// Delay strategy.
    pub backoff: BackoffKind,

    /// Upper bound for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay_ms: 5000,
            attempt_timeout_ms: 3000,
            backoff: BackoffKind::Fixed,
            max_delay_ms: 30_000,
        }
    }
}

/// Stress generator configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Length of the arrays sorted by the sort scenarios.
    pub sort_array_size: usize,
    /// Exclusive upper bound of the sorted values.
    pub sort_value_bound: u32,

    /// Total duration of long-function in milliseconds.
    pub long_function_ms: u64,
    /// Pause between long-function work slices in milliseconds.
    pub long_function_tick_ms: u64,
    /// Square roots computed per long-function slice.
    pub long_function_burn: u32,

    /// Number of arrays heap-break allocates.
    pub heap_array_count: usize,
    /// Elements per heap-break array.
    pub heap_array_len: usize,

    /// Depth stack-break probes to.
    pub stack_max_depth: u64,
    /// Frames available before stack-break reports exhaustion.
    pub stack_frame_budget: u64,

    /// Levels of the recursive scenario.
    pub recursion_levels: u32,

    /// Iteration cap of cpu-intensive.
    pub cpu_max_iterations: u64,
    /// Time cap of cpu-intensive in milliseconds.
    pub cpu_max_ms: u64,

    /// Health checks fired by the traffic simulation.
    pub traffic_requests: usize,
    /// Maximum health checks in flight at once.
    pub traffic_concurrency: usize,
    /// Timeout of a single health check in milliseconds.
    pub traffic_timeout_ms: u64,

    /// Exclusive upper bound for the break-app prime median.
    pub break_app_bound: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            sort_array_size: 100,
            sort_value_bound: 100_000,
            long_function_ms: 60_000,
            long_function_tick_ms: 100,
            long_function_burn: 100_000,
            heap_array_count: 50,
            heap_array_len: 1_000_000,
            stack_max_depth: 1_000_000,
            stack_frame_budget: 10_000_000,
            recursion_levels: 10,
            cpu_max_iterations: 10_000_000,
            cpu_max_ms: 10_000,
            traffic_requests: 10_000,
            traffic_concurrency: 10_000,
            traffic_timeout_ms: 5000,
            break_app_bound: 10_000_000_000,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        // long-function alone runs for a minute
        Self { request_secs: 600 }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting on the orchestrator.
    pub enabled: bool,

    /// Window length in seconds.
    pub window_secs: u64,

    /// Maximum requests per client within a window.
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            window_secs: 15 * 60,
            max_requests: 100,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Path the Prometheus endpoint is served on.
    pub metrics_path: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_path: "/metrics".to_string(),
        }
    }
}
