//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (probabilities, millisecond ranges, attempt counts)
//! - Check addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TestbedConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{RangeMs, TestbedConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &TestbedConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_addr(&mut errors, "orchestrator.bind_address", &config.orchestrator.bind_address);
    check_addr(&mut errors, "external.bind_address", &config.external.bind_address);
    check_addr(&mut errors, "internal.bind_address", &config.internal.bind_address);

    check_url(&mut errors, "orchestrator.external_service_url", &config.orchestrator.external_service_url);
    check_url(&mut errors, "orchestrator.internal_service_url", &config.orchestrator.internal_service_url);
    check_url(&mut errors, "orchestrator.self_url", &config.orchestrator.self_url);

    let prefix = &config.orchestrator.route_prefix;
    if !prefix.starts_with('/') {
        errors.push(ValidationError::new(
            "orchestrator.route_prefix",
            "must start with '/'",
        ));
    } else if prefix.len() > 1 && prefix.ends_with('/') {
        errors.push(ValidationError::new(
            "orchestrator.route_prefix",
            "must not end with '/'",
        ));
    }
    if config.orchestrator.downstream_timeout_ms == 0 {
        errors.push(ValidationError::new("orchestrator.downstream_timeout_ms", "must be > 0"));
    }

    check_probability(&mut errors, "external.failure_probability", config.external.failure_probability);
    check_probability(&mut errors, "internal.flaky_failure_probability", config.internal.flaky_failure_probability);
    check_range(&mut errors, "external.delay_range_ms", config.external.delay_range_ms);
    check_range(&mut errors, "external.slow_range_ms", config.external.slow_range_ms);

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "at least one attempt is required"));
    }
    if config.retries.attempt_timeout_ms == 0 {
        errors.push(ValidationError::new("retries.attempt_timeout_ms", "must be > 0"));
    }

    let scenarios = &config.scenarios;
    if scenarios.sort_value_bound == 0 {
        errors.push(ValidationError::new("scenarios.sort_value_bound", "must be > 0"));
    }
    if scenarios.long_function_tick_ms == 0 {
        errors.push(ValidationError::new("scenarios.long_function_tick_ms", "must be > 0"));
    }
    if scenarios.traffic_concurrency == 0 {
        errors.push(ValidationError::new("scenarios.traffic_concurrency", "must be >= 1"));
    }
    if scenarios.traffic_timeout_ms == 0 {
        errors.push(ValidationError::new("scenarios.traffic_timeout_ms", "must be > 0"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    if config.rate_limit.enabled {
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError::new("rate_limit.max_requests", "must be >= 1 when enabled"));
        }
        if config.rate_limit.window_secs == 0 {
            errors.push(ValidationError::new("rate_limit.window_secs", "must be > 0 when enabled"));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }
    if !config.observability.metrics_path.starts_with('/') {
        errors.push(ValidationError::new("observability.metrics_path", "must start with '/'"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("'{value}' is not a socket address")));
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {e}"))),
    }
}

fn check_probability(errors: &mut Vec<ValidationError>, field: &'static str, p: f64) {
    if !(0.0..=1.0).contains(&p) {
        errors.push(ValidationError::new(field, format!("{p} is outside [0, 1]")));
    }
}

fn check_range(errors: &mut Vec<ValidationError>, field: &'static str, range: RangeMs) {
    if range.min > range.max {
        errors.push(ValidationError::new(
            field,
            format!("min {} exceeds max {}", range.min, range.max),
        ));
    }
}
