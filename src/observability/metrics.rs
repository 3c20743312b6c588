//! Metrics collection and exposition.
//!
//! # Metrics
//! - `testbed_http_requests_total` (counter): requests by service, method, route, status
//! - `testbed_http_request_duration_seconds` (histogram): latency by service, route
//! - `testbed_retry_attempts_total` (counter): retry attempts by outcome
//! - `testbed_injected_failures_total` (counter): deliberate failures by service, endpoint
//! - `testbed_scenario_duration_seconds` (histogram): scenario runtime by name, success
//! - `testbed_pipeline_step_duration_seconds` (histogram): sampled step sleeps
//! - `testbed_rate_limited_total` (counter): rejected requests
//!
//! # Design Decisions
//! - One Prometheus recorder per process, rendered by each service at `/metrics`
//! - Route labels use the matched route template, never the raw path

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::services::ServiceKind;

static RECORDER: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Install the Prometheus recorder. Later calls return the same handle.
pub fn init_metrics() -> Option<PrometheusHandle> {
    RECORDER
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                tracing::info!("Prometheus recorder installed");
                Some(handle)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Prometheus recorder");
                None
            }
        })
        .clone()
}

/// Handler rendering the Prometheus text format.
pub async fn render(State(handle): State<PrometheusHandle>) -> Response {
    handle.run_upkeep();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response()
}

/// Route-layer middleware recording request count and latency.
pub async fn track_requests(
    State(service): State<ServiceKind>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;
    record_request(service, &method, &route, response.status().as_u16(), start);
    response
}

pub fn record_request(service: ServiceKind, method: &str, route: &str, status: u16, start: Instant) {
    let service = service.as_str();
    counter!(
        "testbed_http_requests_total",
        "service" => service,
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "testbed_http_request_duration_seconds",
        "service" => service,
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_retry_attempt(outcome: &'static str) {
    counter!("testbed_retry_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_injected_failure(service: ServiceKind, endpoint: &'static str) {
    counter!(
        "testbed_injected_failures_total",
        "service" => service.as_str(),
        "endpoint" => endpoint
    )
    .increment(1);
}

pub fn record_scenario(scenario: &'static str, duration: Duration, success: bool) {
    histogram!(
        "testbed_scenario_duration_seconds",
        "scenario" => scenario,
        "success" => if success { "true" } else { "false" }
    )
    .record(duration.as_secs_f64());
}

pub fn record_pipeline_step(pipeline: &'static str, step: &str, duration: Duration) {
    histogram!(
        "testbed_pipeline_step_duration_seconds",
        "pipeline" => pipeline,
        "step" => step.to_string()
    )
    .record(duration.as_secs_f64());
}

pub fn record_rate_limited() {
    counter!("testbed_rate_limited_total").increment(1);
}
