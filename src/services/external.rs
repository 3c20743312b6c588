//! Downstream-B: an unreliable, slow external dependency.
//!
//! # Endpoints
//! - `GET /api/delay`: sleeps a uniform delay, reports it
//! - `GET /api/unreliable`: fails with the configured probability
//! - `GET /api/slow`: sleeps a longer uniform delay
//! - `GET /api/status/{code}`: answers with the requested status

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::http::response::{now_iso, ScenarioResult, ScenarioTimer};
use crate::http::server::AppState;
use crate::injection::{FailureInjectionPolicy, LatencyInjection};
use crate::observability::metrics;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/delay", get(delay))
        .route("/api/unreliable", get(unreliable))
        .route("/api/slow", get(slow))
        .route("/api/status/{code}", get(status_echo))
}

async fn delay(State(state): State<AppState>) -> ScenarioResult {
    let timer = ScenarioTimer::start("delay");
    let latency = LatencyInjection::new(state.config().external.delay_range_ms);
    let delay = latency.sample(state.random.as_ref());

    tokio::time::sleep(delay).await;

    let ms = delay.as_millis() as u64;
    timer
        .succeed(format!("Response delayed by {ms}ms"))
        .with("delay", ms)
}

async fn unreliable(State(state): State<AppState>) -> ScenarioResult {
    let timer = ScenarioTimer::start("unreliable");
    let policy = FailureInjectionPolicy::new(state.config().external.failure_probability);

    if policy.should_fail(state.random.as_ref()) {
        metrics::record_injected_failure(state.service, "unreliable");
        tracing::warn!(probability = policy.probability(), "Injecting failure");
        return timer.fail("Injected failure", "Service temporarily unavailable");
    }

    timer.succeed("Request succeeded").with(
        "data",
        json!({
            "randomValue": state.random.below(1000),
            "requestId": Utc::now().timestamp_millis(),
        }),
    )
}

async fn slow(State(state): State<AppState>) -> ScenarioResult {
    let timer = ScenarioTimer::start("slow");
    let latency = LatencyInjection::new(state.config().external.slow_range_ms);
    let processing = latency.sample(state.random.as_ref());

    tokio::time::sleep(processing).await;

    timer
        .succeed("Slow operation completed")
        .with("processingTime", processing.as_millis() as u64)
        .with(
            "data",
            json!({
                "processedItems": state.random.below(100),
                "batchId": Utc::now().timestamp_millis(),
            }),
        )
}

async fn status_echo(Path(code): Path<String>) -> Response {
    let (status, body) = status_echo_response(&code);
    (status, Json(body)).into_response()
}

/// Integer prefix of `raw`, read like a lenient integer parse: leading
/// whitespace, an optional sign, then decimal digits. Saturates on overflow.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }

    let magnitude: i64 = digits.parse().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Status and body for `/api/status/{code}`.
///
/// Missing, unparsable or zero codes mean 200. Codes that cannot be sent as a
/// final response (negative, informational, outside 100-999) turn into a
/// generic 500. Codes without a canned body reuse the 200 body under the
/// requested status.
pub fn status_echo_response(raw: &str) -> (StatusCode, Value) {
    let requested = leading_integer(raw).filter(|&c| c != 0).unwrap_or(200);

    let status = u16::try_from(requested)
        .ok()
        .and_then(|c| StatusCode::from_u16(c).ok())
        .filter(|s| !s.is_informational());

    let Some(status) = status else {
        tracing::warn!(requested, "Requested status cannot be expressed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "success": false,
                "error": "External service error",
                "timestamp": now_iso(),
            }),
        );
    };

    let body = match status.as_u16() {
        400 => json!({ "success": false, "error": "Bad Request" }),
        404 => json!({ "success": false, "error": "Not Found" }),
        500 => json!({ "success": false, "error": "Internal Server Error" }),
        503 => json!({ "success": false, "error": "Service Unavailable" }),
        _ => json!({ "success": true, "message": "OK" }),
    };

    (status, body)
}
