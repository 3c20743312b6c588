//! Response envelope shared by every scenario.
//!
//! # Responsibilities
//! - Build the `{success, message, duration, timestamp, ...payload}` body
//! - Measure duration from the scenario's first action to body construction
//! - Map unexpected handler errors to HTTP 500 with the raw message
//!
//! # Design Decisions
//! - Results are immutable once built; handlers return them directly
//! - Failure results answer 500, success results 200
//! - Error messages are never redacted; this is a test harness

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tokio::time::Instant;

use crate::observability::metrics;
use crate::services::client::CallError;

/// Outcome of one scenario, returned as the response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub success: bool,
    pub message: String,
    /// Milliseconds between the scenario's first action and this result.
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    #[serde(serialize_with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ScenarioResult {
    /// Add a payload field.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        if self.success {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ScenarioResult {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

fn iso_millis<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_iso(ts))
}

fn format_iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time formatted like the result timestamps.
pub fn now_iso() -> String {
    format_iso(&Utc::now())
}

/// Clock started at a scenario's first observable action.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioTimer {
    scenario: &'static str,
    started: Instant,
}

impl ScenarioTimer {
    pub fn start(scenario: &'static str) -> Self {
        tracing::debug!(scenario, "Scenario started");
        Self {
            scenario,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Successful result stamped with the elapsed time.
    pub fn succeed(&self, message: impl Into<String>) -> ScenarioResult {
        self.finish(true, message.into(), None)
    }

    /// Failed result stamped with the elapsed time.
    pub fn fail(&self, message: impl Into<String>, error: impl Into<String>) -> ScenarioResult {
        self.finish(false, message.into(), Some(error.into()))
    }

    fn finish(&self, success: bool, message: String, error: Option<String>) -> ScenarioResult {
        let elapsed = self.elapsed();
        metrics::record_scenario(self.scenario, elapsed, success);
        tracing::info!(
            scenario = self.scenario,
            success,
            duration_ms = elapsed.as_millis() as u64,
            "Scenario finished"
        );
        ScenarioResult {
            success,
            message,
            duration_ms: elapsed.as_millis() as u64,
            timestamp: Utc::now(),
            error,
            payload: Map::new(),
        }
    }
}

/// Unexpected failure at a handler boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Downstream(#[from] CallError),

    #[error("scenario task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        tracing::error!(error = %message, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": message,
                "timestamp": now_iso(),
            })),
        )
            .into_response()
    }
}
