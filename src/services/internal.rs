//! Downstream-C: multi-step pipelines that widen trace trees.
//!
//! # Endpoints
//! - `GET /api/process`: five-stage record pipeline
//! - `GET /api/database-ops`: simulated database session
//! - `GET /api/external-calls`: chain of four sub-service calls
//! - `GET /api/flaky`: single-shot failure injection

use axum::{extract::State, routing::get, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::http::response::{ScenarioResult, ScenarioTimer};
use crate::http::server::AppState;
use crate::injection::FailureInjectionPolicy;
use crate::observability::metrics;
use crate::pipeline::{DATABASE_OPS, EXTERNAL_CALLS, PROCESS};

/// Display names for the database-ops steps, in execution order.
const DATABASE_OPERATIONS: [&str; 6] = [
    "Database Connection",
    "User Query",
    "Order Query",
    "Join Operations",
    "Data Aggregation",
    "Connection Cleanup",
];

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/process", get(process))
        .route("/api/database-ops", get(database_ops))
        .route("/api/external-calls", get(external_calls))
        .route("/api/flaky", get(flaky))
}

async fn process(State(state): State<AppState>) -> ScenarioResult {
    let timer = ScenarioTimer::start("process");
    let random = state.random.as_ref();

    PROCESS.run(random).await;

    let steps: Vec<Value> = PROCESS
        .steps
        .iter()
        .map(|s| json!({ "name": s.name, "duration": s.declared_label() }))
        .collect();

    timer
        .succeed("Complex processing completed successfully")
        .with("steps", steps)
        .with(
            "processedData",
            json!({
                "recordsProcessed": random.below(1000) + 100,
                "batchId": format!("batch_{}", Utc::now().timestamp_millis()),
                "validationsPassed": random.below(50) + 20,
            }),
        )
}

async fn database_ops(State(state): State<AppState>) -> ScenarioResult {
    let timer = ScenarioTimer::start("database-ops");
    let random = state.random.as_ref();

    DATABASE_OPS.run(random).await;

    timer
        .succeed("Database operations completed successfully")
        .with("operations", DATABASE_OPERATIONS.to_vec())
        .with(
            "results",
            json!({
                "usersFound": random.below(100) + 10,
                "ordersFound": random.below(500) + 50,
                "aggregatedRecords": random.below(50) + 5,
            }),
        )
}

async fn external_calls(State(state): State<AppState>) -> ScenarioResult {
    let timer = ScenarioTimer::start("external-calls");

    EXTERNAL_CALLS.run(state.random.as_ref()).await;

    let calls: Vec<Value> = EXTERNAL_CALLS
        .steps
        .iter()
        .map(|s| json!({ "service": s.name, "status": "success" }))
        .collect();

    timer
        .succeed("External API calls completed successfully")
        .with("externalCalls", calls)
}

async fn flaky(State(state): State<AppState>) -> ScenarioResult {
    let timer = ScenarioTimer::start("flaky");
    let policy = FailureInjectionPolicy::new(state.config().internal.flaky_failure_probability);

    if policy.should_fail(state.random.as_ref()) {
        metrics::record_injected_failure(state.service, "flaky");
        tracing::warn!(probability = policy.probability(), "Injecting failure");
        return timer.fail("Injected failure", "Internal service temporarily unavailable");
    }

    timer.succeed("Flaky service request succeeded").with(
        "data",
        json!({
            "randomValue": state.random.below(1000),
            "requestId": format!("req_{}", Utc::now().timestamp_millis()),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names_cover_every_step() {
        assert_eq!(DATABASE_OPERATIONS.len(), DATABASE_OPS.steps.len());
    }
}
