//! Orchestrator: stress generators and the downstream call chain.
//!
//! # Responsibilities
//! - Run the in-process profiling scenarios on demand
//! - Drive the retry scenario against Downstream-B
//! - Make single-shot calls to Downstream-B and Downstream-C
//! - Fan out traffic against its own health endpoint
//!
//! # Design Decisions
//! - CPU-bound generators run on the blocking pool
//! - Every outbound call carries the inbound request ID
//! - Single-shot downstream calls fail with 500 and the raw error message

use std::time::Duration;

use axum::{extract::State, routing::get, Router};
use serde_json::Value;
use tokio::task;

use crate::http::response::{AppError, ScenarioResult, ScenarioTimer};
use crate::http::server::AppState;
use crate::observability::tracing::CorrelationId;
use crate::resilience::{retry, with_timeout, RetryPolicy};
use crate::scenarios::{self, TrafficPlan};
use crate::services::client::{CallError, DownstreamClient};

const UNRELIABLE_PATH: &str = "/api/unreliable";
const DELAY_PATH: &str = "/api/delay";
const PROCESS_PATH: &str = "/api/process";

/// Scenario routes mounted under `prefix`.
pub fn router(prefix: &str) -> Router<AppState> {
    if prefix == "/" {
        routes()
    } else {
        Router::new().nest(prefix, routes())
    }
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/profile/efficient-sort", get(efficient_sort))
        .route("/profile/slow-sort", get(slow_sort))
        .route("/profile/long-function", get(long_function))
        .route("/profile/heap-break", get(heap_break))
        .route("/profile/stack-break", get(stack_break))
        .route("/profile/recursive", get(recursive))
        .route("/profile/cpu-intensive", get(cpu_intensive))
        .route("/trace/multiple-retries", get(multiple_retries))
        .route("/trace/internal-service", get(internal_service))
        .route("/trace/network-latency", get(network_latency))
        .route("/metrics/simulate-traffic", get(simulate_traffic))
        .route("/break-app", get(break_app))
}

async fn efficient_sort(State(state): State<AppState>) -> Result<ScenarioResult, AppError> {
    let cfg = state.config();
    let (size, bound) = (cfg.scenarios.sort_array_size, cfg.scenarios.sort_value_bound);
    let timer = ScenarioTimer::start("efficient-sort");

    let sorted = task::spawn_blocking(move || {
        scenarios::quick_sort(&scenarios::generate_test_array(size, bound))
    })
    .await?;

    Ok(timer
        .succeed("Efficient sort completed successfully")
        .with("algorithm", "quicksort")
        .with("arraySize", sorted.len()))
}

async fn slow_sort(State(state): State<AppState>) -> Result<ScenarioResult, AppError> {
    let cfg = state.config();
    let (size, bound) = (cfg.scenarios.sort_array_size, cfg.scenarios.sort_value_bound);
    let timer = ScenarioTimer::start("slow-sort");

    let sorted = task::spawn_blocking(move || {
        scenarios::bubble_sort(&scenarios::generate_test_array(size, bound))
    })
    .await?;

    Ok(timer
        .succeed("Slow sort completed successfully")
        .with("algorithm", "bubblesort")
        .with("arraySize", sorted.len()))
}

async fn long_function(State(state): State<AppState>) -> ScenarioResult {
    let cfg = state.config();
    let timer = ScenarioTimer::start("long-function");

    let report = scenarios::long_function(
        Duration::from_millis(cfg.scenarios.long_function_ms),
        Duration::from_millis(cfg.scenarios.long_function_tick_ms),
        cfg.scenarios.long_function_burn,
    )
    .await;

    timer
        .succeed("Long function completed successfully")
        .with("iterations", report.iterations)
}

async fn heap_break(State(state): State<AppState>) -> Result<ScenarioResult, AppError> {
    let cfg = state.config();
    let (count, len) = (cfg.scenarios.heap_array_count, cfg.scenarios.heap_array_len);
    let timer = ScenarioTimer::start("heap-break");

    let report = task::spawn_blocking(move || scenarios::heap_break(count, len)).await?;

    let message = if report.error.is_some() {
        "Heap stress test stopped at the memory limit"
    } else {
        "Heap stress test completed successfully"
    };
    let mut result = timer
        .succeed(message)
        .with("memoryUsed", report.memory_used())
        .with("arraysCreated", report.arrays_created);
    if let Some(sum) = report.total_sum {
        result = result.with("totalSum", sum);
    }
    if let Some(error) = report.error {
        result = result.with("allocationError", error);
    }
    Ok(result)
}

async fn stack_break(State(state): State<AppState>) -> Result<ScenarioResult, AppError> {
    let cfg = state.config();
    let (depth, budget) = (cfg.scenarios.stack_max_depth, cfg.scenarios.stack_frame_budget);
    let timer = ScenarioTimer::start("stack-break");

    let report = task::spawn_blocking(move || scenarios::stack_break(depth, budget)).await?;

    let message = if report.error.is_some() {
        "Stack stress test stopped at the frame limit"
    } else {
        "Stack stress test completed successfully"
    };
    let mut result = timer.succeed(message).with("depth", report.depth);
    if let Some(value) = report.result {
        result = result.with("result", value);
    }
    if let Some(error) = report.error {
        result = result.with("stackError", error);
    }
    Ok(result)
}

async fn recursive(State(state): State<AppState>) -> ScenarioResult {
    let levels = state.config().scenarios.recursion_levels;
    let timer = ScenarioTimer::start("recursive");
    let result = scenarios::deep_recursion(levels);

    timer
        .succeed("Recursive function completed successfully")
        .with("result", result)
}

async fn cpu_intensive(State(state): State<AppState>) -> Result<ScenarioResult, AppError> {
    let cfg = state.config();
    let max_iterations = cfg.scenarios.cpu_max_iterations;
    let max_time = Duration::from_millis(cfg.scenarios.cpu_max_ms);
    let timer = ScenarioTimer::start("cpu-intensive");

    let calculations =
        task::spawn_blocking(move || scenarios::cpu_intensive(max_iterations, max_time)).await?;

    Ok(timer
        .succeed("CPU intensive task completed successfully")
        .with("calculations", calculations))
}

async fn multiple_retries(
    State(state): State<AppState>,
    correlation: CorrelationId,
) -> Result<ScenarioResult, AppError> {
    let cfg = state.config();
    let policy = RetryPolicy::from(&cfg.retries);
    let client = DownstreamClient::new(state.client.clone(), &cfg.orchestrator.external_service_url)?;
    let timer = ScenarioTimer::start("multiple-retries");

    let client = &client;
    let correlation = &correlation;
    let outcome = retry(&policy, state.random.as_ref(), move |_| {
        client.get_json(UNRELIABLE_PATH, correlation)
    })
    .await;

    let result = match outcome {
        Ok(success) => {
            tracing::debug!(history = ?success.history, "Retry scenario succeeded");
            timer
                .succeed(format!("Retry scenario succeeded on attempt {}", success.attempt))
                .with("attempt", success.attempt)
                .with("data", success.value)
        }
        Err(exhausted) => {
            tracing::debug!(history = ?exhausted.history, "Retry scenario exhausted");
            timer
                .fail(
                    format!("Retry scenario failed after {} attempts", exhausted.attempts),
                    exhausted.last_error.to_string(),
                )
                .with("attempts", exhausted.attempts)
        }
    };
    Ok(result)
}

/// One downstream GET bounded by the configured timeout.
async fn call_once(
    state: &AppState,
    base_url: &str,
    path: &str,
    correlation: &CorrelationId,
) -> Result<Value, CallError> {
    let limit = Duration::from_millis(state.config().orchestrator.downstream_timeout_ms);
    let client = DownstreamClient::new(state.client.clone(), base_url)?;
    let outcome = with_timeout(limit, client.get_json(path, correlation))
        .await
        .map_err(CallError::from)
        .and_then(|result| result);

    if let Err(e) = &outcome {
        tracing::warn!(
            base_url,
            path,
            status = ?e.status(),
            error = %e,
            "Downstream call failed"
        );
    }
    outcome
}

async fn internal_service(
    State(state): State<AppState>,
    correlation: CorrelationId,
) -> Result<ScenarioResult, AppError> {
    let base_url = state.config().orchestrator.internal_service_url.clone();
    let timer = ScenarioTimer::start("internal-service");

    let response = call_once(&state, &base_url, PROCESS_PATH, &correlation).await?;

    Ok(timer
        .succeed("Internal service call completed successfully")
        .with("serviceResponse", response))
}

async fn network_latency(
    State(state): State<AppState>,
    correlation: CorrelationId,
) -> Result<ScenarioResult, AppError> {
    let base_url = state.config().orchestrator.external_service_url.clone();
    let timer = ScenarioTimer::start("network-latency");

    let response = call_once(&state, &base_url, DELAY_PATH, &correlation).await?;
    let latency = response.get("delay").cloned().unwrap_or(Value::Null);

    Ok(timer
        .succeed("Network latency test completed successfully")
        .with("networkLatency", latency))
}

async fn simulate_traffic(State(state): State<AppState>) -> ScenarioResult {
    let cfg = state.config();
    let plan = TrafficPlan {
        url: format!("{}/health", cfg.orchestrator.self_url.trim_end_matches('/')),
        requests: cfg.scenarios.traffic_requests,
        concurrency: cfg.scenarios.traffic_concurrency,
        timeout: Duration::from_millis(cfg.scenarios.traffic_timeout_ms),
    };
    let timer = ScenarioTimer::start("simulate-traffic");

    let report = scenarios::simulate_traffic(&state.client, &plan).await;

    let message = if report.successful_requests == 0 && report.requests_processed > 0 {
        "Traffic simulation completed with no successful requests"
    } else {
        "Traffic simulation completed successfully"
    };
    timer
        .succeed(message)
        .with("requestsProcessed", report.requests_processed)
        .with("successfulRequests", report.successful_requests)
        .with(
            "avgResponseTime",
            report.avg_response_time_ms.map(Value::from).unwrap_or(Value::Null),
        )
}

async fn break_app(State(state): State<AppState>) -> Result<ScenarioResult, AppError> {
    let bound = state.config().scenarios.break_app_bound;
    let timer = ScenarioTimer::start("break-app");
    tracing::warn!(bound, "Starting prime sieve; expect heavy memory use");

    let report = task::spawn_blocking(move || scenarios::prime_median(bound)).await?;

    let median = report
        .median
        .map(|m| Value::from(m.to_vec()))
        .unwrap_or(Value::Null);

    Ok(timer
        .succeed("Somehow the App survived")
        .with("bound", bound)
        .with("primeCount", report.prime_count)
        .with("median", median))
}
