//! Traffic generator: a bounded fan-out of health probes.

use std::future::Future;
use std::time::Duration;

use futures_util::{stream, StreamExt};
use tokio::time::Instant;

use crate::resilience::with_timeout;

/// One traffic burst.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficPlan {
    pub url: String,
    pub requests: usize,
    /// Maximum probes in flight at once.
    pub concurrency: usize,
    pub timeout: Duration,
}

/// Aggregate outcome of a burst.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficReport {
    pub requests_processed: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    /// Mean latency of the successful probes, in milliseconds.
    pub avg_response_time_ms: Option<f64>,
    /// First failure observed, if any.
    pub first_error: Option<String>,
}

/// Run `requests` probes with at most `concurrency` outstanding, timing
/// each one individually. Failures are tallied, never propagated.
pub async fn fan_out<F, Fut>(requests: usize, concurrency: usize, probe: F) -> TrafficReport
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<(), String>>,
{
    let outcomes: Vec<Result<Duration, String>> = stream::iter(0..requests)
        .map(|_| {
            let call = probe();
            async move {
                let start = Instant::now();
                call.await.map(|()| start.elapsed())
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut successful = 0usize;
    let mut total_latency = Duration::ZERO;
    let mut first_error = None;

    for outcome in outcomes {
        match outcome {
            Ok(latency) => {
                successful += 1;
                total_latency += latency;
            }
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    let avg_response_time_ms =
        (successful > 0).then(|| total_latency.as_nanos() as f64 / 1e6 / successful as f64);

    TrafficReport {
        requests_processed: requests,
        successful_requests: successful,
        failed_requests: requests - successful,
        avg_response_time_ms,
        first_error,
    }
}

/// Issue the plan's GET probes over HTTP. Any 2xx answer counts as success.
pub async fn simulate_traffic(client: &reqwest::Client, plan: &TrafficPlan) -> TrafficReport {
    tracing::info!(
        url = %plan.url,
        requests = plan.requests,
        concurrency = plan.concurrency,
        "Starting traffic simulation"
    );

    let report = fan_out(plan.requests, plan.concurrency, || {
        let request = client.get(&plan.url).send();
        async move {
            match with_timeout(plan.timeout, request).await {
                Ok(Ok(response)) if response.status().is_success() => Ok(()),
                Ok(Ok(response)) => Err(format!(
                    "Request failed with status code {}",
                    response.status().as_u16()
                )),
                Ok(Err(e)) => Err(e.to_string()),
                Err(timed_out) => Err(timed_out.to_string()),
            }
        }
    })
    .await;

    if let Some(error) = &report.first_error {
        tracing::warn!(
            failed = report.failed_requests,
            first_error = %error,
            "Traffic simulation saw failures"
        );
    }
    report
}
