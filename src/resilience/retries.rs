//! Retry driver.
//!
//! # Responsibilities
//! - Re-issue a fallible call until it succeeds or attempts run out
//! - Give every attempt its own deadline, independent of the retry budget
//! - Sleep between attempts, never after the last one
//! - Keep an in-memory log of attempts for the current request only
//!
//! # Design Decisions
//! - Timeouts count as failures, same as errors returned by the call
//! - The loop always runs at least once, so exhaustion always has a last error
//! - Elapsed time is measured from the start of the first attempt

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::Instrument;

use crate::config::RetryConfig;
use crate::injection::RandomSource;
use crate::observability::metrics;
use crate::resilience::backoff::Backoff;
use crate::resilience::timeouts::{with_timeout, TimedOut};

/// Bounded-attempt retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Deadline of each individual attempt.
    pub attempt_timeout: Duration,
    /// Delay between attempts.
    pub backoff: Backoff,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            attempt_timeout: Duration::from_millis(config.attempt_timeout_ms),
            backoff: Backoff::from(config),
        }
    }
}

/// One entry of the attempt log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryAttempt {
    pub attempt_number: u32,
    pub error: Option<String>,
}

/// Why a single attempt failed.
#[derive(Debug)]
pub enum AttemptError<E> {
    TimedOut(TimedOut),
    Failed(E),
}

impl<E: fmt::Display> fmt::Display for AttemptError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::TimedOut(t) => write!(f, "{t}"),
            AttemptError::Failed(e) => write!(f, "{e}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for AttemptError<E> {}

/// The call succeeded on `attempt`.
#[derive(Debug)]
pub struct RetrySuccess<T> {
    pub value: T,
    /// 1-based index of the successful attempt.
    pub attempt: u32,
    pub elapsed: Duration,
    pub history: Vec<RetryAttempt>,
}

/// Every attempt failed.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: AttemptError<E>,
    pub elapsed: Duration,
    pub history: Vec<RetryAttempt>,
}

/// Run `op` under `policy`. `op` receives the 1-based attempt number.
/// Backoff jitter is drawn from `random`.
pub async fn retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    random: &dyn RandomSource,
    mut op: F,
) -> Result<RetrySuccess<T>, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let start = Instant::now();
    let mut history = Vec::with_capacity(max_attempts as usize);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let span = tracing::info_span!("retry_attempt", attempt, max_attempts);
        let outcome = with_timeout(policy.attempt_timeout, op(attempt))
            .instrument(span)
            .await;

        let error = match outcome {
            Ok(Ok(value)) => {
                metrics::record_retry_attempt("success");
                history.push(RetryAttempt {
                    attempt_number: attempt,
                    error: None,
                });
                tracing::info!(attempt, "Attempt succeeded");
                return Ok(RetrySuccess {
                    value,
                    attempt,
                    elapsed: start.elapsed(),
                    history,
                });
            }
            Ok(Err(e)) => {
                metrics::record_retry_attempt("failure");
                AttemptError::Failed(e)
            }
            Err(t) => {
                metrics::record_retry_attempt("timeout");
                AttemptError::TimedOut(t)
            }
        };

        tracing::warn!(attempt, max_attempts, error = %error, "Attempt failed");
        history.push(RetryAttempt {
            attempt_number: attempt,
            error: Some(error.to_string()),
        });

        if attempt >= max_attempts {
            return Err(RetryExhausted {
                attempts: attempt,
                last_error: error,
                elapsed: start.elapsed(),
                history,
            });
        }

        let delay = policy.backoff.delay(attempt, random);
        tracing::info!(attempt, delay_ms = delay.as_millis() as u64, "Retrying after delay");
        tokio::time::sleep(delay).await;
    }
}
