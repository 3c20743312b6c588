//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap a single downstream call with a deadline
//! - Cancel only the wrapped call when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The wrapped operation did not finish in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("timeout of {}ms exceeded", .0.as_millis())]
pub struct TimedOut(pub Duration);

/// Run `fut` with a deadline. The future is dropped when the deadline passes.
pub async fn with_timeout<F>(limit: Duration, fut: F) -> Result<F::Output, TimedOut>
where
    F: Future,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| TimedOut(limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires() {
        let err = with_timeout(Duration::from_millis(3000), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
        })
        .await
        .unwrap_err();
        assert_eq!(err, TimedOut(Duration::from_millis(3000)));
        assert_eq!(err.to_string(), "timeout of 3000ms exceeded");
    }

    #[tokio::test(start_paused = true)]
    async fn test_completes_within_deadline() {
        let value = with_timeout(Duration::from_secs(1), async { 7 }).await;
        assert_eq!(value, Ok(7));
    }
}
