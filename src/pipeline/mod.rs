//! Step-pipeline simulator.
//!
//! # Data Flow
//! ```text
//! Downstream-C request
//!     → Pipeline::run
//!     → for each StepRecord, in order:
//!           sample duration uniformly from its declared range
//!           sleep inside a `pipeline_step` span
//!     → total elapsed time (per-step timings go to spans and metrics)
//! ```
//!
//! # Design Decisions
//! - Steps never overlap; the next step starts after the previous sleep ends
//! - Pipelines are `'static` tables, fixed at compile time and read-only
//! - Steps have no failure path

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::Instrument;

use crate::config::RangeMs;
use crate::injection::RandomSource;
use crate::observability::metrics;

/// Static descriptor of one pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub name: &'static str,
    pub declared_range_ms: RangeMs,
}

impl StepRecord {
    pub const fn new(name: &'static str, min_ms: u64, max_ms: u64) -> Self {
        Self {
            name,
            declared_range_ms: RangeMs::new(min_ms, max_ms),
        }
    }

    /// Declared range rendered as `"min-maxms"`.
    pub fn declared_label(&self) -> String {
        format!(
            "{}-{}ms",
            self.declared_range_ms.min, self.declared_range_ms.max
        )
    }
}

/// An ordered, named list of steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipeline {
    pub name: &'static str,
    pub steps: &'static [StepRecord],
}

impl Pipeline {
    /// Execute every step strictly in order. Returns the total time taken.
    pub async fn run(&self, random: &dyn RandomSource) -> Duration {
        let start = Instant::now();

        for step in self.steps {
            let range = step.declared_range_ms;
            let sampled = Duration::from_millis(random.uniform_inclusive(range.min, range.max));
            let span = tracing::info_span!(
                "pipeline_step",
                pipeline = self.name,
                step = step.name,
                sampled_ms = sampled.as_millis() as u64
            );

            tokio::time::sleep(sampled).instrument(span).await;

            tracing::debug!(pipeline = self.name, step = step.name, "Step {} completed in {}ms", step.name, sampled.as_millis());
            metrics::record_pipeline_step(self.name, step.name, sampled);
        }

        start.elapsed()
    }
}

/// Five-stage record processing.
pub const PROCESS: Pipeline = Pipeline {
    name: "process",
    steps: &[
        StepRecord::new("validation", 200, 500),
        StepRecord::new("transformation", 300, 800),
        StepRecord::new("business-logic", 500, 1200),
        StepRecord::new("persistence", 100, 400),
        StepRecord::new("response-prep", 50, 200),
    ],
};

/// Simulated database session.
pub const DATABASE_OPS: Pipeline = Pipeline {
    name: "database-ops",
    steps: &[
        StepRecord::new("connect-db", 50, 150),
        StepRecord::new("query-users", 100, 300),
        StepRecord::new("query-orders", 150, 400),
        StepRecord::new("join-operations", 200, 500),
        StepRecord::new("aggregate-data", 100, 250),
        StepRecord::new("close-connection", 20, 80),
    ],
};

/// Chain of calls to four named sub-services.
pub const EXTERNAL_CALLS: Pipeline = Pipeline {
    name: "external-calls",
    steps: &[
        StepRecord::new("auth-service", 100, 300),
        StepRecord::new("user-service", 200, 600),
        StepRecord::new("notification-service", 150, 400),
        StepRecord::new("analytics-service", 100, 250),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injection::{ScriptedRandom, ThreadRandom};

    fn min_total(pipeline: &Pipeline) -> Duration {
        Duration::from_millis(pipeline.steps.iter().map(|s| s.declared_range_ms.min).sum())
    }

    fn max_total(pipeline: &Pipeline) -> Duration {
        Duration::from_millis(pipeline.steps.iter().map(|s| s.declared_range_ms.max).sum())
    }

    #[test]
    fn test_process_bounds() {
        assert_eq!(min_total(&PROCESS), Duration::from_millis(1150));
        assert_eq!(max_total(&PROCESS), Duration::from_millis(3100));
        assert_eq!(PROCESS.steps[2].declared_label(), "500-1200ms");
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_total_within_declared_bounds() {
        for _ in 0..20 {
            let total = PROCESS.run(&ThreadRandom).await;
            assert!(total >= min_total(&PROCESS));
            assert!(total <= max_total(&PROCESS));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_steps_run_sequentially() {
        let random = ScriptedRandom::new([0.0, 0.25, 0.5, 0.75, 0.9999]);
        let total = PROCESS.run(&random).await;

        // one draw per step; 200 + 425 + 850 + 325 + 200
        assert_eq!(random.draws(), 5);
        assert_eq!(total, Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_extremes_hit_exact_bounds() {
        let low = DATABASE_OPS.run(&ScriptedRandom::constant(0.0)).await;
        assert_eq!(low, min_total(&DATABASE_OPS));

        let high = EXTERNAL_CALLS.run(&ScriptedRandom::constant(0.9999)).await;
        assert_eq!(high, max_total(&EXTERNAL_CALLS));
    }
}
