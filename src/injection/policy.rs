//! Failure and latency injection policies.

use std::time::Duration;

use crate::config::RangeMs;
use crate::injection::random::RandomSource;

/// Probability-driven failure injection, consulted once per request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailureInjectionPolicy {
    probability: f64,
}

impl FailureInjectionPolicy {
    /// Probabilities outside `[0, 1]` are clamped.
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Draw once; `true` means this request must fail.
    pub fn should_fail(&self, random: &dyn RandomSource) -> bool {
        random.chance(self.probability)
    }
}

/// Uniformly sampled artificial latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyInjection {
    range: RangeMs,
}

impl LatencyInjection {
    pub fn new(range: RangeMs) -> Self {
        Self { range }
    }

    pub fn sample(&self, random: &dyn RandomSource) -> Duration {
        Duration::from_millis(random.uniform_inclusive(self.range.min, self.range.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injection::random::ScriptedRandom;

    #[test]
    fn test_failure_policy_bounds() {
        let always = FailureInjectionPolicy::new(1.0);
        let never = FailureInjectionPolicy::new(0.0);
        let src = ScriptedRandom::new([0.0, 0.5, 0.999]);
        for _ in 0..3 {
            assert!(always.should_fail(&src));
            assert!(!never.should_fail(&src));
        }
        assert_eq!(FailureInjectionPolicy::new(3.0).probability(), 1.0);
    }

    #[test]
    fn test_latency_sample_within_range() {
        let latency = LatencyInjection::new(RangeMs::new(500, 2500));
        let src = ScriptedRandom::new([0.0, 0.5, 0.9999]);
        assert_eq!(latency.sample(&src), Duration::from_millis(500));
        assert_eq!(latency.sample(&src), Duration::from_millis(1500));
        assert_eq!(latency.sample(&src), Duration::from_millis(2500));
    }
}
