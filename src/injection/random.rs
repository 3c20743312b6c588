//! Injectable randomness.
//!
//! Every probabilistic decision in the services (failure draws, latency
//! samples, backoff jitter, synthetic counters) goes through a
//! [`RandomSource`] held in the application state, so tests can script the
//! sequence of draws. Filler data for the stress generators does not.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    /// Next uniform draw in `[0, 1)`.
    fn next_f64(&self) -> f64;

    /// Uniform integer in the inclusive range `[min, max]`.
    fn uniform_inclusive(&self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f64;
        let offset = (self.next_f64() * span) as u64;
        min + offset.min(max - min)
    }

    /// Uniform integer in `[0, bound)`.
    fn below(&self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        ((self.next_f64() * bound as f64) as u64).min(bound - 1)
    }

    /// Bernoulli draw that is `true` with probability `p`.
    fn chance(&self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Thread-local RNG, the default source.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Deterministic RNG seeded from configuration.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen::<f64>()
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted.
#[derive(Debug)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: AtomicUsize,
}

impl ScriptedRandom {
    /// Values are clamped into `[0, 1)`.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }

    /// A source that always returns the same draw.
    pub fn constant(value: f64) -> Self {
        Self::new([value])
    }

    /// Number of draws taken so far.
    pub fn draws(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let idx = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.values[idx % self.values.len()]
    }
}

/// Build the process-wide source from the configured seed.
pub fn from_seed(seed: Option<u64>) -> Arc<dyn RandomSource> {
    match seed {
        Some(seed) => {
            tracing::info!(seed, "Using seeded random source");
            Arc::new(SeededRandom::new(seed))
        }
        None => Arc::new(ThreadRandom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_inclusive_covers_both_ends() {
        let low = ScriptedRandom::constant(0.0);
        assert_eq!(low.uniform_inclusive(200, 500), 200);

        let high = ScriptedRandom::constant(0.999_999);
        assert_eq!(high.uniform_inclusive(200, 500), 500);

        assert_eq!(high.uniform_inclusive(7, 7), 7);
    }

    #[test]
    fn test_below_is_exclusive() {
        let high = ScriptedRandom::constant(0.999_999_999);
        assert_eq!(high.below(1000), 999);
        assert_eq!(high.below(0), 0);
    }

    #[test]
    fn test_chance_uses_strict_threshold() {
        let src = ScriptedRandom::new([0.69, 0.7, 0.71]);
        assert!(src.chance(0.7));
        assert!(!src.chance(0.7));
        assert!(!src.chance(0.7));
        assert_eq!(src.draws(), 3);
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let a = SeededRandom::new(42);
        let b = SeededRandom::new(42);
        let xs: Vec<f64> = (0..5).map(|_| a.next_f64()).collect();
        let ys: Vec<f64> = (0..5).map(|_| b.next_f64()).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|x| (0.0..1.0).contains(x)));
    }
}
