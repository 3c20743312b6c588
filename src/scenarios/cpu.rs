//! CPU-bound profiling scenarios.

use std::hint::black_box;
use std::time::Duration;

use tokio::time::Instant;

/// Outcome of [`long_function`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongRunReport {
    pub elapsed: Duration,
    /// Elapsed time divided by the tick length.
    pub iterations: u64,
    /// Work slices actually executed.
    pub slices: u64,
}

/// Fixed-size burn: sum of square roots of `0..n`.
pub fn burn(n: u32) -> f64 {
    let mut sum = 0.0;
    for i in 0..n {
        sum += black_box(f64::from(i)).sqrt();
    }
    sum
}

/// Burn `burn_size` square roots, yield for `tick`, repeat until `total` has
/// elapsed.
pub async fn long_function(total: Duration, tick: Duration, burn_size: u32) -> LongRunReport {
    let start = Instant::now();
    let mut slices = 0u64;

    loop {
        let elapsed = start.elapsed();
        if elapsed >= total {
            let tick_ms = tick.as_millis().max(1) as u64;
            return LongRunReport {
                elapsed,
                iterations: elapsed.as_millis() as u64 / tick_ms,
                slices,
            };
        }

        black_box(burn(burn_size));
        slices += 1;
        tokio::time::sleep(tick).await;
    }
}

/// Trigonometric/logarithmic busy loop, stopping at `max_iterations` or
/// `max_time`, whichever comes first. Returns the iteration count.
pub fn cpu_intensive(max_iterations: u64, max_time: Duration) -> u64 {
    let start = std::time::Instant::now();
    let mut calculations = 0u64;

    while calculations < max_iterations && start.elapsed() < max_time {
        let n = fastrand::f64() * 1000.0;
        black_box(n.sqrt());
        black_box(n.sin());
        black_box(n.cos());
        black_box(n.tan());
        black_box(n.ln());
        calculations += 1;
    }

    calculations
}

/// Shallow recursion accumulating `d² + sqrt(d + 1)` per level; the deepest
/// level contributes its own depth.
pub fn deep_recursion(levels: u32) -> f64 {
    fn level(levels: u32, current: u32) -> f64 {
        if current >= levels {
            return f64::from(current);
        }
        let d = f64::from(current);
        d.powi(2) + (d + 1.0).sqrt() + level(levels, current + 1)
    }
    level(levels, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_recursion_is_deterministic() {
        let expected: f64 = (0..10)
            .map(|d| f64::from(d).powi(2) + f64::from(d + 1).sqrt())
            .sum::<f64>()
            + 10.0;
        assert!((deep_recursion(10) - expected).abs() < 1e-9);
        assert!((deep_recursion(10) - 317.468_278).abs() < 1e-5);
        assert_eq!(deep_recursion(0), 0.0);
    }

    #[test]
    fn test_cpu_intensive_stops_at_iteration_cap() {
        assert_eq!(cpu_intensive(5_000, Duration::from_secs(10)), 5_000);
    }

    #[test]
    fn test_cpu_intensive_stops_at_time_cap() {
        let count = cpu_intensive(u64::MAX, Duration::from_millis(20));
        assert!(count > 0);
        assert!(count < u64::MAX);
    }

    #[test]
    fn test_burn() {
        assert_eq!(burn(0), 0.0);
        assert!((burn(5) - (0.0 + 1.0 + 2f64.sqrt() + 3f64.sqrt() + 2.0)).abs() < 1e-12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_function_runs_until_total() {
        let report = long_function(Duration::from_millis(1000), Duration::from_millis(100), 10).await;
        assert_eq!(report.elapsed, Duration::from_millis(1000));
        assert_eq!(report.iterations, 10);
        assert_eq!(report.slices, 10);
    }
}
