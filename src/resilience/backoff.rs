//! Delay policies between retry attempts.

use std::time::Duration;

use crate::config::{BackoffKind, RetryConfig};
use crate::injection::RandomSource;

/// How long to wait before the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay after every failed attempt.
    Fixed(Duration),
    /// `base * 2^(attempt-1)` capped at `max`, plus up to 10% jitter.
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Delay to sleep after the given (1-based) failed attempt. Jitter is
    /// drawn from `random`.
    pub fn delay(&self, attempt: u32, random: &dyn RandomSource) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, max } => calculate_backoff(
                attempt,
                base.as_millis() as u64,
                max.as_millis() as u64,
                random,
            ),
        }
    }
}

impl From<&RetryConfig> for Backoff {
    fn from(config: &RetryConfig) -> Self {
        let base = Duration::from_millis(config.retry_delay_ms);
        match config.backoff {
            BackoffKind::Fixed => Backoff::Fixed(base),
            BackoffKind::Exponential => Backoff::Exponential {
                base,
                max: Duration::from_millis(config.max_delay_ms.max(config.retry_delay_ms)),
            },
        }
    }
}

/// Calculate exponential backoff delay with jitter.
pub fn calculate_backoff(
    attempt: u32,
    base_ms: u64,
    max_ms: u64,
    random: &dyn RandomSource,
) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = random.below(jitter_range);

    Duration::from_millis(capped_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injection::{ScriptedRandom, ThreadRandom};

    #[test]
    fn test_fixed_delay_ignores_attempt() {
        let backoff = Backoff::from(&RetryConfig::default());
        assert_eq!(backoff, Backoff::Fixed(Duration::from_millis(5000)));
        assert_eq!(backoff.delay(1, &ThreadRandom), Duration::from_millis(5000));
        assert_eq!(backoff.delay(4, &ThreadRandom), Duration::from_millis(5000));
    }

    #[test]
    fn test_backoff_calculation() {
        let b1 = calculate_backoff(1, 100, 2000, &ThreadRandom);
        assert!(b1.as_millis() >= 100 && b1.as_millis() < 110);

        let b2 = calculate_backoff(2, 100, 2000, &ThreadRandom);
        assert!(b2.as_millis() >= 200);

        let max = calculate_backoff(10, 100, 1000, &ThreadRandom);
        assert!(max.as_millis() >= 1000 && max.as_millis() < 1100);

        assert_eq!(calculate_backoff(0, 100, 1000, &ThreadRandom), Duration::ZERO);
    }

    #[test]
    fn test_jitter_comes_from_the_random_source() {
        let low = ScriptedRandom::constant(0.0);
        assert_eq!(calculate_backoff(1, 100, 2000, &low), Duration::from_millis(100));

        let mid = ScriptedRandom::constant(0.5);
        assert_eq!(calculate_backoff(2, 100, 2000, &mid), Duration::from_millis(210));
        assert_eq!(mid.draws(), 1);

        // fixed delays take no draw
        let fixed = Backoff::Fixed(Duration::from_millis(50));
        assert_eq!(fixed.delay(3, &mid), Duration::from_millis(50));
        assert_eq!(mid.draws(), 1);
    }

    #[test]
    fn test_exponential_from_config() {
        let config = RetryConfig {
            backoff: BackoffKind::Exponential,
            retry_delay_ms: 100,
            max_delay_ms: 400,
            ..RetryConfig::default()
        };
        let backoff = Backoff::from(&config);
        assert!(backoff.delay(5, &ThreadRandom) >= Duration::from_millis(400));
        assert!(backoff.delay(5, &ThreadRandom) < Duration::from_millis(440));
    }
}
