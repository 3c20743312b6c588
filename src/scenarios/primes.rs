//! Segmented prime sieve behind the break-app scenario.
//!
//! Every segment keeps its own list of primes, so memory grows with the
//! number of primes found. With the default bound of 10^10 that is several
//! gigabytes; the scenario is meant to stress the host.

use serde::{Serialize, Serializer};

/// Median of an ordered prime list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimeMedian {
    /// Odd count: the middle prime.
    Single(u64),
    /// Even count: the two middle primes.
    Pair(u64, u64),
}

impl PrimeMedian {
    pub fn to_vec(self) -> Vec<u64> {
        match self {
            PrimeMedian::Single(p) => vec![p],
            PrimeMedian::Pair(a, b) => vec![a, b],
        }
    }
}

impl Serialize for PrimeMedian {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_vec().serialize(serializer)
    }
}

/// Outcome of [`prime_median`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedianReport {
    pub prime_count: u64,
    /// `None` when there are no primes below the bound.
    pub median: Option<PrimeMedian>,
}

/// Primes in `[2, limit)` by a plain sieve of Eratosthenes.
fn base_primes(limit: u64) -> Vec<u64> {
    let limit = limit as usize;
    if limit < 3 {
        return Vec::new();
    }
    let mut composite = vec![false; limit];
    let mut i = 2;
    while i * i < limit {
        if !composite[i] {
            let mut j = i * i;
            while j < limit {
                composite[j] = true;
                j += i;
            }
        }
        i += 1;
    }
    (2..limit).filter(|&n| !composite[n]).map(|n| n as u64).collect()
}

/// All primes below `bound`, grouped by sieve segment.
///
/// The segment width is `floor(sqrt(bound)) + 1`, which is also the limit of
/// the base sieve.
pub fn segmented_primes(bound: u64) -> Vec<Vec<u64>> {
    if bound < 3 {
        return Vec::new();
    }

    let limit = (bound as f64).sqrt() as u64 + 1;
    let base = base_primes(limit);
    let mut segments = vec![base.clone()];

    let mut low = limit;
    while low < bound {
        let high = (low + limit).min(bound);
        let mut composite = vec![false; (high - low) as usize];

        for &p in &base {
            let first_multiple = low.div_ceil(p) * p;
            let mut j = first_multiple.max(p * p);
            while j < high {
                composite[(j - low) as usize] = true;
                j += p;
            }
        }

        segments.push(
            composite
                .iter()
                .enumerate()
                .filter(|&(_, &c)| !c)
                .map(|(i, _)| low + i as u64)
                .collect(),
        );
        low = high;
    }

    segments
}

/// Zero-based `index` into the concatenation of `segments`.
fn nth(segments: &[Vec<u64>], mut index: u64) -> Option<u64> {
    for segment in segments {
        let len = segment.len() as u64;
        if index < len {
            return Some(segment[index as usize]);
        }
        index -= len;
    }
    None
}

/// Count the primes below `bound` and find their median.
pub fn prime_median(bound: u64) -> MedianReport {
    let segments = segmented_primes(bound);
    let prime_count: u64 = segments.iter().map(|s| s.len() as u64).sum();

    let median = if prime_count == 0 {
        None
    } else if prime_count % 2 == 1 {
        nth(&segments, prime_count / 2).map(PrimeMedian::Single)
    } else {
        let upper = prime_count / 2;
        match (nth(&segments, upper - 1), nth(&segments, upper)) {
            (Some(a), Some(b)) => Some(PrimeMedian::Pair(a, b)),
            _ => None,
        }
    };

    MedianReport { prime_count, median }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_below_100() {
        let report = prime_median(100);
        assert_eq!(report.prime_count, 25);
        assert_eq!(report.median, Some(PrimeMedian::Single(41)));
    }

    #[test]
    fn test_median_below_20_is_a_pair() {
        let report = prime_median(20);
        assert_eq!(report.prime_count, 8);
        assert_eq!(report.median, Some(PrimeMedian::Pair(7, 11)));
    }

    #[test]
    fn test_pair_spanning_segments() {
        // width 6: [2,6) [6,12) [12,18) [18,24) [24,30)
        let segments = segmented_primes(30);
        assert_eq!(segments[1], vec![7, 11]);
        assert_eq!(segments[2], vec![13, 17]);
        assert_eq!(prime_median(30).median, Some(PrimeMedian::Pair(11, 13)));
    }

    #[test]
    fn test_small_bounds() {
        assert_eq!(prime_median(0).median, None);
        assert_eq!(prime_median(2).prime_count, 0);
        assert_eq!(prime_median(3).median, Some(PrimeMedian::Single(2)));
        assert_eq!(prime_median(5).median, Some(PrimeMedian::Pair(2, 3)));
    }

    #[test]
    fn test_count_matches_known_value() {
        assert_eq!(prime_median(10_000).prime_count, 1229);
        let flat: Vec<u64> = segmented_primes(1_000).into_iter().flatten().collect();
        assert!(flat.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(flat.last(), Some(&997));
    }

    #[test]
    fn test_median_serializes_as_array() {
        assert_eq!(serde_json::to_value(PrimeMedian::Single(41)).unwrap(), serde_json::json!([41]));
        assert_eq!(serde_json::to_value(PrimeMedian::Pair(7, 11)).unwrap(), serde_json::json!([7, 11]));
    }
}
