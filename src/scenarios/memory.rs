//! Heap and stack stress scenarios.
//!
//! Both generators degrade instead of failing: an allocation that cannot be
//! satisfied, or a probe that runs out of frames, ends the run early and the
//! report says how far it got.

const MIB: usize = 1024 * 1024;

/// Outcome of [`heap_break`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeapReport {
    pub arrays_created: usize,
    pub bytes_allocated: usize,
    /// Sum over every array; absent when allocation failed.
    pub total_sum: Option<f64>,
    pub error: Option<String>,
}

impl HeapReport {
    /// Human-readable memory figure.
    pub fn memory_used(&self) -> String {
        if self.error.is_some() {
            "Memory limit reached".to_string()
        } else {
            format!("{}MB (approximate)", self.bytes_allocated / MIB)
        }
    }
}

/// Allocate `count` arrays of `len` random floats, then reduce each to a sum.
pub fn heap_break(count: usize, len: usize) -> HeapReport {
    let mut arrays: Vec<Vec<f64>> = Vec::new();
    let element = std::mem::size_of::<f64>();

    for _ in 0..count {
        let mut array = Vec::new();
        if let Err(e) = array.try_reserve_exact(len) {
            tracing::warn!(arrays_created = arrays.len(), error = %e, "Heap stress allocation failed");
            return HeapReport {
                arrays_created: arrays.len(),
                bytes_allocated: arrays.len() * len * element,
                total_sum: None,
                error: Some(e.to_string()),
            };
        }
        array.extend((0..len).map(|_| fastrand::f64()));
        arrays.push(array);
    }

    let total_sum = arrays.iter().map(|a| a.iter().sum::<f64>()).sum();

    HeapReport {
        arrays_created: arrays.len(),
        bytes_allocated: arrays.len() * len * element,
        total_sum: Some(total_sum),
        error: None,
    }
}

/// Outcome of [`stack_break`].
#[derive(Debug, Clone, PartialEq)]
pub struct StackReport {
    /// Deepest level reached.
    pub depth: u64,
    pub result: Option<f64>,
    pub error: Option<String>,
}

/// Probe down to `max_depth` levels, accumulating `sqrt(d) + sin(d)` per level.
///
/// Levels are walked with an explicit counter instead of native recursion;
/// `frame_budget` plays the role of the call-stack limit.
pub fn stack_break(max_depth: u64, frame_budget: u64) -> StackReport {
    let mut depth = 0u64;
    let mut accumulated = 0.0f64;

    while depth < max_depth {
        if depth >= frame_budget {
            tracing::warn!(depth, frame_budget, "Stack probe exhausted its frame budget");
            return StackReport {
                depth,
                result: None,
                error: Some("Maximum call stack size exceeded".to_string()),
            };
        }
        let d = depth as f64;
        accumulated += d.sqrt() + d.sin();
        depth += 1;
    }

    StackReport {
        depth,
        // the deepest level returns its own depth
        result: Some(accumulated + depth as f64),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_break_small() {
        let report = heap_break(4, 1000);
        assert_eq!(report.arrays_created, 4);
        assert_eq!(report.bytes_allocated, 4 * 1000 * 8);
        let sum = report.total_sum.unwrap();
        assert!(sum > 0.0 && sum < 4000.0);
        assert_eq!(report.memory_used(), "0MB (approximate)");
    }

    #[test]
    fn test_heap_break_degrades_on_impossible_allocation() {
        let report = heap_break(3, usize::MAX / 2);
        assert_eq!(report.arrays_created, 0);
        assert!(report.error.is_some());
        assert_eq!(report.total_sum, None);
        assert_eq!(report.memory_used(), "Memory limit reached");
    }

    #[test]
    fn test_stack_break_accumulates() {
        let report = stack_break(3, 10);
        let expected = (0.0f64.sqrt() + 0.0f64.sin())
            + (1.0f64.sqrt() + 1.0f64.sin())
            + (2.0f64.sqrt() + 2.0f64.sin())
            + 3.0;
        assert_eq!(report.depth, 3);
        assert!((report.result.unwrap() - expected).abs() < 1e-12);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_stack_break_full_depth() {
        let report = stack_break(1_000_000, 10_000_000);
        assert_eq!(report.depth, 1_000_000);
        assert!(report.result.is_some());
    }

    #[test]
    fn test_stack_break_reports_depth_on_exhaustion() {
        let report = stack_break(1_000, 250);
        assert_eq!(report.depth, 250);
        assert_eq!(report.result, None);
        assert_eq!(report.error.as_deref(), Some("Maximum call stack size exceeded"));
    }
}
