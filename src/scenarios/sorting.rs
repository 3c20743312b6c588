//! Sort-based profiling scenarios.

/// Fresh array of `size` random integers in `[0, bound)`.
pub fn generate_test_array(size: usize, bound: u32) -> Vec<u32> {
    (0..size).map(|_| fastrand::u32(0..bound.max(1))).collect()
}

/// Partition-based recursive sort.
///
/// The pivot is the middle element; elements equal to the pivot go to the
/// right partition. Allocates new partitions at every level.
pub fn quick_sort<T: PartialOrd + Copy>(values: &[T]) -> Vec<T> {
    if values.len() <= 1 {
        return values.to_vec();
    }

    let mid = values.len() / 2;
    let pivot = values[mid];
    let mut left = Vec::new();
    let mut right = Vec::new();

    for (i, &value) in values.iter().enumerate() {
        if i == mid {
            continue;
        }
        if value < pivot {
            left.push(value);
        } else {
            right.push(value);
        }
    }

    let mut sorted = quick_sort(&left);
    sorted.push(pivot);
    sorted.extend(quick_sort(&right));
    sorted
}

/// Quadratic comparison sort.
///
/// Always performs the full `n(n-1)/2` comparison sweep, even when a pass
/// makes no swaps.
pub fn bubble_sort<T: PartialOrd + Copy>(values: &[T]) -> Vec<T> {
    let mut sorted = values.to_vec();
    let n = sorted.len();

    for i in 0..n.saturating_sub(1) {
        for j in 0..n - i - 1 {
            if sorted[j] > sorted[j + 1] {
                sorted.swap(j, j + 1);
            }
        }
    }

    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn is_sorted<T: PartialOrd>(values: &[T]) -> bool {
        values.windows(2).all(|w| w[0] <= w[1])
    }

    fn multiset(values: &[u32]) -> Vec<u32> {
        let mut v = values.to_vec();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_generated_array_respects_bounds() {
        let values = generate_test_array(100, 100_000);
        assert_eq!(values.len(), 100);
        assert!(values.iter().all(|&v| v < 100_000));
    }

    #[test]
    fn test_edge_cases() {
        assert!(quick_sort::<u32>(&[]).is_empty());
        assert!(bubble_sort::<u32>(&[]).is_empty());
        assert_eq!(quick_sort(&[5]), vec![5]);
        assert_eq!(bubble_sort(&[5]), vec![5]);
        assert_eq!(quick_sort(&[3, 3, 1, 3]), vec![1, 3, 3, 3]);
    }

    proptest! {
        #[test]
        fn prop_both_sorts_agree(values in proptest::collection::vec(0u32..100_000, 0..200)) {
            let quick = quick_sort(&values);
            let bubble = bubble_sort(&values);

            prop_assert_eq!(quick.len(), values.len());
            prop_assert_eq!(bubble.len(), values.len());
            prop_assert!(is_sorted(&quick));
            prop_assert!(is_sorted(&bubble));
            prop_assert_eq!(multiset(&quick), multiset(&values));
            prop_assert_eq!(&quick, &bubble);
        }
    }
}
