//! Interval search

/// Emulates the behavior of `upper_bound` but uses a function object to get
/// values at various indices instead of requiring access to an actual array.
/// It is used to bisect arrays that are procedurally generated such as those
/// interpolated from point samples.
///
/// Returns the last index `i` in `[0, size - 2]` for which `pred(i)` holds,
/// clamped so that `i + 1` is always a valid index.
///
/// * `size` - Size of array; must be at least 2.
/// * `pred` - Monotonic predicate evaluated at a given index.
pub fn find_interval<Predicate>(size: usize, pred: Predicate) -> usize
where
    Predicate: Fn(usize) -> bool,
{
    debug_assert!(size >= 2);
    let first = partition_point(0, size, pred);
    first.saturating_sub(1).min(size.saturating_sub(2))
}

/// Returns the last index in `[lo, hi)` for which the monotonic predicate
/// holds, or `lo` when it holds nowhere. Used to keep inverse-CDF searches
/// inside the sub-range of a table that carries probability mass.
///
/// * `lo`   - First candidate index.
/// * `hi`   - One past the last candidate index.
/// * `pred` - Monotonic predicate evaluated at a given index.
pub fn find_interval_range<Predicate>(lo: usize, hi: usize, pred: Predicate) -> usize
where
    Predicate: Fn(usize) -> bool,
{
    if hi <= lo {
        return lo;
    }
    let first = partition_point(lo, hi, pred);
    if first == lo {
        lo
    } else {
        first - 1
    }
}

/// Returns the first index in `[lo, hi)` for which `pred` is false.
fn partition_point<Predicate>(lo: usize, hi: usize, pred: Predicate) -> usize
where
    Predicate: Fn(usize) -> bool,
{
    let (mut first, mut len) = (lo, hi - lo);

    while len > 0 {
        let half = len >> 1;
        let middle = first + half;

        // Bisect range based on value of `pred` at `middle`.
        if pred(middle) {
            first = middle + 1;
            len -= half + 1;
        } else {
            len = half;
        }
    }

    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn interval_is_clamped_to_valid_segments() {
        let nodes = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(find_interval(nodes.len(), |i| nodes[i] <= -1.0), 0);
        assert_eq!(find_interval(nodes.len(), |i| nodes[i] <= 0.5), 0);
        assert_eq!(find_interval(nodes.len(), |i| nodes[i] <= 1.0), 1);
        assert_eq!(find_interval(nodes.len(), |i| nodes[i] <= 3.0), 2);
        assert_eq!(find_interval(nodes.len(), |i| nodes[i] <= 9.0), 2);
    }

    #[test]
    fn ranged_search_prefers_larger_index_on_ties() {
        let cdf = [0.0, 0.0, 0.5, 0.5, 1.0, 1.0];
        assert_eq!(find_interval_range(1, 4, |i| cdf[i] <= 0.0), 1);
        assert_eq!(find_interval_range(1, 4, |i| cdf[i] <= 0.5), 3);
        assert_eq!(find_interval_range(1, 4, |i| cdf[i] <= 1.0), 3);
        assert_eq!(find_interval_range(2, 2, |_| true), 2);
    }

    proptest! {
        #[test]
        fn interval_brackets_value(x in 0.0f32..10.0f32) {
            let nodes: Vec<f32> = (0..11).map(|i| i as f32).collect();
            let i = find_interval(nodes.len(), |j| nodes[j] <= x);
            prop_assert!(nodes[i] <= x);
            prop_assert!(x <= nodes[i + 1]);
        }
    }
}
