//! Splitting the sample arena into per-worker index ranges.

use crate::error::{Error, Result};
use std::ops::Range;

/// Splits `count` elements into `workers` contiguous half-open ranges in
/// worker-index order. Base size is `count / workers`; the first
/// `count % workers` workers receive one extra element. The ranges are
/// pairwise disjoint and their union is exactly `0..count`.
pub fn balanced_ranges(count: usize, workers: usize) -> Vec<Range<usize>> {
    assert!(workers > 0, "worker count must be positive");
    let base = count / workers;
    let remainder = count % workers;

    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for worker in 0..workers {
        let len = base + usize::from(worker < remainder);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// Like [`balanced_ranges`], but requires `count` to divide evenly across
/// the workers, so every range has the same length. The message-passing
/// engine transfers whole ranges to the workers it spawns and only
/// supports this uniform split.
pub fn exact_ranges(count: usize, workers: usize) -> Result<Vec<Range<usize>>> {
    assert!(workers > 0, "worker count must be positive");
    if count % workers != 0 {
        return Err(Error::InvalidPartition {
            points: count,
            workers,
        });
    }
    Ok(balanced_ranges(count, workers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_without_gaps_or_overlap() {
        for count in 1..=40 {
            for workers in 1..=10 {
                let ranges = balanced_ranges(count, workers);
                assert_eq!(ranges.len(), workers);
                let mut next = 0;
                for range in &ranges {
                    assert_eq!(range.start, next, "gap or overlap at {:?}", range);
                    next = range.end;
                }
                assert_eq!(next, count);
            }
        }
    }

    #[test]
    fn remainder_goes_to_first_workers() {
        let ranges = balanced_ranges(10, 4);
        assert_eq!(ranges, vec![0..3, 3..6, 6..8, 8..10]);
    }

    #[test]
    fn more_workers_than_elements() {
        let ranges = balanced_ranges(2, 5);
        assert_eq!(ranges, vec![0..1, 1..2, 2..2, 2..2, 2..2]);
    }

    #[test]
    fn exact_ranges_require_divisibility() {
        assert_eq!(exact_ranges(12, 4).unwrap(), vec![0..3, 3..6, 6..9, 9..12]);
        assert!(matches!(
            exact_ranges(10, 4),
            Err(Error::InvalidPartition {
                points: 10,
                workers: 4
            })
        ));
    }

    #[test]
    fn single_worker_owns_everything() {
        assert_eq!(balanced_ranges(7, 1), vec![0..7]);
        assert_eq!(exact_ranges(7, 1).unwrap(), vec![0..7]);
    }
}
