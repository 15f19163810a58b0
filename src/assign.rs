//! The per-worker assignment kernel: nearest centroid search plus local
//! accumulation. Purely data-parallel, no cross-worker interaction.

use crate::accumulate::Accumulator;
use crate::memory::Primitive;

/// Squared Euclidean distance in widened arithmetic, so that squared
/// coordinate differences cannot overflow the coordinate type.
#[inline]
pub(crate) fn euclidean_dist_sq<T: Primitive>(a: &[T], b: &[T]) -> T::Wide {
    a.iter()
        .zip(b.iter())
        .map(|(&av, &bv)| {
            let diff = av.to_wide() - bv.to_wide();
            diff * diff
        })
        .sum()
}

/// Index of the centroid closest to `point`. Centroids are scanned in
/// index order with a strict `<` against the running minimum, so the
/// lowest index wins exact ties.
#[inline]
pub(crate) fn nearest_centroid<T: Primitive>(point: &[T], centroids: &[T]) -> usize {
    centroids
        .chunks_exact(point.len())
        .map(|centroid| euclidean_dist_sq(point, centroid))
        .enumerate()
        .min_by_key(|&(_, dist)| dist)
        .map(|(idx, _)| idx)
        .expect("at least one centroid")
}

/// Runs the assignment phase over one worker's rows: stores each point's
/// winning cluster into its assignment slot and books the point into the
/// local accumulator.
pub(crate) fn assign_rows<T: Primitive>(
    rows: &[T],
    dims: usize,
    centroids: &[T],
    assignments: &mut [usize],
    acc: &mut Accumulator<T>,
) {
    debug_assert_eq!(rows.len(), assignments.len() * dims);
    rows.chunks_exact(dims)
        .zip(assignments.iter_mut())
        .for_each(|(point, slot)| {
            let winner = nearest_centroid(point, centroids);
            *slot = winner;
            acc.record(winner, point);
        });
}
