//! Shared-memory driver: worker threads over one sample arena, two
//! barriers per iteration and not a single lock on the hot path.
//!
//! The iteration is split into two strictly delimited windows:
//!
//! - Assignment window (before barrier A): every thread reads the shared
//!   centroids and writes only its own accumulator slot and its own
//!   disjoint slice of the assignments vector.
//! - Reduce/update window (between barrier A and barrier B): every thread
//!   except the leader (thread 0) is parked at barrier B. The leader is
//!   the only live thread; it reads all accumulator slots, merges them and
//!   rewrites the centroids.
//!
//! Barrier A guarantees all accumulators are fully written before the
//! leader reads; barrier B guarantees the rewritten centroids are visible
//! to every thread before the next assignment window, and that no worker
//! touches its accumulator again until the leader is done with it. Both
//! barriers establish the happens-before edges a lock would otherwise
//! provide, with a single reader and zero contention.

use crate::accumulate::Accumulator;
use crate::assign;
use crate::memory::Primitive;
use crate::partition;
use crate::{KMeans, KMeansConfig, KMeansState};
use log::debug;
use std::cell::UnsafeCell;
use std::sync::Barrier;

/// One worker's accumulator slot.
///
/// Safety contract: mutated only by its owning worker during the
/// assignment window, read only by the leader between the two barriers.
/// The barrier protocol above makes those accesses non-overlapping.
struct WorkerSlot<T: Primitive>(UnsafeCell<Accumulator<T>>);
unsafe impl<T: Primitive> Sync for WorkerSlot<T> {}

/// The shared centroid buffer.
///
/// Safety contract: read by all workers during the assignment window,
/// written only by the leader between the two barriers.
struct CentroidCell<T: Primitive>(UnsafeCell<Vec<T>>);
unsafe impl<T: Primitive> Sync for CentroidCell<T> {}

pub(crate) struct BarrierGated<T: Primitive> {
    _p: std::marker::PhantomData<T>,
}

impl<T: Primitive> BarrierGated<T> {
    pub fn calculate<'a, F>(
        data: &KMeans<T>,
        k: usize,
        iterations: usize,
        threads: usize,
        init: F,
        config: &KMeansConfig<'a, T>,
    ) -> KMeansState<T>
    where
        for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>),
    {
        assert!(k >= 1 && k <= data.sample_cnt);
        assert!(threads >= 1);

        let mut state = KMeansState::new(data.sample_cnt, data.sample_dims, k);
        init(data, &mut state, config);

        let dims = data.sample_dims;
        let ranges = partition::balanced_ranges(data.sample_cnt, threads);
        debug!(
            "spawning {} barrier workers over {} samples ({} iterations)",
            threads, data.sample_cnt, iterations
        );

        let centroids = CentroidCell(UnsafeCell::new(std::mem::take(&mut state.centroids)));
        let slots: Vec<WorkerSlot<T>> = (0..threads)
            .map(|_| WorkerSlot(UnsafeCell::new(Accumulator::new(k, dims))))
            .collect();
        // The leader's global accumulator, reused across iterations.
        let global = WorkerSlot(UnsafeCell::new(Accumulator::new(k, dims)));
        let barrier = Barrier::new(threads);
        let iteration_done = config.iteration_done;

        // Carve the assignments vector into per-worker disjoint slices.
        let mut slices: Vec<&mut [usize]> = Vec::with_capacity(threads);
        let mut rest = state.assignments.as_mut_slice();
        for range in &ranges {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
            slices.push(head);
            rest = tail;
        }

        std::thread::scope(|scope| {
            for (worker, (range, mut slice)) in
                ranges.iter().cloned().zip(slices.into_iter()).enumerate()
            {
                let (barrier, centroids, slots, global) = (&barrier, &centroids, &slots, &global);
                let rows = &data.samples[range.start * dims..range.end * dims];
                scope.spawn(move || {
                    for iteration in 1..=iterations {
                        {
                            // Assignment window.
                            let centroids = unsafe { &*centroids.0.get() };
                            let acc = unsafe { &mut *slots[worker].0.get() };
                            acc.reset();
                            assign::assign_rows(rows, dims, centroids, &mut slice[..], acc);
                        }
                        // Barrier A: every accumulator is fully written.
                        barrier.wait();

                        if worker == 0 {
                            // Reduce/update window: all other threads are
                            // parked at barrier B.
                            let global = unsafe { &mut *global.0.get() };
                            global.reset();
                            for slot in slots.iter() {
                                global.merge(unsafe { &*slot.0.get() });
                            }
                            let centroids = unsafe { &mut *centroids.0.get() };
                            global.apply_to_centroids(centroids);
                            iteration_done(iteration, centroids);
                        }
                        // Barrier B: updated centroids are visible to every
                        // worker before the next assignment window.
                        barrier.wait();
                    }
                });
            }
        });

        state.centroids = centroids.0.into_inner();
        data.update_cluster_frequencies(&state.assignments, &mut state.centroid_frequency);
        state
    }
}
