//! Message-passing driver: a coordinator task plus one spawned worker per
//! partition, communicating exclusively over channels. Workers own their
//! rows outright; there is no shared mutable state and therefore no
//! memory-visibility reasoning at all.
//!
//! Per iteration the coordinator broadcasts the current centroids to every
//! worker, receives one partial accumulator per worker and merges them in
//! arrival order (integer addition is associative and commutative, so the
//! order cannot change the totals), then updates the centroids. Partial
//! accumulators travel by move and are recirculated with the next
//! broadcast, so no buffer is reallocated inside the loop.
//!
//! The coordinator is not itself a worker: scattering the initial rows and
//! gathering the final assignments are its own explicit operations.

use crate::accumulate::Accumulator;
use crate::assign;
use crate::error::Result;
use crate::memory::Primitive;
use crate::partition;
use crate::{KMeans, KMeansConfig, KMeansState, UNASSIGNED};
use log::debug;
use std::sync::mpsc::{self, Receiver, Sender};

enum ToWorker<T: Primitive> {
    /// Broadcast of the current centroids, plus a drained accumulator for
    /// the worker to fill.
    Assign {
        centroids: Vec<T>,
        scratch: Accumulator<T>,
    },
    /// Gather the final per-partition assignments and shut down.
    Finish,
}

fn worker_loop<T: Primitive>(
    worker: usize,
    rows: Vec<T>,
    dims: usize,
    inbox: Receiver<ToWorker<T>>,
    partial_tx: Sender<Accumulator<T>>,
    report_tx: Sender<(usize, Vec<usize>)>,
) {
    let mut assignments = vec![UNASSIGNED; rows.len() / dims];
    while let Ok(msg) = inbox.recv() {
        match msg {
            ToWorker::Assign {
                centroids,
                mut scratch,
            } => {
                scratch.reset();
                assign::assign_rows(&rows, dims, &centroids, &mut assignments, &mut scratch);
                if partial_tx.send(scratch).is_err() {
                    // Coordinator is gone; the whole run is aborting.
                    break;
                }
            }
            ToWorker::Finish => {
                let _ = report_tx.send((worker, assignments));
                break;
            }
        }
    }
}

pub(crate) struct MessagePassing<T: Primitive> {
    _p: std::marker::PhantomData<T>,
}

impl<T: Primitive> MessagePassing<T> {
    pub fn calculate<'a, F>(
        data: &KMeans<T>,
        k: usize,
        iterations: usize,
        workers: usize,
        init: F,
        config: &KMeansConfig<'a, T>,
    ) -> Result<KMeansState<T>>
    where
        for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>),
    {
        assert!(k >= 1 && k <= data.sample_cnt);
        assert!(workers >= 1);

        // Fails before any worker is spawned when the samples do not split
        // evenly; this engine only transfers whole uniform partitions.
        let ranges = partition::exact_ranges(data.sample_cnt, workers)?;
        let dims = data.sample_dims;

        let mut state = KMeansState::new(data.sample_cnt, dims, k);
        init(data, &mut state, config);

        let (partial_tx, partial_rx) = mpsc::channel();
        let (report_tx, report_rx) = mpsc::channel();
        let mut outboxes = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        debug!(
            "scattering {} rows each to {} workers ({} iterations)",
            data.sample_cnt / workers,
            workers,
            iterations
        );
        for (worker, range) in ranges.iter().cloned().enumerate() {
            // Scatter: the worker takes ownership of its contiguous rows.
            let rows = data.samples[range.start * dims..range.end * dims].to_vec();
            let (tx, inbox) = mpsc::channel();
            let (partial_tx, report_tx) = (partial_tx.clone(), report_tx.clone());
            handles.push(std::thread::spawn(move || {
                worker_loop(worker, rows, dims, inbox, partial_tx, report_tx)
            }));
            outboxes.push(tx);
        }
        // The coordinator keeps only the receiving ends.
        drop(partial_tx);
        drop(report_tx);

        // Accumulator pool, allocated once and recirculated every round.
        let mut pool: Vec<Accumulator<T>> = (0..workers)
            .map(|_| Accumulator::new(k, dims))
            .collect();
        let mut global = Accumulator::new(k, dims);

        for iteration in 1..=iterations {
            for outbox in &outboxes {
                let scratch = pool.pop().expect("one scratch accumulator per worker");
                outbox
                    .send(ToWorker::Assign {
                        centroids: state.centroids.clone(),
                        scratch,
                    })
                    .expect("worker disconnected");
            }
            global.reset();
            for _ in 0..workers {
                let acc = partial_rx.recv().expect("worker disconnected");
                global.merge(&acc);
                pool.push(acc);
            }
            global.apply_to_centroids(&mut state.centroids);
            (config.iteration_done)(iteration, &state.centroids);
        }

        // Gather the final assignments back into partition order.
        for outbox in &outboxes {
            outbox.send(ToWorker::Finish).expect("worker disconnected");
        }
        for _ in 0..workers {
            let (worker, local) = report_rx.recv().expect("worker disconnected");
            state.assignments[ranges[worker].clone()].copy_from_slice(&local);
        }
        for handle in handles {
            handle.join().expect("worker panicked");
        }

        data.update_cluster_frequencies(&state.assignments, &mut state.centroid_frequency);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, KMeans, KMeansConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn matches_the_serial_engine_for_divisible_worker_counts() {
        // 12 samples in 2 dimensions, three loose blobs.
        let samples = vec![
            0, 1, 2, 0, 1, 2, 2, 2, //
            50, 52, 49, 50, 51, 48, 53, 50, //
            100, 99, 101, 100, 98, 102, 99, 99, //
        ];
        let kmean = KMeans::new(samples, 12, 2);
        let init = vec![0, 0, 50, 50, 100, 100];

        let reference = kmean.lloyd_serial(
            3,
            5,
            KMeans::init_precomputed(init.clone()),
            &KMeansConfig::default(),
        );
        for workers in [1, 2, 3, 4, 6, 12] {
            let result = kmean
                .lloyd_message(
                    3,
                    5,
                    workers,
                    KMeans::init_precomputed(init.clone()),
                    &KMeansConfig::default(),
                )
                .unwrap();
            assert_eq!(result.centroids, reference.centroids, "{} workers", workers);
            assert_eq!(result.assignments, reference.assignments);
            assert_eq!(result.centroid_frequency, reference.centroid_frequency);
        }
    }

    #[test]
    fn rejects_partitions_that_do_not_divide_evenly() {
        let kmean = KMeans::new(vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10], 10, 1);
        let err = kmean
            .lloyd_message(
                2,
                1,
                4,
                KMeans::init_precomputed(vec![0, 10]),
                &KMeansConfig::default(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidPartition {
                points: 10,
                workers: 4
            }
        ));
    }

    #[test]
    fn single_cluster_collapses_to_the_mean() {
        let kmean = KMeans::<i32>::new(vec![1, 2, 3, 4], 4, 1);
        let result = kmean
            .lloyd_message(
                1,
                1,
                2,
                KMeans::init_precomputed(vec![0]),
                &KMeansConfig::default(),
            )
            .unwrap();
        assert_eq!(result.centroids, vec![2]);
        assert_eq!(result.checksum(), 2);
        assert_eq!(result.assignments, vec![0, 0, 0, 0]);
    }

    #[test]
    fn empty_cluster_retains_its_previous_centroid() {
        let kmean = KMeans::<i32>::new(vec![5, 5, 5], 3, 1);
        let result = kmean
            .lloyd_message(
                2,
                1,
                3,
                KMeans::init_precomputed(vec![5, 999]),
                &KMeansConfig::default(),
            )
            .unwrap();
        assert_eq!(result.centroids, vec![5, 999]);
        assert_eq!(result.checksum(), 1004);
    }

    #[test]
    fn coordinator_reports_every_iteration() {
        let kmean = KMeans::new(vec![0, 100], 2, 1);
        let invocations = AtomicUsize::new(0);
        let count_iteration = |_: usize, _: &[i32]| {
            invocations.fetch_add(1, Ordering::Relaxed);
        };
        let config = KMeansConfig::build().iteration_done(&count_iteration).build();

        let result = kmean
            .lloyd_message(2, 6, 2, KMeans::init_precomputed(vec![0, 100]), &config)
            .unwrap();
        assert_eq!(invocations.load(Ordering::Relaxed), 6);
        assert_eq!(result.centroids, vec![0, 100]);
    }
}
