use crate::accumulate::Accumulator;
use crate::assign;
use crate::memory::Primitive;
use crate::{KMeans, KMeansConfig, KMeansState};

/// Single-threaded reference driver: one accumulator covers the whole
/// arena, so assignment and reduction collapse into a single pass.
pub(crate) struct Serial<T: Primitive> {
    _p: std::marker::PhantomData<T>,
}

impl<T: Primitive> Serial<T> {
    pub fn calculate<'a, F>(
        data: &KMeans<T>,
        k: usize,
        iterations: usize,
        init: F,
        config: &KMeansConfig<'a, T>,
    ) -> KMeansState<T>
    where
        for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>),
    {
        assert!(k >= 1 && k <= data.sample_cnt);

        let mut state = KMeansState::new(data.sample_cnt, data.sample_dims, k);
        init(data, &mut state, config);

        let mut acc = Accumulator::new(k, data.sample_dims);
        for iteration in 1..=iterations {
            acc.reset();
            assign::assign_rows(
                &data.samples,
                data.sample_dims,
                &state.centroids,
                &mut state.assignments,
                &mut acc,
            );
            acc.apply_to_centroids(&mut state.centroids);
            (config.iteration_done)(iteration, &state.centroids);
        }

        data.update_cluster_frequencies(&state.assignments, &mut state.centroid_frequency);
        state
    }
}

#[cfg(test)]
mod tests {
    use crate::{KMeans, KMeansConfig, UNASSIGNED};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn single_cluster_collapses_to_the_mean() {
        let kmean = KMeans::<i32>::new(vec![1, 2, 3, 4], 4, 1);
        let result = kmean.lloyd_serial(
            1,
            1,
            KMeans::init_precomputed(vec![0]),
            &KMeansConfig::default(),
        );
        // sum 10 over 4 samples, truncating division
        assert_eq!(result.centroids, vec![2]);
        assert_eq!(result.centroid_frequency, vec![4]);
        assert_eq!(result.assignments, vec![0, 0, 0, 0]);
        assert_eq!(result.checksum(), 2);
    }

    #[test]
    fn separated_samples_keep_their_centroids() {
        let kmean = KMeans::<i32>::new(vec![0, 100], 2, 1);
        let result = kmean.lloyd_serial(
            2,
            1,
            KMeans::init_precomputed(vec![0, 100]),
            &KMeansConfig::default(),
        );
        assert_eq!(result.centroids, vec![0, 100]);
        assert_eq!(result.centroid_frequency, vec![1, 1]);
        assert_eq!(result.checksum(), 100);
    }

    #[test]
    fn empty_cluster_retains_its_previous_centroid() {
        let kmean = KMeans::<i32>::new(vec![5, 5, 5], 3, 1);
        let result = kmean.lloyd_serial(
            2,
            1,
            KMeans::init_precomputed(vec![5, 999]),
            &KMeansConfig::default(),
        );
        assert_eq!(result.centroids, vec![5, 999]);
        assert_eq!(result.centroid_frequency, vec![3, 0]);
        assert_eq!(result.checksum(), 1004);
    }

    #[test]
    fn runs_exactly_the_requested_iterations() {
        // The assignments of this dataset stabilize after the very first
        // iteration; the loop must still run all of them.
        let kmean = KMeans::new(vec![1, 2, 102, 103], 4, 1);
        let invocations = AtomicUsize::new(0);
        let count_iteration = |_: usize, _: &[i32]| {
            invocations.fetch_add(1, Ordering::Relaxed);
        };
        let config = KMeansConfig::build().iteration_done(&count_iteration).build();

        let result = kmean.lloyd_serial(2, 7, KMeans::init_precomputed(vec![0, 100]), &config);
        assert_eq!(invocations.load(Ordering::Relaxed), 7);
        assert_eq!(result.centroids, vec![1, 102]);
    }

    #[test]
    fn zero_iterations_leave_the_initial_centroids() {
        let kmean = KMeans::new(vec![1, 2, 3, 4], 4, 1);
        let result = kmean.lloyd_serial(
            2,
            0,
            KMeans::init_precomputed(vec![-7, 42]),
            &KMeansConfig::default(),
        );
        assert_eq!(result.centroids, vec![-7, 42]);
        assert!(result.assignments.iter().all(|&a| a == UNASSIGNED));
        assert_eq!(result.centroid_frequency, vec![0, 0]);
    }

    #[test]
    fn multi_dimensional_clusters_settle() {
        // Two well separated 2d blobs.
        let samples = vec![0, 1, 1, 0, 10, 11, 11, 10];
        let kmean = KMeans::new(samples, 4, 2);
        let result = kmean.lloyd_serial(
            2,
            5,
            KMeans::init_precomputed(vec![0, 0, 10, 10]),
            &KMeansConfig::default(),
        );
        assert_eq!(result.centroids, vec![0, 0, 10, 10]);
        assert_eq!(result.assignments, vec![0, 0, 1, 1]);
    }
}
