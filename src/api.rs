use crate::engines;
use crate::error::Result;
use crate::memory::Primitive;
use num::Zero;
use rand::prelude::*;
use std::cell::RefCell;

/// Sentinel for samples that have not been through an assignment phase yet
/// (a run with zero iterations never assigns anything).
pub const UNASSIGNED: usize = usize::MAX;

pub type IterationDoneCallbackFn<'a, T> = &'a (dyn Fn(usize, &[T]) + Sync);

/// Configuration options for a k-means calculation: the random number
/// generator feeding the centroid initialization and a callback invoked
/// after every completed iteration.
///
/// For a more detailed description of the options, have a look at
/// [`KMeansConfigBuilder`].
pub struct KMeansConfig<'a, T: Primitive> {
    /// Callback that is called after each iteration's centroid update.
    /// ## Arguments
    /// - **iteration**: Number of the finished iteration (starting at 1)
    /// - **centroids**: The freshly updated centroids [row-major]
    ///
    /// The barrier engine invokes this from its leader thread, hence the
    /// `Sync` bound.
    pub(crate) iteration_done: IterationDoneCallbackFn<'a, T>,
    /// Random number generator used by the centroid initialization.
    pub(crate) rnd: Box<RefCell<dyn RngCore>>,
}

impl<'a, T: Primitive> Default for KMeansConfig<'a, T> {
    fn default() -> Self {
        Self {
            iteration_done: &|_, _| {},
            rnd: Box::new(RefCell::new(rand::thread_rng())),
        }
    }
}

impl<'a, T: Primitive> KMeansConfig<'a, T> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<'a, T> {
        KMeansConfigBuilder {
            config: KMeansConfig::default(),
        }
    }
}

impl<'a, T: Primitive> std::fmt::Debug for KMeansConfig<'a, T> {
    fn fmt(&self, _: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Ok(())
    }
}

pub struct KMeansConfigBuilder<'a, T: Primitive> {
    config: KMeansConfig<'a, T>,
}

impl<'a, T: Primitive> KMeansConfigBuilder<'a, T> {
    /// Set the callback that should be called after each iteration's
    /// centroid update.
    pub fn iteration_done(mut self, iteration_done: IterationDoneCallbackFn<'a, T>) -> Self {
        self.config.iteration_done = iteration_done;
        self
    }

    /// Set the random number generator that should be used for the centroid
    /// initialization. Use a seeded generator for deterministically
    /// repeatable results.
    pub fn random_generator<R: RngCore + 'static>(mut self, rnd: R) -> Self {
        self.config.rnd = Box::new(RefCell::new(rnd));
        self
    }

    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<'a, T> {
        self.config
    }
}

/// Final state of a k-means calculation, as returned by the engines.
///
/// ## Fields
/// - **k**: The amount of clusters that were requested for this result
/// - **centroids**: Calculated cluster centers [row-major] = [<centroid0>,<centroid1>,...]
/// - **centroid_frequency**: Amount of samples in each cluster after the last iteration
/// - **assignments**: Vector mapping each sample to its nearest cluster
///   ([`UNASSIGNED`] when the run had zero iterations)
#[derive(Clone, Debug)]
pub struct KMeansState<T: Primitive> {
    pub k: usize,
    pub centroids: Vec<T>,
    pub centroid_frequency: Vec<usize>,
    pub assignments: Vec<usize>,

    pub(crate) sample_dims: usize,
}

impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(sample_cnt: usize, sample_dims: usize, k: usize) -> Self {
        Self {
            k,
            centroids: vec![T::zero(); sample_dims * k],
            centroid_frequency: vec![0usize; k],
            assignments: vec![UNASSIGNED; sample_cnt],
            sample_dims,
        }
    }

    pub(crate) fn set_centroid_from_iter(&mut self, idx: usize, src: impl Iterator<Item = T>) {
        self.centroids
            .iter_mut()
            .skip(self.sample_dims * idx)
            .take(self.sample_dims)
            .zip(src)
            .for_each(|(c, s)| *c = s);
    }

    /// One centroid's coordinate row.
    pub fn centroid(&self, idx: usize) -> &[T] {
        &self.centroids[idx * self.sample_dims..(idx + 1) * self.sample_dims]
    }

    /// Sum of all centroid coordinates, widened. This is the single value
    /// the evaluation output format asks for.
    pub fn checksum(&self) -> T::Wide {
        self.centroids.iter().map(|&c| c.to_wide()).sum()
    }
}

/// Entrypoint of this crate's API-Surface.
///
/// Create an instance of this struct, giving the integer samples you want
/// to operate on as one flat row-major vector. The struct is immutable;
/// every engine run works on its own [`KMeansState`].
///
/// ## Execution engines
/// - Sequential reference [`KMeans::lloyd_serial`]
/// - Shared memory, barrier-gated threads [`KMeans::lloyd_barrier`]
/// - Message passing over channels [`KMeans::lloyd_message`]
///
/// ## Supported initialization methods
/// - Random-Sample (a.k.a. Forgy) [`KMeans::init_random_sample`]
/// - Precomputed centroids [`KMeans::init_precomputed`]
pub struct KMeans<T: Primitive> {
    pub(crate) sample_cnt: usize,
    pub(crate) sample_dims: usize,
    /// All coordinates, contiguous [row-major] = [<sample0>,<sample1>,...].
    /// Partitions are index ranges into this arena.
    pub(crate) samples: Vec<T>,
}

impl<T: Primitive> KMeans<T> {
    /// Create a new instance of the [`KMeans`] structure.
    ///
    /// ## Arguments
    /// - **samples**: Vector of samples [row-major] = [<sample0>,<sample1>,<sample2>,...]
    /// - **sample_cnt**: Amount of samples, contained in the passed **samples** vector
    /// - **sample_dims**: Amount of dimensions each sample from the **samples** vector has
    pub fn new(samples: Vec<T>, sample_cnt: usize, sample_dims: usize) -> Self {
        assert!(samples.len() == sample_cnt * sample_dims);
        Self {
            sample_cnt,
            sample_dims,
            samples,
        }
    }

    pub(crate) fn update_cluster_frequencies(
        &self,
        assignments: &[usize],
        centroid_frequency: &mut [usize],
    ) {
        centroid_frequency.iter_mut().for_each(|v| *v = 0);
        assignments
            .iter()
            .filter(|&&cluster| cluster != UNASSIGNED)
            .for_each(|&cluster| centroid_frequency[cluster] += 1);
    }

    /// Sequential Lloyd iteration, the reference both parallel engines are
    /// measured against.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **iterations**: Exact amount of iterations to run (there is no
    ///   convergence detection; the loop never exits early)
    /// - **init**: Initialization-Method to use for the initialization of the **k** centroids
    /// - **config**: [`KMeansConfig`] instance, containing configuration options for the calculation
    ///
    /// ## Returns
    /// Instance of [`KMeansState`], containing the final state (result).
    ///
    /// ## Example
    /// ```rust
    /// use parmeans::*;
    ///
    /// let kmean = KMeans::new(vec![1, 2, 3, 4], 4, 1);
    /// let result = kmean.lloyd_serial(1, 1, KMeans::init_precomputed(vec![0]), &KMeansConfig::default());
    /// assert_eq!(result.centroids, vec![2]);
    /// ```
    pub fn lloyd_serial<'a, F>(
        &self,
        k: usize,
        iterations: usize,
        init: F,
        config: &KMeansConfig<'a, T>,
    ) -> KMeansState<T>
    where
        for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>),
    {
        engines::Serial::calculate(self, k, iterations, init, config)
    }

    /// Lloyd iteration over `threads` worker threads sharing this struct's
    /// sample arena, synchronized by two barriers per iteration. Arbitrary
    /// sample counts are supported; the first `sample_cnt % threads`
    /// workers own one extra sample.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **iterations**: Exact amount of iterations to run
    /// - **threads**: Amount of worker threads to spawn
    /// - **init**: Initialization-Method to use for the initialization of the **k** centroids
    /// - **config**: [`KMeansConfig`] instance, containing configuration options for the calculation
    ///
    /// ## Returns
    /// Instance of [`KMeansState`], containing the final state (result).
    pub fn lloyd_barrier<'a, F>(
        &self,
        k: usize,
        iterations: usize,
        threads: usize,
        init: F,
        config: &KMeansConfig<'a, T>,
    ) -> KMeansState<T>
    where
        for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>),
    {
        engines::BarrierGated::calculate(self, k, iterations, threads, init, config)
    }

    /// Lloyd iteration over `workers` spawned workers that own their
    /// partitions outright and communicate with the coordinating thread
    /// only through channels.
    ///
    /// Unlike [`KMeans::lloyd_barrier`], this engine transfers whole
    /// partitions to its workers and requires the sample count to divide
    /// evenly: it fails with [`Error::InvalidPartition`] otherwise.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **iterations**: Exact amount of iterations to run
    /// - **workers**: Amount of workers to spawn (`sample_cnt % workers` must be 0)
    /// - **init**: Initialization-Method to use for the initialization of the **k** centroids
    /// - **config**: [`KMeansConfig`] instance, containing configuration options for the calculation
    ///
    /// ## Returns
    /// Instance of [`KMeansState`], containing the final state (result).
    ///
    /// [`Error::InvalidPartition`]: crate::Error::InvalidPartition
    pub fn lloyd_message<'a, F>(
        &self,
        k: usize,
        iterations: usize,
        workers: usize,
        init: F,
        config: &KMeansConfig<'a, T>,
    ) -> Result<KMeansState<T>>
    where
        for<'c> F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>),
    {
        engines::MessagePassing::calculate(self, k, iterations, workers, init, config)
    }

    /// Random sample initialization method (a.k.a. Forgy).
    ///
    /// ## Description
    /// This initialization method randomly selects k samples from the
    /// dataset as initial centroids, using the generator from the passed
    /// [`KMeansConfig`].
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to
    /// it to an instance-method of [`KMeans`].
    pub fn init_random_sample<'a>(
        kmean: &KMeans<T>,
        state: &mut KMeansState<T>,
        config: &KMeansConfig<'a, T>,
    ) {
        crate::inits::randomsample::calculate(kmean, state, config);
    }

    /// Precomputed initialization method.
    ///
    /// ## Description
    /// Seeds the calculation with externally chosen centroids, given as one
    /// flat row-major vector of `k * sample_dims` coordinates.
    pub fn init_precomputed(
        computed: Vec<T>,
    ) -> impl FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'_, T>) {
        move |kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>| {
            crate::inits::precomputed::calculate(kmean, state, config, computed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_sums_all_centroid_coordinates() {
        let mut state = KMeansState::<i32>::new(1, 2, 2);
        state.set_centroid_from_iter(0, [5, -2].into_iter());
        state.set_centroid_from_iter(1, [999, 0].into_iter());
        assert_eq!(state.checksum(), 1002);
        assert_eq!(state.centroid(1), &[999, 0]);
    }

    #[test]
    fn frequencies_skip_unassigned_samples() {
        let kmean = KMeans::new(vec![0, 0, 0], 3, 1);
        let mut freq = vec![0; 2];
        kmean.update_cluster_frequencies(&[1, UNASSIGNED, 1], &mut freq);
        assert_eq!(freq, vec![0, 2]);
    }

    #[test]
    fn fresh_state_is_unassigned() {
        let state = KMeansState::<i32>::new(4, 3, 2);
        assert!(state.assignments.iter().all(|&a| a == UNASSIGNED));
        assert_eq!(state.centroids.len(), 6);
    }
}
