use crate::memory::Primitive;
use crate::{KMeans, KMeansConfig, KMeansState};

#[inline(always)]
pub fn calculate<T: Primitive>(
    kmean: &KMeans<T>,
    state: &mut KMeansState<T>,
    _config: &KMeansConfig<'_, T>,
    computed: Vec<T>,
) {
    assert_eq!(
        computed.len(),
        state.k * kmean.sample_dims,
        "Initialized with the wrong amount of centroid coordinates"
    );
    computed
        .chunks_exact(kmean.sample_dims)
        .enumerate()
        .for_each(|(ci, c)| {
            state.set_centroid_from_iter(ci, c.iter().cloned());
        });
}

#[cfg(test)]
mod tests {
    use crate::{KMeans, KMeansConfig};

    #[test]
    fn train_with_precomputed_centroids() {
        let samples = vec![0, 1, 10, 11, 20, 21];
        let centroids = vec![0, 21];

        let kmean = KMeans::new(samples, 6, 1);
        let result = kmean.lloyd_serial(
            2,
            10,
            KMeans::init_precomputed(centroids),
            &KMeansConfig::default(),
        );

        assert_eq!(result.centroids, vec![3, 17]);
    }
}
