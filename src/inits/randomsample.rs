use crate::memory::Primitive;
use crate::{KMeans, KMeansConfig, KMeansState};
use rand::prelude::*;
use std::ops::DerefMut;

#[inline(always)]
pub fn calculate<'a, T: Primitive>(
    kmean: &KMeans<T>,
    state: &mut KMeansState<T>,
    config: &KMeansConfig<'a, T>,
) {
    kmean
        .samples
        .chunks_exact(kmean.sample_dims)
        .choose_multiple(config.rnd.borrow_mut().deref_mut(), state.k)
        .iter()
        .cloned()
        .enumerate()
        .for_each(|(ci, c)| {
            // Copy randomly chosen samples into state.centroids
            state.set_centroid_from_iter(ci, c.iter().cloned());
        });
}
