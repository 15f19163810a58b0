//! # parmeans - API documentation
//!
//! Parmeans is a small rust library for parallel Lloyd k-means clustering
//! over integer datasets.
//!
//! ## Design target
//! The interesting problem this crate solves is not the clustering itself
//! but making the parallel decomposition produce exactly the same numeric
//! result as a sequential run. All arithmetic is integer: squared
//! Euclidean distances and per-cluster coordinate sums are computed in a
//! widened accumulator type, centroid means use truncating integer
//! division, and ties on exact equal distances deterministically go to the
//! lowest centroid index. Because integer addition is associative and
//! commutative, any reduction order over the per-worker partial sums
//! yields bit-identical centroids.
//!
//! The API-surface is intentionally plain: samples are given as one flat
//! row-major vector instead of any high-level matrix crate.
//!
//! ## Execution engines
//! The same assignment/reduction/update cycle ships in three realizations,
//! selectable per call (see [`KMeans`]):
//! - a sequential reference engine,
//! - a shared-memory engine using worker threads gated by two barriers per
//!   iteration (no locks or atomics on the hot path),
//! - a message-passing engine where spawned workers own their partitions
//!   and talk to a coordinator exclusively over channels.
//!
//! The engines always run the exact configured number of iterations; there
//! is no convergence detection and no early exit.
//!
//! ## Supported centroid initializations
//! Initialization is a pluggable collaborator passed by function
//! reference, like the rest of the configuration: see
//! [`KMeans::init_random_sample`] and [`KMeans::init_precomputed`].
//!
//! ## Supported primitive types
//! - [`i32`] (accumulating in i64)
//! - [`i64`] (accumulating in i128)
//!
//! ## Example
//! ```rust
//! use parmeans::*;
//!
//! let (sample_cnt, sample_dims, k, iterations) = (4, 1, 2, 3);
//! let samples = vec![1, 2, 102, 103];
//!
//! // Cluster on 2 worker threads, starting from fixed centroids
//! let kmean = KMeans::<i32>::new(samples, sample_cnt, sample_dims);
//! let result = kmean.lloyd_barrier(k, iterations, 2,
//!     KMeans::init_precomputed(vec![0, 100]), &KMeansConfig::default());
//!
//! assert_eq!(result.centroids, vec![1, 102]);
//! assert_eq!(result.assignments, vec![0, 0, 1, 1]);
//! assert_eq!(result.checksum(), 103);
//! ```
//!
//! ## Example (seeded random initialization and status callback)
//! ```rust
//! use parmeans::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let samples = vec![3, 1, 4, 1, 5, 9, 2, 6];
//!
//! let conf = KMeansConfig::build()
//!     .random_generator(StdRng::seed_from_u64(42))
//!     .iteration_done(&|nr, centroids| println!("Iteration {} -> {:?}", nr, centroids))
//!     .build();
//!
//! let kmean = KMeans::new(samples, 8, 1);
//! let result = kmean.lloyd_serial(2, 10, KMeans::init_random_sample, &conf);
//! println!("Centroids: {:?}", result.centroids);
//! ```
//!
//! ## Short API-Overview / Description
//! Entry-point of the library is the [`KMeans`] struct, generic over the
//! coordinate primitive. It takes ownership of the sample data; the
//! engine-methods ([`KMeans::lloyd_serial`], [`KMeans::lloyd_barrier`],
//! [`KMeans::lloyd_message`]) do not mutate it, so multiple runs can be
//! done against the same instance. Each run returns a [`KMeansState`]
//! with the final centroids, per-sample assignments, cluster frequencies
//! and the evaluation checksum.

mod accumulate;
mod api;
mod assign;
mod engines;
mod error;
mod inits;
pub mod io;
mod memory;
pub mod partition;

pub use accumulate::Accumulator;
pub use api::{
    IterationDoneCallbackFn, KMeans, KMeansConfig, KMeansConfigBuilder, KMeansState, UNASSIGNED,
};
pub use error::{Error, Result};
pub use memory::Primitive;
