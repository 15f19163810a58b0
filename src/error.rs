use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions. None of these is recoverable: the run aborts, no
/// partial result is produced.
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot read dataset '{}': {source}", path.display())]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset: expected {expected} integer values, got {got}")]
    InputMalformed { expected: usize, got: usize },

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{points} points cannot be split evenly across {workers} workers")]
    InvalidPartition { points: usize, workers: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
