//! Dataset loading and result rendering. Simple wrappers around the core:
//! nothing here depends on the concurrency model.

use crate::error::{Error, Result};
use crate::memory::Primitive;
use crate::KMeansState;
use std::fmt::Write;
use std::fs;
use std::path::Path;

/// Reads a whitespace-separated integer dataset: exactly
/// `sample_cnt * sample_dims` values, interpreted row-major. Fewer
/// parseable values than that is fatal; trailing extra values are ignored.
pub fn read_dataset<T: Primitive>(
    path: &Path,
    sample_cnt: usize,
    sample_dims: usize,
) -> Result<Vec<T>> {
    let contents = fs::read_to_string(path).map_err(|source| Error::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let expected = sample_cnt * sample_dims;
    let mut values = Vec::with_capacity(expected);
    for token in contents.split_whitespace() {
        if values.len() == expected {
            break;
        }
        match token.parse::<T>() {
            Ok(value) => values.push(value),
            Err(_) => {
                return Err(Error::InputMalformed {
                    expected,
                    got: values.len(),
                })
            }
        }
    }
    if values.len() < expected {
        return Err(Error::InputMalformed {
            expected,
            got: values.len(),
        });
    }
    Ok(values)
}

/// Human-readable rendering of the final centroids, one bracketed line per
/// cluster. This is a secondary report; the machine-parsed output is the
/// two-line time/checksum format produced by the binary.
pub fn render_centroids<T: Primitive>(state: &KMeansState<T>) -> String {
    let mut out = String::new();
    for idx in 0..state.k {
        let coords: Vec<String> = state
            .centroid(idx)
            .iter()
            .map(|coord| coord.to_string())
            .collect();
        let _ = writeln!(out, "Centroid {}: [{}]", idx, coords.join(", "));
    }
    out
}
