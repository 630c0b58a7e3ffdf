//! Grid Error Types

use crate::Dimensions;
use thiserror::Error;

/// Errors raised while constructing or loading a grid
#[derive(Debug, Error)]
pub enum GridError {
    /// Sample count does not match the declared dimensions
    #[error("Sample count mismatch: dimensions need {expected} samples, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// One of the axes has length zero
    #[error("Grid dimensions must be non-zero on every axis")]
    ZeroDimension,

    /// Sample count or byte size does not fit in memory addressing
    #[error("Grid dimensions {0} are too large to address")]
    TooLarge(Dimensions),

    /// Raw volume could not be read
    #[error("Volume I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for GridError {
    fn from(err: std::io::Error) -> Self {
        GridError::Io(err.to_string())
    }
}
