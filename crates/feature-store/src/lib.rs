//! Feature Storage
//!
//! Serializes feature lists and keeps named snapshots for downstream consumers.

mod codec;
mod repository;

pub use codec::{
    decode_compact, decode_fixed, encode_compact, encode_fixed, read_features, write_features,
    Encoding, RECORD_BYTES,
};
pub use repository::FeatureRepository;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input ended after {read} of {expected} records")]
    Truncated { expected: u64, read: u64 },
    #[error("Record {position} breaks ascending voxel order")]
    Unsorted { position: usize },
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Snapshot not found: {0}")]
    NotFound(String),
    #[error("Repository lock poisoned: {0}")]
    Lock(String),
}
