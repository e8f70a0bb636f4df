//! Storage Layer
//!
//! Persists computed feature sets so a second run over the same light-curve
//! source can skip feature extraction.

mod feature_set;
mod store;

pub use feature_set::{FeatureSet, FEATURE_SET_VERSION};
pub use store::{FeatureStore, FileFeatureStore, MemoryFeatureStore};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("No feature set stored under '{0}'")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Feature set version {found} does not match expected {expected}")]
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<postcard::Error> for StorageError {
    fn from(err: postcard::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
