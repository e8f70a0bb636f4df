//! Feature Pipeline
//!
//! Drives feature extraction over every star and filter of a light-curve
//! source, isolating per-star failures so that positional alignment of the
//! per-filter feature lists is never lost.

mod cache;
mod orchestrator;

pub use orchestrator::{PipelineReport, StarsFeatures};

use feature_engine::FeatureError;
use light_curve::LightCurveError;
use star_classes::{FilterIndex, RegistryError, StarIndex};
use storage::StorageError;
use thiserror::Error;

/// Why features of a single star could not be computed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StarFailure {
    #[error(transparent)]
    Curve(#[from] LightCurveError),

    #[error(transparent)]
    Feature(#[from] FeatureError),
}

/// Errors that abort a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Features have already been calculated for this registry")]
    AlreadyCalculated,

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Feature cache error: {0}")]
    Storage(#[from] StorageError),

    #[error("Feature of star {expected} in filter {filter} was stored at slot {actual}")]
    SlotMisaligned {
        filter: FilterIndex,
        expected: StarIndex,
        actual: StarIndex,
    },
}
