//! Star Class Registry
//!
//! Owns the ordered list of labeled stars, the photometric filters
//! discovered in the light-curve source, and one feature list per filter
//! indexed positionally by star order.

mod filters;
mod loader;
mod registry;

pub use filters::{FilterIndex, FilterSet};
pub use registry::{StarClasses, StarIndex, StarInstance};

use light_curve::StarId;
use thiserror::Error;

/// Registry errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("Star {0} is already registered")]
    DuplicateStar(StarId),

    #[error("Star {0} is not registered")]
    UnknownStar(StarId),

    #[error("Filter index {0} is not registered")]
    UnknownFilter(FilterIndex),

    /// A non-empty vector whose length differs from the registry's
    #[error("Feature length mismatch in filter {filter}: expected {expected}, got {actual}")]
    FeatureLengthMismatch {
        filter: FilterIndex,
        expected: usize,
        actual: usize,
    },

    #[error("Placeholder feature for enabled star {star} in filter {filter}")]
    PlaceholderForEnabledStar { filter: FilterIndex, star: StarId },

    #[error("Filter {0} already holds a feature for every star")]
    FilterFull(FilterIndex),

    #[error("Stars file line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Stars file error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::Io(err.to_string())
    }
}
