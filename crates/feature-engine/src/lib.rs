//! Feature Engineering Engine
//!
//! Provides Lomb-Scargle periodograms, periodic (harmonic) and non-periodic
//! (statistical) light-curve features, and assembly of the fixed-layout
//! feature vector used by the classifier.

mod features;
mod non_periodic;
mod periodic;
mod periodogram;
mod statistics;

pub use features::{FeatureExtractor, FeatureVector, StarFeatureCalculator, FEATURE_DIMENSION};
pub use non_periodic::NonPeriodicFeature;
pub use periodic::{HarmonicFit, PeriodicFeature, NUM_FREQUENCIES, NUM_HARMONICS};
pub use periodogram::{Periodogram, PeriodogramConfig};
pub use statistics::{percentile, Moments};

use thiserror::Error;

/// Minimum number of samples for a curve to be featurized
pub const MIN_SAMPLES: usize = 2 * NUM_HARMONICS + 3;

/// Errors during feature computation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// Not enough samples to fit the harmonic model
    #[error("Too few samples: got {actual}, need at least {required}")]
    InsufficientSamples { required: usize, actual: usize },

    /// Frequency grid would be empty
    #[error("Degenerate frequency range [{min}, {max}]")]
    DegenerateFrequencyRange { min: f64, max: f64 },

    /// Least-squares harmonic fit has no unique solution
    #[error("Singular harmonic fit at frequency {0}")]
    SingularFit(f64),
}
