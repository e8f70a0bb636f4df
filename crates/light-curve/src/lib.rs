//! Light Curves
//!
//! Time-ordered photometry for a single star in a single filter, plus the
//! `LightCurveSource` seam through which the feature pipeline reads curves.

mod curve;
mod database;

pub use curve::{LightCurve, Sample};
pub use database::CurveDatabase;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable identifier of a star in the source database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StarId(pub u64);

impl fmt::Display for StarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Photometric filter identifier (e.g. "V", "R", "Halpha")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotometricFilter(String);

impl PhotometricFilter {
    /// Create a filter from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Filter name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotometricFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhotometricFilter {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Errors raised while retrieving a light curve
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LightCurveError {
    /// The source has no curve for this star and filter
    #[error("No light curve for star {star} in filter {filter}")]
    Missing {
        star: StarId,
        filter: PhotometricFilter,
    },

    /// The curve exists but its shape or contents are unusable
    #[error("Malformed light curve: {0}")]
    Malformed(String),

    /// The backing database could not be read
    #[error("Light curve database error: {0}")]
    Database(String),
}

impl From<std::io::Error> for LightCurveError {
    fn from(err: std::io::Error) -> Self {
        LightCurveError::Database(err.to_string())
    }
}

/// A database of light curves, addressed by star and filter
pub trait LightCurveSource {
    /// Identity of the source, used as the feature cache key
    fn identity(&self) -> &str;

    /// Filters present in the source, in discovery order
    fn filters(&self) -> Vec<PhotometricFilter>;

    /// Retrieve the light curve of `star` in `filter`
    fn light_curve(
        &self,
        star: StarId,
        filter: &PhotometricFilter,
    ) -> Result<LightCurve, LightCurveError>;
}
