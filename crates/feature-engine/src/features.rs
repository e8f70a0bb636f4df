//! Feature Vector Assembly

use crate::non_periodic::NonPeriodicFeature;
use crate::periodic::{PeriodicFeature, NUM_FREQUENCIES, NUM_HARMONICS};
use crate::periodogram::PeriodogramConfig;
use crate::FeatureError;
use light_curve::LightCurve;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of non-periodic features in the vector
const NON_PERIODIC_FEATURES: usize = 17;

/// Number of features in a non-placeholder vector
///
/// Per frequency: frequency, fundamental amplitude and the following
/// harmonic amplitudes; then the harmonic fit offset; then the
/// non-periodic features.
pub const FEATURE_DIMENSION: usize = NUM_FREQUENCIES * (1 + NUM_HARMONICS) + 1 + NON_PERIODIC_FEATURES;

/// Feature vector of one star in one filter
///
/// An empty vector is the placeholder stored for stars whose features
/// could not be computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Wrap raw values
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Empty vector marking a star without usable features
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// Assemble the vector from periodic and non-periodic features
    pub fn build(perfeat: &PeriodicFeature, noperfeat: &NonPeriodicFeature) -> Self {
        let mut values = Vec::with_capacity(FEATURE_DIMENSION);

        for n in 0..NUM_FREQUENCIES {
            values.push(perfeat.fund_freq(n));
            values.push(perfeat.amplitude(n));
            values.extend_from_slice(perfeat.amplitude_firsts_harm(n));
        }
        values.push(perfeat.freq_y_offset());

        values.push(noperfeat.amplitude_dif());
        values.push(noperfeat.beyond1st());
        values.push(noperfeat.linear_trend());
        values.push(noperfeat.max_slope());
        values.push(noperfeat.median_absolute_deviation());
        values.push(noperfeat.median_buffer_range_percentage());
        values.push(noperfeat.pair_slope_trend());
        values.push(noperfeat.percent_amplitude());
        values.push(noperfeat.percent_difference_flux_percentile());
        values.push(noperfeat.skew());
        values.push(noperfeat.kurtosis());
        values.push(noperfeat.std());
        values.push(noperfeat.flux_percentile_ratio_mid20());
        values.push(noperfeat.flux_percentile_ratio_mid35());
        values.push(noperfeat.flux_percentile_ratio_mid50());
        values.push(noperfeat.flux_percentile_ratio_mid65());
        values.push(noperfeat.flux_percentile_ratio_mid80());

        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether this is the placeholder of a disabled star
    pub fn is_placeholder(&self) -> bool {
        self.values.is_empty()
    }
}

/// Computes the feature vector of one light curve
pub trait StarFeatureCalculator {
    fn calculate(&mut self, curve: &LightCurve) -> Result<FeatureVector, FeatureError>;

    /// Settings that shape the vectors; cached features are only reused
    /// when this matches
    fn fingerprint(&self) -> String {
        String::new()
    }
}

/// Periodogram-based feature extractor
pub struct FeatureExtractor {
    config: PeriodogramConfig,
}

impl FeatureExtractor {
    /// Create a new feature extractor
    pub fn new(config: PeriodogramConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PeriodogramConfig {
        &self.config
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(PeriodogramConfig::default())
    }
}

impl StarFeatureCalculator for FeatureExtractor {
    fn calculate(&mut self, curve: &LightCurve) -> Result<FeatureVector, FeatureError> {
        let perfeat = PeriodicFeature::compute(curve, &self.config)?;
        let noperfeat = NonPeriodicFeature::compute(curve)?;

        debug!(
            "Extracted features from {} samples: f0={:.6}",
            curve.len(),
            perfeat.fund_freq(0)
        );

        Ok(FeatureVector::build(&perfeat, &noperfeat))
    }

    fn fingerprint(&self) -> String {
        format!("lomb-scargle {:?}", self.config)
    }
}
