//! Light Curve Container

use crate::LightCurveError;
use serde::{Deserialize, Serialize};

/// A single photometric measurement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Observation time
    pub time: f64,
    /// Measured magnitude
    pub magnitude: f64,
    /// Magnitude uncertainty
    pub error: f64,
}

impl Sample {
    pub fn new(time: f64, magnitude: f64, error: f64) -> Self {
        Self {
            time,
            magnitude,
            error,
        }
    }
}

/// Validated, strictly time-ordered sequence of samples
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightCurve {
    samples: Vec<Sample>,
}

impl LightCurve {
    /// Build a curve, rejecting non-finite values and non-increasing times
    pub fn new(samples: Vec<Sample>) -> Result<Self, LightCurveError> {
        if samples.is_empty() {
            return Err(LightCurveError::Malformed("curve has no samples".to_string()));
        }

        for (i, s) in samples.iter().enumerate() {
            if !s.time.is_finite() || !s.magnitude.is_finite() || !s.error.is_finite() {
                return Err(LightCurveError::Malformed(format!(
                    "non-finite value at sample {}",
                    i
                )));
            }
        }

        if let Some(i) = samples.windows(2).position(|w| w[1].time <= w[0].time) {
            return Err(LightCurveError::Malformed(format!(
                "times not strictly increasing at sample {}",
                i + 1
            )));
        }

        Ok(Self { samples })
    }

    /// Build a curve from parallel time/magnitude/error columns
    pub fn from_columns(
        times: &[f64],
        magnitudes: &[f64],
        errors: &[f64],
    ) -> Result<Self, LightCurveError> {
        if times.len() != magnitudes.len() || times.len() != errors.len() {
            return Err(LightCurveError::Malformed(format!(
                "column lengths differ: {} times, {} magnitudes, {} errors",
                times.len(),
                magnitudes.len(),
                errors.len()
            )));
        }

        let samples = times
            .iter()
            .zip(magnitudes)
            .zip(errors)
            .map(|((&t, &m), &e)| Sample::new(t, m, e))
            .collect();

        Self::new(samples)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Observation times
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// Magnitudes
    pub fn magnitudes(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.magnitude).collect()
    }

    /// Time between first and last sample
    pub fn time_span(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_curve() {
        let curve = LightCurve::from_columns(&[0.0, 1.0, 2.5], &[12.1, 12.3, 12.0], &[0.01; 3])
            .unwrap();
        assert_eq!(curve.len(), 3);
        assert!((curve.time_span() - 2.5).abs() < 1e-12);
        assert_eq!(curve.magnitudes(), vec![12.1, 12.3, 12.0]);
    }

    #[test]
    fn test_column_length_mismatch() {
        let result = LightCurve::from_columns(&[0.0, 1.0], &[12.0], &[0.01, 0.01]);
        assert!(matches!(result, Err(LightCurveError::Malformed(_))));
    }

    #[test]
    fn test_empty_curve_rejected() {
        assert!(LightCurve::new(Vec::new()).is_err());
    }

    #[test]
    fn test_unordered_times_rejected() {
        let result = LightCurve::from_columns(&[0.0, 2.0, 1.0], &[1.0; 3], &[0.1; 3]);
        assert!(matches!(result, Err(LightCurveError::Malformed(_))));
    }

    #[test]
    fn test_nan_rejected() {
        let result = LightCurve::from_columns(&[0.0, 1.0], &[1.0, f64::NAN], &[0.1; 2]);
        assert!(result.is_err());
    }
}
