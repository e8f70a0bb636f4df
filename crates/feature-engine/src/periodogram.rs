//! Lomb-Scargle Periodogram

use crate::statistics::median;
use crate::FeatureError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Frequency grid settings for the periodogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodogramConfig {
    /// Lowest frequency searched (default: 1 / time span)
    pub min_frequency: Option<f64>,
    /// Highest frequency searched (default: 0.5 / median sampling interval)
    pub max_frequency: Option<f64>,
    /// Grid points per 1 / time span
    pub oversampling: f64,
    /// Upper bound on grid size
    pub max_grid_points: usize,
}

impl Default for PeriodogramConfig {
    fn default() -> Self {
        Self {
            min_frequency: None,
            max_frequency: None,
            oversampling: 5.0,
            max_grid_points: 20_000,
        }
    }
}

/// Power over a linear frequency grid
#[derive(Debug, Clone, Default)]
pub struct Periodogram {
    /// Grid frequencies (cycles per time unit)
    pub frequencies: Vec<f64>,
    /// Power at each frequency
    pub power: Vec<f64>,
}

impl Periodogram {
    /// Classical Lomb-Scargle power of `values` sampled at `times`
    ///
    /// `times` must be strictly increasing with a positive span.
    pub fn compute(
        times: &[f64],
        values: &[f64],
        config: &PeriodogramConfig,
    ) -> Result<Self, FeatureError> {
        let frequencies = Self::frequency_grid(times, config)?;

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let centered: Vec<f64> = values.iter().map(|v| v - mean).collect();

        let power = frequencies
            .iter()
            .map(|&f| Self::power_at(times, &centered, 2.0 * PI * f))
            .collect();

        Ok(Self { frequencies, power })
    }

    fn frequency_grid(times: &[f64], config: &PeriodogramConfig) -> Result<Vec<f64>, FeatureError> {
        let span = match (times.first(), times.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        };
        if span <= 0.0 {
            return Err(FeatureError::DegenerateFrequencyRange { min: 0.0, max: 0.0 });
        }

        let intervals: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
        let f_min = config.min_frequency.unwrap_or(1.0 / span);
        let f_max = config
            .max_frequency
            .unwrap_or_else(|| 0.5 / median(&intervals));

        if !(f_max > f_min) || !f_min.is_finite() || !f_max.is_finite() {
            return Err(FeatureError::DegenerateFrequencyRange {
                min: f_min,
                max: f_max,
            });
        }

        let mut step = 1.0 / (config.oversampling.max(1.0) * span);
        let mut points = ((f_max - f_min) / step).floor() as usize + 1;
        let max_points = config.max_grid_points.max(2);
        if points > max_points {
            step = (f_max - f_min) / (max_points - 1) as f64;
            points = max_points;
        }

        debug!(
            "Frequency grid: [{:.6}, {:.6}] step {:.6} ({} points)",
            f_min, f_max, step, points
        );

        Ok((0..points).map(|i| f_min + i as f64 * step).collect())
    }

    fn power_at(times: &[f64], centered: &[f64], omega: f64) -> f64 {
        let (s2, c2) = times.iter().fold((0.0, 0.0), |(s, c), &t| {
            let arg = 2.0 * omega * t;
            (s + arg.sin(), c + arg.cos())
        });
        let tau = s2.atan2(c2) / (2.0 * omega);

        let mut yc = 0.0;
        let mut ys = 0.0;
        let mut cc = 0.0;
        let mut ss = 0.0;
        for (&t, &y) in times.iter().zip(centered) {
            let arg = omega * (t - tau);
            let (sin, cos) = arg.sin_cos();
            yc += y * cos;
            ys += y * sin;
            cc += cos * cos;
            ss += sin * sin;
        }

        let cos_term = if cc > f64::EPSILON { yc * yc / cc } else { 0.0 };
        let sin_term = if ss > f64::EPSILON { ys * ys / ss } else { 0.0 };
        0.5 * (cos_term + sin_term)
    }

    /// Frequency and power of the highest peak
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.power
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((i, p)),
            })
            .map(|(i, p)| (self.frequencies[i], p))
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uneven_times(n: usize) -> Vec<f64> {
        // Deterministic jitter so the sampling is not uniform
        (0..n)
            .map(|i| i as f64 * 0.37 + 0.11 * ((i * 7919) % 13) as f64 / 13.0)
            .collect()
    }

    #[test]
    fn test_sine_peak_recovered() {
        let times = uneven_times(300);
        let frequency = 0.42;
        let values: Vec<f64> = times
            .iter()
            .map(|t| 15.0 + 0.8 * (2.0 * PI * frequency * t).sin())
            .collect();

        let pgram = Periodogram::compute(&times, &values, &PeriodogramConfig::default()).unwrap();
        let (peak, _) = pgram.peak().unwrap();

        assert!((peak - frequency).abs() < 0.01, "peak at {}", peak);
    }

    #[test]
    fn test_explicit_frequency_range() {
        let times = uneven_times(50);
        let values = vec![1.0; 50];
        let config = PeriodogramConfig {
            min_frequency: Some(0.1),
            max_frequency: Some(0.5),
            max_grid_points: 11,
            ..Default::default()
        };

        let pgram = Periodogram::compute(&times, &values, &config).unwrap();
        assert_eq!(pgram.len(), 11);
        assert!((pgram.frequencies[0] - 0.1).abs() < 1e-12);
        assert!((pgram.frequencies[10] - 0.5).abs() < 1e-9);
        // Constant signal carries no power
        assert!(pgram.power.iter().all(|p| p.abs() < 1e-12));
    }

    #[test]
    fn test_degenerate_range() {
        let times = uneven_times(20);
        let values = vec![0.0; 20];
        let config = PeriodogramConfig {
            min_frequency: Some(2.0),
            max_frequency: Some(1.0),
            ..Default::default()
        };
        assert!(matches!(
            Periodogram::compute(&times, &values, &config),
            Err(FeatureError::DegenerateFrequencyRange { .. })
        ));
    }
}
