//! Periodic Features by Iterative Harmonic Prewhitening
//!
//! For each fundamental frequency the periodogram peak of the current
//! residual is located, a harmonic series is fitted at that frequency by
//! least squares, and the fit is subtracted before searching for the next
//! frequency.

use crate::periodogram::{Periodogram, PeriodogramConfig};
use crate::{FeatureError, MIN_SAMPLES};
use light_curve::LightCurve;
use ndarray::{Array1, Array2};
use std::f64::consts::PI;
use tracing::debug;

/// Number of fundamental frequencies extracted per curve
pub const NUM_FREQUENCIES: usize = 3;

/// Number of harmonics fitted per frequency (the fundamental included)
pub const NUM_HARMONICS: usize = 4;

/// Harmonic series fitted at one fundamental frequency
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicFit {
    /// Fundamental frequency
    pub frequency: f64,
    /// Constant term of the fit
    pub offset: f64,
    /// Amplitude of each harmonic, fundamental first
    pub amplitudes: [f64; NUM_HARMONICS],
}

impl HarmonicFit {
    /// Least-squares fit of `c + Σ a_j sin(2πjft) + b_j cos(2πjft)`
    fn fit(times: &[f64], values: &[f64], frequency: f64) -> Result<(Self, Vec<f64>), FeatureError> {
        let params = 1 + 2 * NUM_HARMONICS;
        let mut design = Array2::<f64>::zeros((times.len(), params));

        for (row, &t) in times.iter().enumerate() {
            design[[row, 0]] = 1.0;
            for j in 0..NUM_HARMONICS {
                let arg = 2.0 * PI * (j + 1) as f64 * frequency * t;
                design[[row, 1 + 2 * j]] = arg.sin();
                design[[row, 2 + 2 * j]] = arg.cos();
            }
        }

        let y = Array1::from_vec(values.to_vec());
        let normal = design.t().dot(&design);
        let rhs = design.t().dot(&y);
        let coef = solve(normal, rhs).ok_or(FeatureError::SingularFit(frequency))?;

        let mut amplitudes = [0.0; NUM_HARMONICS];
        for (j, amplitude) in amplitudes.iter_mut().enumerate() {
            let a = coef[1 + 2 * j];
            let b = coef[2 + 2 * j];
            *amplitude = (a * a + b * b).sqrt();
        }

        let fitted = design.dot(&coef);
        let residual = values.iter().zip(fitted.iter()).map(|(v, f)| v - f).collect();

        Ok((
            Self {
                frequency,
                offset: coef[0],
                amplitudes,
            },
            residual,
        ))
    }
}

/// Solve `a x = b` by Gaussian elimination with partial pivoting
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    let scale = a.iter().fold(0.0_f64, |m, v| m.max(v.abs())).max(1.0);

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() < 1e-12 * scale {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Some(x)
}

/// Fundamental frequencies and harmonic amplitudes of a light curve
#[derive(Debug, Clone)]
pub struct PeriodicFeature {
    fits: Vec<HarmonicFit>,
    periodogram: Periodogram,
}

impl PeriodicFeature {
    /// Extract `NUM_FREQUENCIES` harmonic fits from the curve
    pub fn compute(curve: &LightCurve, config: &PeriodogramConfig) -> Result<Self, FeatureError> {
        if curve.len() < MIN_SAMPLES {
            return Err(FeatureError::InsufficientSamples {
                required: MIN_SAMPLES,
                actual: curve.len(),
            });
        }

        // Relative times keep the trigonometric arguments well conditioned
        let t0 = curve.samples()[0].time;
        let times: Vec<f64> = curve.times().iter().map(|t| t - t0).collect();
        let mut residual = curve.magnitudes();

        let periodogram = Periodogram::compute(&times, &residual, config)?;
        let mut fits = Vec::with_capacity(NUM_FREQUENCIES);

        for n in 0..NUM_FREQUENCIES {
            let pgram = if n == 0 {
                periodogram.clone()
            } else {
                Periodogram::compute(&times, &residual, config)?
            };
            let (frequency, power) = pgram
                .peak()
                .ok_or(FeatureError::DegenerateFrequencyRange { min: 0.0, max: 0.0 })?;

            let (fit, next) = HarmonicFit::fit(&times, &residual, frequency)?;
            debug!(
                "Frequency {}: f={:.6} power={:.4} amplitude={:.4}",
                n, frequency, power, fit.amplitudes[0]
            );

            fits.push(fit);
            residual = next;
        }

        Ok(Self { fits, periodogram })
    }

    /// Fundamental frequency `n`
    pub fn fund_freq(&self, n: usize) -> f64 {
        self.fits[n].frequency
    }

    /// Amplitude of the fundamental at frequency `n`
    pub fn amplitude(&self, n: usize) -> f64 {
        self.fits[n].amplitudes[0]
    }

    /// Amplitudes of the harmonics after the fundamental at frequency `n`
    pub fn amplitude_firsts_harm(&self, n: usize) -> &[f64] {
        &self.fits[n].amplitudes[1..]
    }

    /// Constant offset of the first harmonic fit
    pub fn freq_y_offset(&self) -> f64 {
        self.fits[0].offset
    }

    pub fn fits(&self) -> &[HarmonicFit] {
        &self.fits
    }

    /// Periodogram of the original (not prewhitened) curve
    pub fn periodogram(&self) -> &Periodogram {
        &self.periodogram
    }
}
