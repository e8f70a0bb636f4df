//! Non-Periodic Light-Curve Features

use crate::statistics::{median, percentile, sorted, Moments};
use crate::FeatureError;
use light_curve::LightCurve;

/// Distribution and trend statistics of a light curve's magnitudes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NonPeriodicFeature {
    amplitude_dif: f64,
    beyond1st: f64,
    linear_trend: f64,
    max_slope: f64,
    median_absolute_deviation: f64,
    median_buffer_range_percentage: f64,
    pair_slope_trend: f64,
    percent_amplitude: f64,
    percent_difference_flux_percentile: f64,
    skew: f64,
    kurtosis: f64,
    std: f64,
    /// Flux percentile ratios mid20, mid35, mid50, mid65, mid80
    flux_percentile_ratios: [f64; 5],
}

/// Half-widths (in percentile points) of the mid-range ratios
const MID_HALF_WIDTHS: [f64; 5] = [10.0, 17.5, 25.0, 32.5, 40.0];

fn ratio(num: f64, den: f64) -> f64 {
    if den.abs() > f64::EPSILON {
        num / den
    } else {
        0.0
    }
}

impl NonPeriodicFeature {
    pub fn compute(curve: &LightCurve) -> Result<Self, FeatureError> {
        if curve.len() < 2 {
            return Err(FeatureError::InsufficientSamples {
                required: 2,
                actual: curve.len(),
            });
        }

        let times = curve.times();
        let mags = curve.magnitudes();
        let n = mags.len() as f64;

        let moments = Moments::compute(&mags);
        let sorted_mags = sorted(&mags);
        let med = percentile(&sorted_mags, 50.0);
        let range = moments.max - moments.min;

        let beyond1st = if moments.std_dev > 0.0 {
            mags.iter()
                .filter(|m| (*m - moments.mean).abs() > moments.std_dev)
                .count() as f64
                / n
        } else {
            0.0
        };

        // Least-squares slope of magnitude against time
        let t_mean = times.iter().sum::<f64>() / n;
        let (cov, var_t) = times
            .iter()
            .zip(&mags)
            .fold((0.0, 0.0), |(cov, var), (t, m)| {
                let dt = t - t_mean;
                (cov + dt * (m - moments.mean), var + dt * dt)
            });
        let linear_trend = ratio(cov, var_t);

        let slopes: Vec<f64> = times
            .windows(2)
            .zip(mags.windows(2))
            .map(|(t, m)| (m[1] - m[0]) / (t[1] - t[0]))
            .collect();
        let max_slope = slopes.iter().fold(0.0_f64, |acc, s| acc.max(s.abs()));
        let pair_slope_trend = slopes.iter().filter(|s| **s > 0.0).count() as f64 / slopes.len() as f64;

        let deviations: Vec<f64> = mags.iter().map(|m| (m - med).abs()).collect();
        let median_absolute_deviation = median(&deviations);

        let buffer = 0.2 * range;
        let median_buffer_range_percentage =
            deviations.iter().filter(|d| **d > buffer).count() as f64 / n;

        let percent_amplitude = ratio(
            (moments.max - med).abs().max((moments.min - med).abs()),
            med.abs(),
        );

        let p5 = percentile(&sorted_mags, 5.0);
        let p95 = percentile(&sorted_mags, 95.0);
        let percent_difference_flux_percentile = ratio(p95 - p5, med.abs());

        let mut flux_percentile_ratios = [0.0; 5];
        for (slot, half) in flux_percentile_ratios.iter_mut().zip(MID_HALF_WIDTHS) {
            let upper = percentile(&sorted_mags, 50.0 + half);
            let lower = percentile(&sorted_mags, 50.0 - half);
            *slot = ratio(upper - lower, p95 - p5);
        }

        Ok(Self {
            amplitude_dif: range / 2.0,
            beyond1st,
            linear_trend,
            max_slope,
            median_absolute_deviation,
            median_buffer_range_percentage,
            pair_slope_trend,
            percent_amplitude,
            percent_difference_flux_percentile,
            skew: moments.skewness,
            kurtosis: moments.kurtosis,
            std: moments.std_dev,
            flux_percentile_ratios,
        })
    }

    /// Half the difference between the brightest and faintest magnitude
    pub fn amplitude_dif(&self) -> f64 {
        self.amplitude_dif
    }

    /// Fraction of samples more than one standard deviation from the mean
    pub fn beyond1st(&self) -> f64 {
        self.beyond1st
    }

    /// Slope of a linear fit of magnitude against time
    pub fn linear_trend(&self) -> f64 {
        self.linear_trend
    }

    /// Largest absolute slope between consecutive samples
    pub fn max_slope(&self) -> f64 {
        self.max_slope
    }

    pub fn median_absolute_deviation(&self) -> f64 {
        self.median_absolute_deviation
    }

    /// Fraction of samples farther from the median than 20% of the range
    pub fn median_buffer_range_percentage(&self) -> f64 {
        self.median_buffer_range_percentage
    }

    /// Fraction of consecutive pairs with increasing magnitude
    pub fn pair_slope_trend(&self) -> f64 {
        self.pair_slope_trend
    }

    /// Largest deviation from the median relative to the median
    pub fn percent_amplitude(&self) -> f64 {
        self.percent_amplitude
    }

    /// Spread between the 5th and 95th percentiles relative to the median
    pub fn percent_difference_flux_percentile(&self) -> f64 {
        self.percent_difference_flux_percentile
    }

    pub fn skew(&self) -> f64 {
        self.skew
    }

    pub fn kurtosis(&self) -> f64 {
        self.kurtosis
    }

    pub fn std(&self) -> f64 {
        self.std
    }

    pub fn flux_percentile_ratio_mid20(&self) -> f64 {
        self.flux_percentile_ratios[0]
    }

    pub fn flux_percentile_ratio_mid35(&self) -> f64 {
        self.flux_percentile_ratios[1]
    }

    pub fn flux_percentile_ratio_mid50(&self) -> f64 {
        self.flux_percentile_ratios[2]
    }

    pub fn flux_percentile_ratio_mid65(&self) -> f64 {
        self.flux_percentile_ratios[3]
    }

    pub fn flux_percentile_ratio_mid80(&self) -> f64 {
        self.flux_percentile_ratios[4]
    }
}
