//! Statistical Moments and Percentiles

/// Population moments and range of a magnitude series
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub std_dev: f64,
    pub skewness: f64,
    /// Excess kurtosis (0 for a normal distribution)
    pub kurtosis: f64,
    pub min: f64,
    pub max: f64,
}

impl Moments {
    /// Moments of `values`; all zero when empty, shape terms zero when flat
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        let (m2, m3, m4) = values.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), &v| {
            let d = v - mean;
            let d2 = d * d;
            (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
        });
        let (m2, m3, m4) = (m2 / n, m3 / n, m4 / n);

        // Rounding leaves a nonzero m2 on a constant series
        let flat = max - min == 0.0 || m2 <= f64::EPSILON * mean * mean;
        let (std_dev, skewness, kurtosis) = if flat {
            (0.0, 0.0, 0.0)
        } else {
            (m2.sqrt(), m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
        };

        Self {
            mean,
            std_dev,
            skewness,
            kurtosis,
            min,
            max,
        }
    }
}

/// Percentile `p` (0-100) of already sorted values, linearly interpolated
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Sorted copy of the values
pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Median of the values
pub(crate) fn median(values: &[f64]) -> f64 {
    percentile(&sorted(values), 50.0)
}
