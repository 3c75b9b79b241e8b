//! Descriptive statistics over a single group of values.
//!
//! Spread uses the sample (n - 1) variance. Groups of one report zero
//! spread rather than NaN.

use std::cmp::Ordering;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; 0 for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (n - 1) as f64).sqrt()
}

/// Standard error of the mean; 0 for fewer than two values.
pub fn std_err(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    std_dev(values) / (n as f64).sqrt()
}

/// Median with the two middle values averaged for even counts.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted = sorted_copy(values);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub std_err: f64,
    pub variance: f64,
    /// Coefficient of variation in percent; 0 when the mean is 0.
    pub cv: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

impl Summary {
    /// Summarizes `values`, ignoring NaN. Returns `None` when nothing is left.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if clean.is_empty() {
            return None;
        }

        let mean = mean(&clean);
        let std_dev = std_dev(&clean);
        let sorted = sorted_copy(&clean);
        let cv = if mean != 0.0 {
            std_dev / mean * 100.0
        } else {
            0.0
        };

        Some(Self {
            n: clean.len(),
            mean,
            std_dev,
            std_err: std_err(&clean),
            variance: std_dev * std_dev,
            cv,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            median: median(&clean),
        })
    }
}

/// Box-and-whisker figures using nearest-rank quartiles.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxPlotStats {
    /// Lower whisker end, clamped to the smallest value.
    pub min: f64,
    pub q1: f64,
    /// Nearest-rank median (`sorted[n / 2]`); differs from [`median`] for even n.
    pub median: f64,
    pub q3: f64,
    /// Upper whisker end, clamped to the largest value.
    pub max: f64,
    pub iqr: f64,
    /// Values beyond the whiskers, ascending.
    pub outliers: Vec<f64>,
    /// All values, ascending.
    pub values: Vec<f64>,
}

impl BoxPlotStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let sorted = sorted_copy(&clean);
        let n = sorted.len();
        if n == 0 {
            return None;
        }

        let rank = |p: f64| sorted[((n as f64) * p).floor() as usize];
        let q1 = rank(0.25);
        let median = rank(0.5);
        let q3 = rank(0.75);
        let iqr = q3 - q1;
        let min = sorted[0].max(q1 - 1.5 * iqr);
        let max = sorted[n - 1].min(q3 + 1.5 * iqr);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < min || *v > max)
            .collect();

        Some(Self {
            min,
            q1,
            median,
            q3,
            max,
            iqr,
            outliers,
            values: sorted,
        })
    }
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}
