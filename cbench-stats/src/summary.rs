//! Summary Statistics
//!
//! Mean, median, sample standard deviation and extremes of a small set of
//! values (iterations of one benchmark case, or one label across history).

use crate::percentiles::median;

/// Summary statistics of a value set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryStatistics {
    /// Arithmetic mean
    pub mean: f64,
    /// Median (interpolated)
    pub median: f64,
    /// Sample standard deviation (n - 1)
    pub std_dev: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Number of values
    pub count: usize,
}

/// Compute summary statistics
pub fn compute_summary(values: &[f64]) -> SummaryStatistics {
    if values.is_empty() {
        return SummaryStatistics::default();
    }

    let mean = mean(values);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    SummaryStatistics {
        mean,
        median: median(values),
        std_dev: std_dev(values),
        min,
        max,
        count: values.len(),
    }
}

/// Arithmetic mean (0 when empty)
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample standard deviation (0 for fewer than two values)
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Standard deviation relative to the mean (0 when the mean is 0)
pub fn relative_stddev(values: &[f64]) -> f64 {
    let m = mean(values);
    if m == 0.0 { 0.0 } else { std_dev(values) / m.abs() }
}

impl SummaryStatistics {
    /// Coefficient of variation in percent
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            (self.std_dev / self.mean.abs()) * 100.0
        }
    }
}
