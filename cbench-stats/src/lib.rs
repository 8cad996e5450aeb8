#![warn(missing_docs)]
//! cbench Statistics
//!
//! Turns raw benchmark results into comparable numbers:
//! - Summary statistics (mean, median, sample stddev) over small value sets
//! - Iteration merging with outlier rejection
//! - History baselines (latest / average / median of the newest N runs)
//! - Percentage comparisons with improvement/regression verdicts

mod baseline;
mod comparison;
mod iterations;
mod percentiles;
mod summary;

pub use baseline::{Baseline, BaselineEntry, CompareMode, build_baseline};
pub use comparison::{
    Comparison, ComparisonSummary, Verdict, classify, compare_results, percent_change,
};
pub use iterations::{OUTLIER_SIGMAS, filter_outliers, merge_iterations, merge_label};
pub use percentiles::{compute_percentile, median};
pub use summary::{SummaryStatistics, compute_summary, mean, relative_stddev, std_dev};

/// Default regression threshold in percent
pub const DEFAULT_REGRESSION_THRESHOLD: f64 = 5.0;

/// Default number of historical values a baseline is reduced from
pub const DEFAULT_COMPARE_MAX: usize = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!((DEFAULT_REGRESSION_THRESHOLD - 5.0).abs() < f64::EPSILON);
        assert_eq!(DEFAULT_COMPARE_MAX, 10);
    }
}
