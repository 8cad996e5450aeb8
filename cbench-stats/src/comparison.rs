//! Baseline Comparison
//!
//! Percentage difference between a current result and the saved reference
//! with the same label: `(new - old) / old * 100`.

use crate::baseline::Baseline;
use cbench_core::BenchResult;
use serde::{Deserialize, Serialize};

/// Classification of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Moved in the good direction beyond the threshold
    Improved,
    /// Moved in the bad direction beyond the threshold
    Regressed,
    /// Within the threshold
    Unchanged,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Improved => write!(f, "improved"),
            Verdict::Regressed => write!(f, "regressed"),
            Verdict::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Comparison of one label against its reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Benchmark label
    pub label: String,
    /// Unit of both values
    pub unit: String,
    /// Current value
    pub current: f64,
    /// Reference value
    pub baseline: f64,
    /// Percentage change relative to the reference
    pub delta_percent: f64,
    /// Direction of improvement
    pub lower_is_better: bool,
    /// Classification against the threshold
    pub verdict: Verdict,
}

/// Percentage change from `old` to `new`.
///
/// Undefined (`None`) when `old` is zero or either value is not finite.
pub fn percent_change(new: f64, old: f64) -> Option<f64> {
    if old == 0.0 || !old.is_finite() || !new.is_finite() {
        return None;
    }
    Some((new - old) / old * 100.0)
}

/// Classify a percentage change.
///
/// Changes whose magnitude does not exceed `threshold` are unchanged.
pub fn classify(delta_percent: f64, lower_is_better: bool, threshold: f64) -> Verdict {
    if delta_percent.abs() <= threshold {
        return Verdict::Unchanged;
    }
    let got_bigger = delta_percent > 0.0;
    if got_bigger == lower_is_better {
        Verdict::Regressed
    } else {
        Verdict::Improved
    }
}

/// Compare current results against a baseline.
///
/// Results without a reference, or whose change is undefined, are skipped.
/// Output follows the order of `current`.
pub fn compare_results(
    current: &[BenchResult],
    baseline: &Baseline,
    threshold: f64,
) -> Vec<Comparison> {
    current
        .iter()
        .filter_map(|result| {
            let reference = baseline.get(&result.label)?;
            let delta_percent = percent_change(result.value, reference.value)?;
            Some(Comparison {
                label: result.label.clone(),
                unit: result.unit.clone(),
                current: result.value,
                baseline: reference.value,
                delta_percent,
                lower_is_better: result.lower_is_better,
                verdict: classify(delta_percent, result.lower_is_better, threshold),
            })
        })
        .collect()
}

/// Counts of comparison verdicts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    /// Labels that improved
    pub improvements: usize,
    /// Labels that regressed
    pub regressions: usize,
    /// Labels within the threshold
    pub unchanged: usize,
}

impl ComparisonSummary {
    /// Tally verdicts
    pub fn from_comparisons(comparisons: &[Comparison]) -> Self {
        let mut summary = Self::default();
        for c in comparisons {
            match c.verdict {
                Verdict::Improved => summary.improvements += 1,
                Verdict::Regressed => summary.regressions += 1,
                Verdict::Unchanged => summary.unchanged += 1,
            }
        }
        summary
    }

    /// Total number of compared labels
    pub fn total(&self) -> usize {
        self.improvements + self.regressions + self.unchanged
    }

    /// Whether CI should fail
    pub fn should_fail(&self, fail_on_regression: bool) -> bool {
        fail_on_regression && self.regressions > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::BaselineEntry;

    fn baseline(entries: &[(&str, f64)]) -> Baseline {
        let mut b = Baseline::default();
        for (label, value) in entries {
            b.insert(
                *label,
                BaselineEntry {
                    value: *value,
                    samples: 1,
                    unit: "μs".to_string(),
                },
            );
        }
        b
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(110.0, 100.0), Some(10.0));
        assert_eq!(percent_change(90.0, 100.0), Some(-10.0));
        assert_eq!(percent_change(1.0, 0.0), None);
        assert_eq!(percent_change(f64::NAN, 1.0), None);
    }

    #[test]
    fn test_classify_lower_is_better() {
        assert_eq!(classify(8.0, true, 5.0), Verdict::Regressed);
        assert_eq!(classify(-8.0, true, 5.0), Verdict::Improved);
        assert_eq!(classify(5.0, true, 5.0), Verdict::Unchanged);
    }

    #[test]
    fn test_classify_higher_is_better() {
        assert_eq!(classify(8.0, false, 5.0), Verdict::Improved);
        assert_eq!(classify(-8.0, false, 5.0), Verdict::Regressed);
    }

    #[test]
    fn test_compare_results_joins_by_label() {
        let current = vec![
            BenchResult::new("fast", 108.0),
            BenchResult::new("new_case", 1.0),
            BenchResult::new("slow", 90.0),
            BenchResult::new("zero_ref", 3.0),
        ];
        let base = baseline(&[("fast", 100.0), ("slow", 100.0), ("zero_ref", 0.0)]);

        let cmps = compare_results(&current, &base, 5.0);
        assert_eq!(cmps.len(), 2);
        assert_eq!(cmps[0].label, "fast");
        assert!((cmps[0].delta_percent - 8.0).abs() < 1e-9);
        assert_eq!(cmps[0].verdict, Verdict::Regressed);
        assert_eq!(cmps[1].label, "slow");
        assert_eq!(cmps[1].verdict, Verdict::Improved);

        let summary = ComparisonSummary::from_comparisons(&cmps);
        assert_eq!(summary.regressions, 1);
        assert_eq!(summary.improvements, 1);
        assert_eq!(summary.total(), 2);
        assert!(summary.should_fail(true));
        assert!(!summary.should_fail(false));
    }
}
