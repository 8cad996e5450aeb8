//! Output Formatting
//!
//! Human-readable output for the terminal:
//! - Results grouped by binary, in execution order
//! - Baseline change per result, when one exists
//! - Failed cases with their error
//! - Verdict summary

use crate::runner::BenchFailure;
use cbench_core::BenchmarkRun;
use cbench_report::{format_delta, format_value};
use cbench_stats::{Comparison, ComparisonSummary, Verdict};
use fxhash::FxHashMap;

/// Format a run for human-readable terminal display
///
/// # Arguments
/// * `run` - The measured (or loaded) run
/// * `comparisons` - Baseline comparisons of the run's results
/// * `failures` - Cases that produced no result
pub fn format_human_output(
    run: &BenchmarkRun,
    comparisons: &[Comparison],
    failures: &[BenchFailure],
) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("cbench Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");
    output.push_str(&format!(
        "Run: {} ({}, {})\n\n",
        run.name,
        run.git_hash,
        run.date.format("%Y-%m-%d %H:%M:%S")
    ));

    let by_label: FxHashMap<&str, &Comparison> =
        comparisons.iter().map(|c| (c.label.as_str(), c)).collect();

    // Group by binary, keeping first-seen order
    let mut groups: Vec<(&str, Vec<_>)> = Vec::new();
    for result in &run.results {
        match groups.iter_mut().find(|(name, _)| *name == result.name) {
            Some((_, results)) => results.push(result),
            None => groups.push((result.name.as_str(), vec![result])),
        }
    }

    for (name, results) in groups {
        let name = if name.is_empty() { "(unnamed)" } else { name };
        output.push_str(&format!("Binary: {}\n", name));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for result in results {
            let icon = match by_label.get(result.label.as_str()).map(|c| c.verdict) {
                Some(Verdict::Regressed) => "✗",
                _ => "✓",
            };
            output.push_str(&format!("  {} {}\n", icon, result.label));
            output.push_str(&format!(
                "      value: {} {}  stddev: {:.2} {}\n",
                format_value(result.value),
                result.unit,
                result.stddev,
                result.unit
            ));

            if let Some(c) = by_label.get(result.label.as_str()) {
                output.push_str(&format!(
                    "      baseline: {} {} → {} {}  change: {} ({})\n",
                    format_value(c.baseline),
                    c.unit,
                    format_value(c.current),
                    c.unit,
                    format_delta(c.delta_percent),
                    c.verdict
                ));
            }
        }
        output.push('\n');
    }

    if !failures.is_empty() {
        output.push_str("Failures\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for failure in failures {
            output.push_str(&format!("  💥 {} : {}\n", failure.label, failure.error));
        }
        output.push('\n');
    }

    let summary = ComparisonSummary::from_comparisons(comparisons);
    output.push_str("Summary\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  Results: {}  Failed: {}\n",
        run.results.len(),
        failures.len()
    ));
    if summary.total() > 0 {
        output.push_str(&format!(
            "  Regressions: {}  Improvements: {}  No Change: {}\n",
            summary.regressions, summary.improvements, summary.unchanged
        ));
    }

    output
}
