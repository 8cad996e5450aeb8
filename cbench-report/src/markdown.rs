//! Markdown Report
//!
//! Suitable for a PR comment: Mermaid charts, an optional comparison
//! table, then collapsible per-result details of the current run.

use crate::format::{format_delta, format_value};
use crate::mermaid::generate_mermaid_script;
use cbench_core::{BenchResult, BenchmarkRun};
use cbench_stats::{Comparison, Verdict};
use std::fmt::Write;

fn verdict_icon(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Improved => "✅",
        Verdict::Regressed => "❌",
        Verdict::Unchanged => "➖",
    }
}

/// Collapsible `<details>` blocks with the environment, command and output
/// of each result.
pub fn generate_markdown_details(results: &[BenchResult]) -> String {
    results
        .iter()
        .map(|res| {
            let env_vars = res
                .env
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "\n<details>\n\
                 <summary>{}</summary>\n\n\
                 #### Environment Variables:\n\
                 {}\n\n\
                 #### Command:\n\
                 {}\n\n\
                 #### Output:\n\
                 {}\n\n\
                 </details>\n",
                res.label,
                env_vars,
                res.command.join(" "),
                res.stdout
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Table of baseline comparisons
pub fn generate_summary_table(comparisons: &[Comparison]) -> String {
    let mut table = String::from("| Benchmark | Baseline | This PR | Change | |\n");
    table.push_str("|---|---:|---:|---:|---|\n");
    for c in comparisons {
        let _ = writeln!(
            table,
            "| {} | {} {} | {} {} | {} | {} {} |",
            c.label,
            format_value(c.baseline),
            c.unit,
            format_value(c.current),
            c.unit,
            format_delta(c.delta_percent),
            verdict_icon(c.verdict),
            c.verdict
        );
    }
    table
}

/// Full Markdown report.
///
/// The details section lists the results of the current run; it is empty
/// when `chart_data` has no current run.
pub fn generate_markdown(chart_data: &[BenchmarkRun], comparisons: &[Comparison]) -> String {
    let mermaid = generate_mermaid_script(chart_data);
    let details = chart_data
        .iter()
        .find(|run| run.is_current())
        .map(|run| generate_markdown_details(&run.results))
        .unwrap_or_default();

    let mut out = String::new();
    let _ = write!(out, "\n# Benchmark Results\n{}\n", mermaid);
    if !comparisons.is_empty() {
        let _ = write!(out, "## Summary\n\n{}\n", generate_summary_table(comparisons));
    }
    let _ = write!(out, "## Details\n{}\n", details);
    out
}
