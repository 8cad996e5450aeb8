//! Mermaid Gantt Charts
//!
//! Mermaid has no bar chart that renders on GitHub, so every benchmark
//! binary becomes a gantt diagram: one section per label, one bar per run,
//! bar length equal to the measured value.

use crate::format::format_value;
use cbench_core::BenchmarkRun;
use fxhash::FxHashMap;
use std::fmt::Write;

/// Sections with fewer bars are padded so that section heights line up
const MIN_BARS_PER_SECTION: usize = 4;

/// Labels grouped by binary name, both in first-seen order
fn labels_by_name(chart_data: &[BenchmarkRun]) -> Vec<(&str, Vec<&str>)> {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();

    for run in chart_data {
        for result in &run.results {
            let slot = *index.entry(result.name.as_str()).or_insert_with(|| {
                groups.push((result.name.as_str(), Vec::new()));
                groups.len() - 1
            });
            let labels = &mut groups[slot].1;
            if !labels.contains(&result.label.as_str()) {
                labels.push(result.label.as_str());
            }
        }
    }
    groups
}

fn write_header(script: &mut String, title: &str) {
    let _ = write!(
        script,
        "\n```mermaid\n\
         ---\n\
         config:\n    \
         gantt:\n        \
         rightPadding: 10\n        \
         leftPadding: 120\n        \
         sectionFontSize: 10\n        \
         numberSectionStyles: 2\n\
         ---\n\
         gantt\n    \
         title {title}\n    \
         todayMarker off\n    \
         dateFormat  X\n    \
         axisFormat %s\n"
    );
}

/// Render one Mermaid gantt block per benchmark binary.
///
/// Bars of the current run are marked `crit`.
pub fn generate_mermaid_script(chart_data: &[BenchmarkRun]) -> String {
    let mut script = String::new();

    for (name, labels) in labels_by_name(chart_data) {
        write_header(&mut script, name);

        for label in labels {
            let _ = write!(script, "\n    section {}\n", label.replace(' ', "<br>"));

            let mut bars = 0;
            for run in chart_data {
                let crit = if run.is_current() { "crit," } else { "" };
                for result in run
                    .results
                    .iter()
                    .filter(|r| r.name == name && r.label == label)
                {
                    bars += 1;
                    let _ = write!(
                        script,
                        "\n        {} ({} {})   : {} 0, {}\n",
                        run.name,
                        format_value(result.value),
                        result.unit,
                        crit,
                        result.value as i64
                    );
                }
            }

            for _ in bars..MIN_BARS_PER_SECTION {
                script.push_str("\n    -   : 0, 0\n");
            }
        }

        script.push_str("\n```\n");
    }

    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbench_core::{BenchResult, CURRENT_RUN_NAME};
    use chrono::{TimeZone, Utc};

    fn run(name: &str, results: Vec<BenchResult>) -> BenchmarkRun {
        let date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        BenchmarkRun::new(name, date, "abc", results)
    }

    fn res(label: &str, value: f64) -> BenchResult {
        BenchResult::new(label, value)
            .with_name("api_overhead_benchmark_sycl")
            .with_unit("μs")
    }

    #[test]
    fn current_run_is_marked_crit() {
        let data = vec![
            run(CURRENT_RUN_NAME, vec![res("Submit Kernel", 12.5)]),
            run("baseline", vec![res("Submit Kernel", 11.0)]),
        ];
        let script = generate_mermaid_script(&data);

        assert!(script.starts_with("\n```mermaid\n---\nconfig:\n    gantt:\n"));
        assert!(script.contains("    title api_overhead_benchmark_sycl\n"));
        assert!(script.contains("\n    section Submit<br>Kernel\n"));
        assert!(script.contains("\n        This PR (12.5 μs)   : crit, 0, 12\n"));
        assert!(script.contains("\n        baseline (11.0 μs)   :  0, 11\n"));
        assert!(script.ends_with("\n```\n"));
    }

    #[test]
    fn sections_are_padded_to_four_bars() {
        let data = vec![
            run(CURRENT_RUN_NAME, vec![res("a", 1.0)]),
            run("baseline", vec![res("a", 2.0)]),
        ];
        let script = generate_mermaid_script(&data);
        assert_eq!(script.matches("\n    -   : 0, 0\n").count(), 2);
    }

    #[test]
    fn one_block_per_binary() {
        let other = BenchResult::new("VectorSum", 3.0).with_name("ulls_benchmark_sycl");
        let data = vec![run(CURRENT_RUN_NAME, vec![res("a", 1.0), other, res("b", 2.0)])];
        let script = generate_mermaid_script(&data);

        assert_eq!(script.matches("```mermaid").count(), 2);
        let first = script.find("title api_overhead").unwrap();
        let second = script.find("title ulls_benchmark").unwrap();
        assert!(first < second);
        // labels of the first binary stay together
        assert!(script.find("section b").unwrap() < second);
    }

    #[test]
    fn empty_input() {
        assert!(generate_mermaid_script(&[]).is_empty());
    }
}
