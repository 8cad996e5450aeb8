//! CSV Output
//!
//! One row per result of the current run, joined with its comparison when
//! a baseline exists.

use crate::RenderError;
use cbench_core::BenchmarkRun;
use cbench_stats::Comparison;
use fxhash::FxHashMap;

const HEADER: [&str; 7] = [
    "label",
    "name",
    "value",
    "stddev",
    "unit",
    "baseline",
    "delta_percent",
];

/// Generate CSV rows for a run.
///
/// `baseline` and `delta_percent` are empty for labels without a comparison.
pub fn generate_csv_report(
    run: &BenchmarkRun,
    comparisons: &[Comparison],
) -> Result<String, RenderError> {
    let by_label: FxHashMap<&str, &Comparison> = comparisons
        .iter()
        .map(|c| (c.label.as_str(), c))
        .collect();

    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for result in &run.results {
        let cmp = by_label.get(result.label.as_str());
        writer.write_record([
            result.label.clone(),
            result.name.clone(),
            result.value.to_string(),
            result.stddev.to_string(),
            result.unit.clone(),
            cmp.map(|c| c.baseline.to_string()).unwrap_or_default(),
            cmp.map(|c| format!("{:.2}", c.delta_percent))
                .unwrap_or_default(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
