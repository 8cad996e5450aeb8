//! JSON Output
//!
//! The pretty-printed [`BenchmarkRun`] is both the `--format json` output and
//! the on-disk snapshot format of the results store.

use cbench_core::BenchmarkRun;

/// Generate a prettified JSON snapshot of a run.
pub fn generate_json_report(run: &BenchmarkRun) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(run)
}

/// Parse a snapshot written by [`generate_json_report`].
pub fn parse_json_report(json: &str) -> Result<BenchmarkRun, serde_json::Error> {
    serde_json::from_str(json)
}
