//! Result Data Structures
//!
//! A [`BenchResult`] is a single measurement produced by one benchmark case.
//! A [`BenchmarkRun`] is a named snapshot of many results taken at one point
//! in time (the current PR, a saved baseline, a historical commit).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the run that is being measured right now.
///
/// Bars belonging to this run are highlighted in Mermaid charts, and its
/// results are the ones listed in the Markdown details section.
pub const CURRENT_RUN_NAME: &str = "This PR";

/// Environment variables passed to a benchmark process
pub type BenchEnv = BTreeMap<String, String>;

/// One benchmark measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchResult {
    /// Benchmark case label, the join key between runs
    pub label: String,
    /// Binary the case belongs to
    #[serde(default)]
    pub name: String,
    /// Measured value (mean reported by the binary)
    pub value: f64,
    /// Standard deviation across iterations
    #[serde(default)]
    pub stddev: f64,
    /// Unit of `value`
    #[serde(default)]
    pub unit: String,
    /// Direction of improvement
    #[serde(default = "default_lower_is_better")]
    pub lower_is_better: bool,
    /// Explicit comparison group, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_group: Option<String>,
    /// Full command line used to produce the result
    #[serde(default)]
    pub command: Vec<String>,
    /// Extra environment variables set for the process
    #[serde(default)]
    pub env: BenchEnv,
    /// Raw standard output of the binary
    #[serde(default)]
    pub stdout: String,
}

fn default_lower_is_better() -> bool {
    true
}

impl BenchResult {
    /// Create a result with the given label and value and empty diagnostics.
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            name: String::new(),
            value,
            stddev: 0.0,
            unit: String::new(),
            lower_is_better: true,
            explicit_group: None,
            command: Vec::new(),
            env: BenchEnv::new(),
            stdout: String::new(),
        }
    }

    /// Set the binary name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the unit
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Set the standard deviation
    #[must_use]
    pub fn with_stddev(mut self, stddev: f64) -> Self {
        self.stddev = stddev;
        self
    }

    /// Set the explicit group
    #[must_use]
    pub fn with_explicit_group(mut self, group: impl Into<String>) -> Self {
        self.explicit_group = Some(group.into());
        self
    }

    /// Mark the result as higher-is-better
    #[must_use]
    pub fn higher_is_better(mut self) -> Self {
        self.lower_is_better = false;
        self
    }

    /// Attach command line, environment and captured output
    #[must_use]
    pub fn with_diagnostics(mut self, command: Vec<String>, env: BenchEnv, stdout: String) -> Self {
        self.command = command;
        self.env = env;
        self.stdout = stdout;
        self
    }

    /// Explicit group, treating an empty tag as no group
    pub fn group(&self) -> Option<&str> {
        self.explicit_group.as_deref().filter(|g| !g.is_empty())
    }
}

/// A named snapshot of benchmark results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRun {
    /// Snapshot name (e.g. "This PR", "baseline")
    pub name: String,
    /// When the snapshot was taken
    pub date: DateTime<Utc>,
    /// Commit the snapshot was taken at
    #[serde(default)]
    pub git_hash: String,
    /// All results in execution order
    pub results: Vec<BenchResult>,
}

impl BenchmarkRun {
    /// Create a run
    pub fn new(
        name: impl Into<String>,
        date: DateTime<Utc>,
        git_hash: impl Into<String>,
        results: Vec<BenchResult>,
    ) -> Self {
        Self {
            name: name.into(),
            date,
            git_hash: git_hash.into(),
            results,
        }
    }

    /// Look up a result by label
    pub fn result(&self, label: &str) -> Option<&BenchResult> {
        self.results.iter().find(|r| r.label == label)
    }

    /// Whether this is the run currently being measured
    pub fn is_current(&self) -> bool {
        self.name == CURRENT_RUN_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_group_is_no_group() {
        let r = BenchResult::new("a", 1.0).with_explicit_group("");
        assert_eq!(r.group(), None);
        let r = BenchResult::new("a", 1.0).with_explicit_group("SubmitKernel");
        assert_eq!(r.group(), Some("SubmitKernel"));
    }

    #[test]
    fn old_snapshots_load_with_defaults() {
        let json = r#"{
            "name": "baseline",
            "date": "2024-05-01T10:00:00Z",
            "results": [{"label": "VectorSum", "value": 12.5}]
        }"#;
        let run: BenchmarkRun = serde_json::from_str(json).unwrap();
        assert_eq!(run.git_hash, "");
        let r = &run.results[0];
        assert!(r.lower_is_better);
        assert_eq!(r.stddev, 0.0);
        assert!(r.explicit_group.is_none());
        assert!(r.env.is_empty());
    }

    #[test]
    fn lookup_by_label() {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let run = BenchmarkRun::new(
            CURRENT_RUN_NAME,
            date,
            "abc123",
            vec![BenchResult::new("a", 1.0), BenchResult::new("b", 2.0)],
        );
        assert!(run.is_current());
        assert_eq!(run.result("b").map(|r| r.value), Some(2.0));
        assert!(run.result("c").is_none());
    }
}
