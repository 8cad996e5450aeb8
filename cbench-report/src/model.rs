//! Chart data model
//!
//! Intermediate shapes between stored runs and rendered charts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display metadata of a benchmark label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetadata {
    /// Unit of the values
    pub unit: String,
    /// Direction of improvement
    pub lower_is_better: bool,
}

/// One measurement in a time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Date of the run the value came from
    pub date: DateTime<Utc>,
    /// Measured value
    pub value: f64,
    /// Standard deviation of the value
    pub stddev: f64,
    /// Commit of the run
    pub git_hash: String,
}

/// Points of one run name within a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRun {
    /// Run name
    pub name: String,
    /// Points in the order the runs were seen
    pub points: Vec<SeriesPoint>,
}

/// History of one label across runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSeries {
    /// Benchmark label
    pub label: String,
    /// Metadata of the first result seen
    pub metadata: BenchmarkMetadata,
    /// One entry per run name
    pub runs: Vec<SeriesRun>,
}

/// Values of one label within an explicit group, one slot per compare name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    /// Benchmark label
    pub label: String,
    /// Value per compare name, `None` when that run lacks the label
    pub values: Vec<Option<f64>>,
}

/// Results sharing an explicit group tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitGroup {
    /// Group tag
    pub name: String,
    /// Number of compare names
    pub nnames: usize,
    /// Compare names, the bar positions
    pub names: Vec<String>,
    /// Metadata of the first result seen
    pub metadata: BenchmarkMetadata,
    /// One row per label in first-seen order
    pub rows: Vec<GroupRow>,
}

/// A rendered chart
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkChart {
    /// Label the chart is filtered by
    pub label: String,
    /// Inline SVG markup
    pub html: String,
}
