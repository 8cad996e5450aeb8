#![warn(missing_docs)]
//! cbench Report - Reporting and Visualization
//!
//! Generates the output formats of a benchmark run:
//! - Markdown with Mermaid gantt charts (PR comments)
//! - HTML with SVG time series and grouped bar charts
//! - JSON (the persisted snapshot format)
//! - CSV (spreadsheet-compatible)

mod csv;
mod format;
mod html;
mod json;
mod markdown;
mod mermaid;
mod model;
mod svg;

pub use csv::generate_csv_report;
pub use format::{format_delta, format_value};
pub use html::{
    create_explicit_groups, create_grouped_bar_charts, create_time_series_chart, generate_html,
    process_benchmark_data,
};
pub use json::{generate_json_report, parse_json_report};
pub use markdown::{generate_markdown, generate_markdown_details, generate_summary_table};
pub use mermaid::generate_mermaid_script;
pub use model::{
    BenchmarkChart, BenchmarkMetadata, BenchmarkSeries, ExplicitGroup, GroupRow, SeriesPoint,
    SeriesRun,
};

use thiserror::Error;

/// Errors produced while rendering a report
#[derive(Debug, Error)]
pub enum RenderError {
    /// JSON serialization failed
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] ::csv::Error),

    /// Writing the rendered buffer failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendered bytes were not valid UTF-8
    #[error("Rendered output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown with Mermaid charts, for PR comments
    Markdown,
    /// Single-file HTML page with SVG charts
    Html,
    /// JSON snapshot of the current run
    Json,
    /// CSV for spreadsheets
    Csv,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Human => "human",
        };
        f.write_str(name)
    }
}
