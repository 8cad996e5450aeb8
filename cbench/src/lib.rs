#![warn(missing_docs)]
//! # cbench
//!
//! Benchmark orchestration for pre-built compute/GPU benchmark binaries.
//!
//! cbench runs the binaries, keeps a history of named runs and reports how
//! the current run compares:
//! - **Runner**: timeout-guarded subprocesses, repeated iterations merged by median, noisy cases re-run
//! - **History**: one JSON snapshot per run, baselines from the latest, average or median of saved values
//! - **Markdown**: Mermaid gantt charts, a comparison table and per-result details for PR comments
//! - **HTML**: self-contained SVG time series and grouped bar charts with a regex filter
//! - **CI**: exit code 1 on regressions beyond a percentage threshold
//!
//! ## Quick Start
//!
//! ```ignore
//! use cbench::prelude::*;
//!
//! let suite = ComputeBench::new(false);
//! let runs = ResultsStore::new("target/cbench/results").load_all()?;
//! let markdown = generate_markdown(&runs, &[]);
//! ```
//!
//! ## Custom Benchmarks
//!
//! ```ignore
//! struct MyBench;
//!
//! impl Benchmark for MyBench {
//!     fn name(&self) -> &str { "my_benchmark" }
//!     fn label(&self) -> String { "my_benchmark Case".into() }
//!     fn test(&self) -> &str { "Case" }
//! }
//! ```

// Re-export core types
pub use cbench_core::{
    BenchEnv, BenchResult, Benchmark, BenchmarkRun, CURRENT_RUN_NAME, ComputeBench, ParseError,
    Suite, parse_compute_output,
};

// Re-export stats
pub use cbench_stats::{
    Baseline, CompareMode, Comparison, ComparisonSummary, Verdict, build_baseline,
    compare_results, merge_iterations,
};

// Re-export reporting
pub use cbench_report::{
    OutputFormat, RenderError, generate_csv_report, generate_html, generate_json_report,
    generate_markdown, generate_mermaid_script, parse_json_report,
};

// Re-export orchestration
pub use cbench_cli::{
    CbenchConfig, Executor, ResultsStore, RunError, RunnerSettings, StoreError, build_plan,
    run_command,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BenchResult, Benchmark, BenchmarkRun, CompareMode, ComputeBench, ResultsStore, Suite,
        build_baseline, compare_results, generate_html, generate_markdown,
    };
}

/// Run the cbench command line.
///
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     cbench::run()
/// }
/// ```
pub use cbench_cli::run;
