//! Benchmark Planner
//!
//! Builds execution plan by filtering benchmarks.
//!
//! Filtering options:
//! - Regex pattern matching on the case label
//! - Binary name
//!
//! Ordering: benchmarks keep their definition order, which is also the
//! order their sections appear in the Mermaid charts.

use cbench_core::Benchmark;
use regex::Regex;

/// Execution plan for benchmarks
pub struct ExecutionPlan {
    /// Ordered list of benchmarks to run
    pub benchmarks: Vec<Box<dyn Benchmark>>,
}

impl ExecutionPlan {
    /// Number of selected cases
    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    /// Whether nothing was selected
    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }
}

/// Build execution plan from the suite's benchmarks
pub fn build_plan(
    benchmarks: impl IntoIterator<Item = Box<dyn Benchmark>>,
    filter: Option<&Regex>,
    binary: Option<&str>,
) -> ExecutionPlan {
    let selected = benchmarks
        .into_iter()
        .filter(|b| {
            // Apply regex filter on the label
            if let Some(re) = filter {
                if !re.is_match(&b.label()) {
                    return false;
                }
            }

            if let Some(name) = binary {
                if b.name() != name {
                    return false;
                }
            }

            true
        })
        .collect();

    ExecutionPlan {
        benchmarks: selected,
    }
}
