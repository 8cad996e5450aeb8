//! Benchmark Definitions
//!
//! A [`Benchmark`] describes how to invoke one pre-built benchmark binary and
//! how to turn its output into [`BenchResult`]s. A [`Suite`] is a collection
//! of benchmarks sharing one binary directory.

use crate::parse::{ParseError, parse_compute_output};
use crate::result::{BenchEnv, BenchResult};
use std::path::Path;

/// A single benchmark case backed by an external binary
pub trait Benchmark: Send + Sync {
    /// Binary name (also the Mermaid chart the case is drawn in)
    fn name(&self) -> &str;

    /// Unique case label
    fn label(&self) -> String;

    /// Test selector passed as `--test=<test>`
    fn test(&self) -> &str;

    /// Unit of the reported value
    fn unit(&self) -> &str {
        "μs"
    }

    /// Direction of improvement
    fn lower_is_better(&self) -> bool {
        true
    }

    /// Explicit comparison group for grouped bar charts
    fn explicit_group(&self) -> Option<&str> {
        None
    }

    /// Case-specific arguments
    fn bin_args(&self) -> Vec<String> {
        Vec::new()
    }

    /// Case-specific environment variables
    fn extra_env_vars(&self) -> BenchEnv {
        BenchEnv::new()
    }

    /// Full command line for this case
    fn command(&self, bin_dir: &Path) -> Vec<String> {
        let mut command = vec![
            bin_dir.join(self.name()).display().to_string(),
            format!("--test={}", self.test()),
            "--csv".to_string(),
            "--noHeaders".to_string(),
        ];
        command.extend(self.bin_args());
        command
    }

    /// Turn captured stdout into results
    fn parse_output(
        &self,
        stdout: &str,
        command: Vec<String>,
        env: BenchEnv,
    ) -> Result<Vec<BenchResult>, ParseError> {
        let row = parse_compute_output(stdout)?;

        let mut result = BenchResult::new(self.label(), row.mean)
            .with_name(self.name())
            .with_unit(self.unit())
            .with_diagnostics(command, env, stdout.to_string());
        result.lower_is_better = self.lower_is_better();
        result.explicit_group = self.explicit_group().map(str::to_string);

        Ok(vec![result])
    }
}

/// A collection of benchmarks
pub trait Suite {
    /// Suite name
    fn name(&self) -> &str;

    /// All benchmark cases in execution order
    fn benchmarks(&self) -> Vec<Box<dyn Benchmark>>;
}
