//! Configuration loading from cbench.toml
//!
//! cbench configuration can be specified in a `cbench.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.
//! Command-line flags override any value set here.

use cbench_core::BenchEnv;
use cbench_stats::CompareMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file
pub const CONFIG_FILE: &str = "cbench.toml";

/// cbench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CbenchConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// History comparison configuration
    #[serde(default)]
    pub compare: CompareConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// CI/CD configuration
    #[serde(default)]
    pub ci: CiConfig,
}

/// Runner configuration for benchmark execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Directory holding the pre-built benchmark binaries
    #[serde(default)]
    pub bin_dir: Option<String>,
    /// Timeout for a single benchmark process (e.g., "600s", "10m")
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Number of times every case is executed
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Relative stddev above which a case counts as noisy
    #[serde(default = "default_stddev_threshold")]
    pub stddev_threshold: f64,
    /// Extra rounds of iterations for noisy cases
    #[serde(default)]
    pub max_reruns: usize,
    /// Also run the Unified Runtime variants of the SubmitKernel cases
    #[serde(default)]
    pub include_ur: bool,
    /// Environment variables set for every benchmark process
    #[serde(default)]
    pub env: BenchEnv,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            bin_dir: None,
            timeout: default_timeout(),
            iterations: default_iterations(),
            stddev_threshold: default_stddev_threshold(),
            max_reruns: 0,
            include_ur: false,
            env: BenchEnv::new(),
        }
    }
}

fn default_timeout() -> String {
    "600s".to_string()
}
fn default_iterations() -> usize {
    5
}
fn default_stddev_threshold() -> f64 {
    0.02
}

/// How saved history is reduced to a baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// "latest", "average" or "median"
    #[serde(default)]
    pub mode: CompareMode,
    /// Number of newest saved values averaged by "average" and "median"
    #[serde(default = "default_compare_max")]
    pub max: usize,
    /// Saved run names drawn next to the current run
    #[serde(default)]
    pub names: Vec<String>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            mode: CompareMode::default(),
            max: default_compare_max(),
            names: Vec::new(),
        }
    }
}

fn default_compare_max() -> usize {
    cbench_stats::DEFAULT_COMPARE_MAX
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "markdown", "html", "json", "csv", "human"
    #[serde(default = "default_format")]
    pub format: String,
    /// Directory of saved run snapshots
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
    /// GitHub repository (`owner/name`) for commit links in HTML charts
    #[serde(default)]
    pub github_repo: Option<String>,
    /// Save the current run after each `run`
    #[serde(default)]
    pub save: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            results_dir: default_results_dir(),
            github_repo: None,
            save: false,
        }
    }
}

fn default_format() -> String {
    "markdown".to_string()
}
fn default_results_dir() -> String {
    "target/cbench/results".to_string()
}

/// CI/CD configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiConfig {
    /// Regression threshold percentage
    #[serde(default = "default_threshold")]
    pub regression_threshold: f64,
    /// Exit with code 1 when a regression is detected
    #[serde(default)]
    pub fail_on_regression: bool,
}

impl Default for CiConfig {
    fn default() -> Self {
        Self {
            regression_threshold: default_threshold(),
            fail_on_regression: false,
        }
    }
}

fn default_threshold() -> f64 {
    cbench_stats::DEFAULT_REGRESSION_THRESHOLD
}

impl CbenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!("ignoring {}: {}", config_path.display(), e);
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# cbench Configuration

[runner]
# Directory with the pre-built compute-benchmarks binaries (uncomment to enable)
# bin_dir = "compute-benchmarks-build/bin"
# Timeout for a single benchmark process
timeout = "600s"
# Executions per case; results are merged into one value
iterations = 5
# Relative stddev above which a case is re-run
stddev_threshold = 0.02
# Extra rounds of iterations for noisy cases
max_reruns = 0
# Include the Unified Runtime SubmitKernel variants
include_ur = false

[runner.env]
# Environment variables passed to every benchmark process
# UR_L0_USE_IMMEDIATE_COMMANDLISTS = "1"

[compare]
# Baseline reduction: latest, average or median
mode = "latest"
# Number of newest saved values used by average/median
max = 10
# Saved run names drawn next to "This PR"
names = []

[output]
# Default output format: markdown, html, json, csv, human
format = "markdown"
# Directory of saved run snapshots
results_dir = "target/cbench/results"
# GitHub repository for commit links (uncomment to enable)
# github_repo = "owner/name"
# Save the current run after each `cbench run`
save = false

[ci]
# Regression threshold percentage
regression_threshold = 5.0
# Exit with code 1 when a regression is detected
fail_on_regression = false
"#
        .to_string()
    }

    /// Parse duration string (e.g., "600s", "500ms", "2m")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration: {}", s));
        }

        let multiplier: f64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1_000.0,
            "ms" => 1_000_000.0,
            "s" | "" => 1_000_000_000.0,
            "m" | "min" => 60_000_000_000.0,
            "h" => 3_600_000_000_000.0,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok(Duration::from_nanos((value * multiplier) as u64))
    }

    /// Per-process timeout, falling back to the default on a malformed value
    pub fn timeout(&self) -> Duration {
        Self::parse_duration(&self.runner.timeout).unwrap_or_else(|e| {
            tracing::warn!("invalid runner.timeout {:?}: {}", self.runner.timeout, e);
            Duration::from_secs(600)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CbenchConfig::default();
        assert_eq!(config.runner.timeout, "600s");
        assert_eq!(config.runner.iterations, 5);
        assert_eq!(config.compare.mode, CompareMode::Latest);
        assert_eq!(config.compare.max, 10);
        assert_eq!(config.output.format, "markdown");
        assert!(!config.ci.fail_on_regression);
        assert_eq!(config.timeout(), Duration::from_secs(600));
    }

    #[test]
    fn test_parse_duration() {
        let ms = |n| Duration::from_millis(n);
        assert_eq!(CbenchConfig::parse_duration("3s").unwrap(), ms(3_000));
        assert_eq!(CbenchConfig::parse_duration("500ms").unwrap(), ms(500));
        assert_eq!(
            CbenchConfig::parse_duration("100us").unwrap(),
            Duration::from_micros(100)
        );
        assert_eq!(CbenchConfig::parse_duration("2m").unwrap(), ms(120_000));
        assert_eq!(CbenchConfig::parse_duration("1.5s").unwrap(), ms(1_500));
        assert_eq!(CbenchConfig::parse_duration("600").unwrap(), ms(600_000));
        assert!(CbenchConfig::parse_duration("").is_err());
        assert!(CbenchConfig::parse_duration("5 fortnights").is_err());
        assert!(CbenchConfig::parse_duration("-1s").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [runner]
            iterations = 3
            timeout = "10m"

            [runner.env]
            UR_L0_USE_IMMEDIATE_COMMANDLISTS = "1"

            [compare]
            mode = "median"
            names = ["baseline"]
        "#;

        let config: CbenchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runner.iterations, 3);
        assert_eq!(config.timeout(), Duration::from_secs(600));
        assert_eq!(
            config.runner.env.get("UR_L0_USE_IMMEDIATE_COMMANDLISTS"),
            Some(&"1".to_string())
        );
        assert_eq!(config.compare.mode, CompareMode::Median);
        assert_eq!(config.compare.names, vec!["baseline".to_string()]);
        // Defaults should still apply
        assert_eq!(config.output.results_dir, "target/cbench/results");
        assert!((config.ci.regression_threshold - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_toml_parses() {
        let config: CbenchConfig = toml::from_str(&CbenchConfig::default_toml()).unwrap();
        assert_eq!(config.runner.timeout, "600s");
        assert!(config.runner.env.is_empty());
        assert!(config.compare.names.is_empty());
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(toml::from_str::<CbenchConfig>("[compare]\nmode = \"fastest\"").is_err());
    }
}
