#![warn(missing_docs)]
//! cbench CLI Library
//!
//! Command-line orchestration for the compute benchmarks: select cases, run
//! the pre-built binaries, keep a history of runs, compare against it and
//! render reports.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     cbench_cli::run()
//! }
//! ```

mod config;
mod formatting;
mod history;
mod metadata;
mod planner;
mod runner;

pub use config::*;
pub use formatting::format_human_output;
pub use history::{ResultsStore, StoreError, sanitize_name};
pub use metadata::{UNKNOWN_HASH, current_git_hash, git_hash_in};
pub use planner::{ExecutionPlan, build_plan};
pub use runner::{
    BenchFailure, ExecutionOutcome, Executor, RunError, RunnerSettings, run_command,
};

use anyhow::anyhow;
use cbench_core::{BenchmarkRun, CURRENT_RUN_NAME, ComputeBench, Suite};
use cbench_report::{
    OutputFormat, generate_csv_report, generate_html, generate_json_report, generate_markdown,
};
use cbench_stats::{Comparison, ComparisonSummary, CompareMode, build_baseline, compare_results};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use regex::Regex;
use std::path::{Path, PathBuf};

/// cbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "cbench")]
#[command(author, version, about = "cbench - compute benchmark runner with history and reports")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: discover cbench.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of saved runs (overrides output.results_dir)
    #[arg(long, global = true)]
    pub results_dir: Option<PathBuf>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the selected benchmark cases
    List(ListArgs),
    /// Run benchmarks, compare against history and render a report
    Run(RunArgs),
    /// Render a report from saved runs only
    Report(ReportArgs),
    /// Compare the newest saved run of NAME against other saved runs
    Compare(CompareArgs),
    /// Write a default cbench.toml to the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Case selection shared by `list` and `run`
#[derive(Args, Debug, Clone)]
pub struct SelectArgs {
    /// Filter cases by regex on their label
    #[arg(default_value = ".*")]
    pub filter: String,

    /// Only cases of this benchmark binary
    #[arg(long)]
    pub binary: Option<String>,

    /// Include the Unified Runtime SubmitKernel variants
    #[arg(long)]
    pub include_ur: bool,
}

/// Arguments of `list`
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub select: SelectArgs,
}

/// Arguments of `run`
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub select: SelectArgs,

    /// Directory with the benchmark binaries (overrides runner.bin_dir)
    #[arg(long)]
    pub bin_dir: Option<PathBuf>,

    /// Name of this run
    #[arg(long, default_value = CURRENT_RUN_NAME)]
    pub name: String,

    /// Save the run to the results directory
    #[arg(long)]
    pub save: bool,

    /// Saved run names to compare against and chart (repeatable)
    #[arg(long, value_delimiter = ',')]
    pub compare: Vec<String>,

    /// Baseline reduction: latest, average or median
    #[arg(long)]
    pub compare_mode: Option<CompareMode>,

    /// Executions per case
    #[arg(long, short = 'n')]
    pub iterations: Option<usize>,

    /// Per-process timeout (e.g. "600s", "10m")
    #[arg(long)]
    pub timeout: Option<String>,

    /// Extra rounds of iterations for noisy cases
    #[arg(long)]
    pub max_reruns: Option<usize>,

    /// Regression threshold percentage
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Exit with code 1 when a regression is detected
    #[arg(long)]
    pub fail_on_regression: bool,

    /// Output format: markdown, html, json, csv, human
    #[arg(long)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments of `report`
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Saved run names to include (default: all, oldest first)
    #[arg(long, value_delimiter = ',')]
    pub compare: Vec<String>,

    /// Output format: markdown, html, json, csv, human
    #[arg(long, default_value = "html")]
    pub format: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments of `compare`
#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Saved run whose newest snapshot is compared
    #[arg(name = "NAME")]
    pub name: String,

    /// Saved run names forming the baseline (default: every other name)
    #[arg(long, value_delimiter = ',')]
    pub against: Vec<String>,

    /// Baseline reduction: latest, average or median
    #[arg(long)]
    pub compare_mode: Option<CompareMode>,

    /// Regression threshold percentage
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Exit with code 1 when a regression is detected
    #[arg(long)]
    pub fail_on_regression: bool,

    /// Output format: markdown, html, json, csv, human
    #[arg(long, default_value = "human")]
    pub format: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Run the cbench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
/// Exits the process with code 1 when a regression fails CI.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the cbench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let filter = if cli.verbose {
        "cbench=debug"
    } else {
        "cbench=info"
    };
    // Already initialised when called more than once in a process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    if dispatch(&cli)? {
        std::process::exit(1);
    }
    Ok(())
}

/// Execute a parsed command.
///
/// Returns `true` when the process should exit with code 1.
pub fn dispatch(cli: &Cli) -> anyhow::Result<bool> {
    // Explicit --config must load; otherwise discover cbench.toml (CLI flags override)
    let config = match &cli.config {
        Some(path) => CbenchConfig::load(path)
            .map_err(|e| anyhow!("Failed to load {}: {}", path.display(), e))?,
        None => CbenchConfig::discover().unwrap_or_default(),
    };

    let results_dir = cli
        .results_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.results_dir));
    let store = ResultsStore::new(results_dir);

    let should_fail = match &cli.command {
        Commands::List(args) => {
            list_benchmarks(&args.select, &config)?;
            false
        }
        Commands::Run(args) => run_benchmarks(args, &config, &store)?,
        Commands::Report(args) => {
            report_history(args, &config, &store)?;
            false
        }
        Commands::Compare(args) => compare_saved(args, &config, &store)?,
        Commands::Init { force } => {
            init_config(Path::new(CONFIG_FILE), *force)?;
            false
        }
    };
    Ok(should_fail)
}

fn parse_format(format: &str) -> anyhow::Result<OutputFormat> {
    format.parse().map_err(|e: String| anyhow!(e))
}

/// Select benchmarks from the compute suite using the planner module.
///
/// Cases keep their definition order.
fn select_benchmarks(select: &SelectArgs, config: &CbenchConfig) -> anyhow::Result<ExecutionPlan> {
    let filter_re = Regex::new(&select.filter)
        .map_err(|e| anyhow!("Invalid filter {:?}: {}", select.filter, e))?;
    let suite = ComputeBench::new(select.include_ur || config.runner.include_ur);

    Ok(build_plan(
        suite.benchmarks(),
        Some(&filter_re),
        select.binary.as_deref(),
    ))
}

fn list_benchmarks(select: &SelectArgs, config: &CbenchConfig) -> anyhow::Result<()> {
    println!("cbench Plan:");

    let plan = select_benchmarks(select, config)?;

    let mut binaries: Vec<(&str, Vec<_>)> = Vec::new();
    for bench in &plan.benchmarks {
        match binaries.iter_mut().find(|(name, _)| *name == bench.name()) {
            Some((_, benches)) => benches.push(bench),
            None => binaries.push((bench.name(), vec![bench])),
        }
    }

    for (binary, benches) in &binaries {
        println!("├── binary: {}", binary);
        for bench in benches {
            let group = bench
                .explicit_group()
                .map(|g| format!(" [group: {}]", g))
                .unwrap_or_default();
            println!("│   ├── {}{} ({})", bench.label(), group, bench.unit());
        }
    }

    println!("{} benchmarks found.", plan.len());
    Ok(())
}

/// Build RunnerSettings by layering: cbench.toml defaults → CLI overrides.
fn build_runner_settings(args: &RunArgs, config: &CbenchConfig) -> anyhow::Result<RunnerSettings> {
    let bin_dir = args
        .bin_dir
        .clone()
        .or_else(|| config.runner.bin_dir.as_ref().map(PathBuf::from))
        .ok_or_else(|| {
            anyhow!("No benchmark binary directory: pass --bin-dir or set runner.bin_dir")
        })?;

    let timeout = match &args.timeout {
        Some(t) => CbenchConfig::parse_duration(t)?,
        None => config.timeout(),
    };

    Ok(RunnerSettings {
        bin_dir,
        timeout,
        iterations: args.iterations.unwrap_or(config.runner.iterations),
        stddev_threshold: config.runner.stddev_threshold,
        max_reruns: args.max_reruns.unwrap_or(config.runner.max_reruns),
        env: config.runner.env.clone(),
    })
}

/// Saved runs the baseline is built from.
///
/// With `against` names, exactly the runs with those names (the current
/// run's own name included), minus `current` itself. Otherwise every run
/// whose name differs from the current run's.
pub fn baseline_history(
    history: &[BenchmarkRun],
    current: &BenchmarkRun,
    against: &[String],
) -> Vec<BenchmarkRun> {
    history
        .iter()
        .filter(|run| {
            if against.is_empty() {
                run.name != current.name
            } else {
                against.contains(&run.name) && *run != current
            }
        })
        .cloned()
        .collect()
}

/// Newest run of each name, in the order of `names`; missing names are skipped
pub fn latest_by_name(history: &[BenchmarkRun], names: &[String]) -> Vec<BenchmarkRun> {
    names
        .iter()
        .filter_map(|name| {
            let latest = history
                .iter()
                .filter(|run| &run.name == name)
                .max_by(|a, b| a.date.cmp(&b.date));
            if latest.is_none() {
                tracing::warn!("no saved run named {:?}", name);
            }
            latest.cloned()
        })
        .collect()
}

fn dedup_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// Everything a report is rendered from
pub struct ReportInput<'a> {
    /// The run the report is about
    pub current: &'a BenchmarkRun,
    /// Saved runs charted next to it (not including `current`)
    pub history: &'a [BenchmarkRun],
    /// Run names charted in HTML, `current` first
    pub names: &'a [String],
    /// Saved run names whose newest snapshot is charted next to `current` in Markdown
    pub baseline_names: &'a [String],
    /// Comparisons of `current` against its baseline
    pub comparisons: &'a [Comparison],
    /// Cases that failed while measuring `current`
    pub failures: &'a [BenchFailure],
    /// GitHub repository for commit links
    pub github_repo: Option<&'a str>,
}

/// Render a report in the requested format
pub fn render_report(format: OutputFormat, input: &ReportInput<'_>) -> anyhow::Result<String> {
    let output = match format {
        OutputFormat::Markdown => {
            let mut chart_data = vec![input.current.clone()];
            chart_data.extend(latest_by_name(input.history, input.baseline_names));
            generate_markdown(&chart_data, input.comparisons)
        }
        OutputFormat::Html => {
            let mut runs: Vec<BenchmarkRun> = input.history.to_vec();
            runs.push(input.current.clone());
            // Newest first, so explicit groups show the latest values
            runs.sort_by(|a, b| b.date.cmp(&a.date));
            generate_html(&runs, input.github_repo, input.names)
        }
        OutputFormat::Json => generate_json_report(input.current)?,
        OutputFormat::Csv => generate_csv_report(input.current, input.comparisons)?,
        OutputFormat::Human => format_human_output(input.current, input.comparisons, input.failures),
    };
    Ok(output)
}

fn write_output(output: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, output)
                .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e))?;
            println!("Report written to: {}", path.display());
        }
        None => print!("{}", output),
    }
    Ok(())
}

fn report_regressions(summary: &ComparisonSummary, threshold: f64, fail: bool) -> bool {
    if summary.regressions > 0 {
        tracing::warn!(
            "{} regression(s) detected above {}% threshold",
            summary.regressions,
            threshold
        );
    }
    summary.should_fail(fail)
}

fn run_benchmarks(
    args: &RunArgs,
    config: &CbenchConfig,
    store: &ResultsStore,
) -> anyhow::Result<bool> {
    let format = parse_format(args.format.as_deref().unwrap_or(&config.output.format))?;
    let settings = build_runner_settings(args, config)?;
    let plan = select_benchmarks(&args.select, config)?;

    if plan.is_empty() {
        println!("No benchmarks found.");
        return Ok(false);
    }

    tracing::info!(
        "Running {} benchmarks, {} iteration(s) each, from {}",
        plan.len(),
        settings.iterations,
        settings.bin_dir.display()
    );

    let outcome = Executor::new(settings).execute(&plan.benchmarks);
    if !outcome.failures.is_empty() {
        tracing::warn!("{} of {} benchmarks failed", outcome.failures.len(), plan.len());
    }

    let current = BenchmarkRun::new(
        args.name.clone(),
        Utc::now(),
        current_git_hash(),
        outcome.results,
    );

    let history = store.load_all()?;
    let against = if args.compare.is_empty() {
        config.compare.names.clone()
    } else {
        args.compare.clone()
    };
    let against = dedup_names(against);
    let names = dedup_names(std::iter::once(current.name.clone()).chain(against.iter().cloned()));

    let mode = args.compare_mode.unwrap_or(config.compare.mode);
    let threshold = args.threshold.unwrap_or(config.ci.regression_threshold);
    let baseline = build_baseline(
        &baseline_history(&history, &current, &against),
        mode,
        config.compare.max,
    );
    let comparisons = compare_results(&current.results, &baseline, threshold);
    tracing::debug!(
        "compared {} results against {} baseline entries ({})",
        comparisons.len(),
        baseline.len(),
        mode
    );

    let output = render_report(
        format,
        &ReportInput {
            current: &current,
            history: &history,
            names: &names,
            baseline_names: &against,
            comparisons: &comparisons,
            failures: &outcome.failures,
            github_repo: config.output.github_repo.as_deref(),
        },
    )?;
    write_output(&output, args.output.as_deref())?;

    if args.save || config.output.save {
        store.save(&current)?;
    }

    let summary = ComparisonSummary::from_comparisons(&comparisons);
    Ok(report_regressions(
        &summary,
        threshold,
        args.fail_on_regression || config.ci.fail_on_regression,
    ))
}

fn report_history(
    args: &ReportArgs,
    config: &CbenchConfig,
    store: &ResultsStore,
) -> anyhow::Result<()> {
    let format = parse_format(&args.format)?;
    let history = store.load_all()?;

    let names = if !args.compare.is_empty() {
        dedup_names(args.compare.iter().cloned())
    } else if !config.compare.names.is_empty() {
        dedup_names(config.compare.names.iter().cloned())
    } else {
        dedup_names(history.iter().map(|run| run.name.clone()))
    };

    let mut selected = latest_by_name(&history, &names);
    selected.sort_by(|a, b| b.date.cmp(&a.date));
    let Some(newest) = selected.first().cloned() else {
        return Err(anyhow!(
            "No saved runs in {} to report",
            store.dir().display()
        ));
    };

    // The newest selected run leads; the rest keep their requested order
    let ordered: Vec<String> = std::iter::once(newest.name.clone())
        .chain(names.iter().filter(|n| **n != newest.name).cloned())
        .collect();
    let others: Vec<BenchmarkRun> = history
        .iter()
        .filter(|run| **run != newest)
        .cloned()
        .collect();

    let output = render_report(
        format,
        &ReportInput {
            current: &newest,
            history: &others,
            names: &ordered,
            baseline_names: ordered.get(1..).unwrap_or_default(),
            comparisons: &[],
            failures: &[],
            github_repo: config.output.github_repo.as_deref(),
        },
    )?;
    write_output(&output, args.output.as_deref())
}

fn compare_saved(
    args: &CompareArgs,
    config: &CbenchConfig,
    store: &ResultsStore,
) -> anyhow::Result<bool> {
    let format = parse_format(&args.format)?;
    let history = store.load_all()?;

    let current = history
        .iter()
        .filter(|run| run.name == args.name)
        .max_by(|a, b| a.date.cmp(&b.date))
        .cloned()
        .ok_or_else(|| anyhow!("No saved run named {:?} in {}", args.name, store.dir().display()))?;

    let against_runs = baseline_history(&history, &current, &args.against);
    if against_runs.is_empty() {
        return Err(anyhow!("No saved runs to compare {:?} against", args.name));
    }

    let mode = args.compare_mode.unwrap_or(config.compare.mode);
    let threshold = args.threshold.unwrap_or(config.ci.regression_threshold);
    let baseline = build_baseline(&against_runs, mode, config.compare.max);
    let comparisons = compare_results(&current.results, &baseline, threshold);

    let baseline_names = dedup_names(against_runs.iter().map(|r| r.name.clone()));
    let names = dedup_names(std::iter::once(current.name.clone()).chain(baseline_names.iter().cloned()));
    let output = render_report(
        format,
        &ReportInput {
            current: &current,
            history: &against_runs,
            names: &names,
            baseline_names: &baseline_names,
            comparisons: &comparisons,
            failures: &[],
            github_repo: config.output.github_repo.as_deref(),
        },
    )?;
    write_output(&output, args.output.as_deref())?;

    let summary = ComparisonSummary::from_comparisons(&comparisons);
    Ok(report_regressions(
        &summary,
        threshold,
        args.fail_on_regression || config.ci.fail_on_regression,
    ))
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        return Err(anyhow!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    std::fs::write(path, CbenchConfig::default_toml())?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbench_core::BenchResult;
    use chrono::{TimeZone, Utc};

    fn run(name: &str, day: u32, value: f64) -> BenchmarkRun {
        BenchmarkRun::new(
            name,
            Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap(),
            format!("{name}-{day}"),
            vec![
                BenchResult::new("api_overhead SubmitKernel", value)
                    .with_name("api_overhead_benchmark_sycl")
                    .with_unit("μs"),
            ],
        )
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "cbench",
            "run",
            "SubmitKernel",
            "--bin-dir",
            "/opt/bin",
            "--compare",
            "baseline,nightly",
            "--compare-mode",
            "median",
            "-n",
            "3",
            "--save",
            "--fail-on-regression",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.select.filter, "SubmitKernel");
        assert_eq!(args.bin_dir, Some(PathBuf::from("/opt/bin")));
        assert_eq!(args.compare, names(&["baseline", "nightly"]));
        assert_eq!(args.compare_mode, Some(CompareMode::Median));
        assert_eq!(args.iterations, Some(3));
        assert_eq!(args.name, CURRENT_RUN_NAME);
        assert!(args.save && args.fail_on_regression);
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["cbench", "report"]).unwrap();
        let Commands::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.format, "html");
        assert!(args.compare.is_empty());

        let cli = Cli::try_parse_from(["cbench", "list"]).unwrap();
        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.select.filter, ".*");

        assert!(Cli::try_parse_from(["cbench", "compare"]).is_err());
    }

    #[test]
    fn runner_settings_layering() {
        let mut config = CbenchConfig::default();
        config.runner.bin_dir = Some("/from/config".to_string());
        config.runner.iterations = 7;

        let cli = Cli::try_parse_from(["cbench", "run", "--timeout", "2m"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let settings = build_runner_settings(&args, &config).unwrap();
        assert_eq!(settings.bin_dir, PathBuf::from("/from/config"));
        assert_eq!(settings.iterations, 7);
        assert_eq!(settings.timeout, std::time::Duration::from_secs(120));

        config.runner.bin_dir = None;
        assert!(build_runner_settings(&args, &config).is_err());
    }

    #[test]
    fn baseline_history_selection() {
        let history = vec![
            run("baseline", 1, 10.0),
            run("This PR", 2, 11.0),
            run("nightly", 3, 12.0),
        ];

        let current = run("This PR", 4, 13.0);

        let all_others = baseline_history(&history, &current, &[]);
        assert_eq!(all_others.len(), 2);
        assert!(all_others.iter().all(|r| r.name != "This PR"));

        let only = baseline_history(&history, &current, &names(&["nightly"]));
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].name, "nightly");
    }

    #[test]
    fn baseline_history_can_name_the_current_run() {
        let history = vec![run("This PR", 1, 10.0), run("baseline", 2, 9.0)];
        let current = run("This PR", 3, 12.0);

        let own = baseline_history(&history, &current, &names(&["This PR"]));
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].git_hash, "This PR-1");

        // The subject snapshot itself is never its own baseline
        let mut stored = history.clone();
        stored.push(current.clone());
        let own = baseline_history(&stored, &current, &names(&["This PR"]));
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].git_hash, "This PR-1");
    }

    #[test]
    fn latest_by_name_keeps_requested_order() {
        let history = vec![
            run("baseline", 1, 10.0),
            run("nightly", 2, 12.0),
            run("baseline", 3, 9.0),
        ];
        let latest = latest_by_name(&history, &names(&["nightly", "missing", "baseline"]));
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].name, "nightly");
        assert_eq!(latest[1].git_hash, "baseline-3");
    }

    #[test]
    fn render_markdown_charts_current_and_compared() {
        let current = run(CURRENT_RUN_NAME, 5, 10.0);
        let history = vec![run("baseline", 1, 8.0)];
        let names = names(&[CURRENT_RUN_NAME, "baseline"]);
        let baseline = build_baseline(&history, CompareMode::Latest, 10);
        let comparisons = compare_results(&current.results, &baseline, 5.0);

        let out = render_report(
            OutputFormat::Markdown,
            &ReportInput {
                current: &current,
                history: &history,
                names: &names,
                baseline_names: &names[1..],
                comparisons: &comparisons,
                failures: &[],
                github_repo: None,
            },
        )
        .unwrap();

        assert!(out.contains("This PR (10.0 μs)   : crit, 0, 10"));
        assert!(out.contains("baseline (8.0 μs)   :  0, 8"));
        assert!(out.contains("## Summary"));
        assert!(out.contains("+25.00%"));
    }

    #[test]
    fn render_json_is_the_snapshot() {
        let current = run(CURRENT_RUN_NAME, 5, 10.0);
        let out = render_report(
            OutputFormat::Json,
            &ReportInput {
                current: &current,
                history: &[],
                names: &names(&[CURRENT_RUN_NAME]),
                baseline_names: &[],
                comparisons: &[],
                failures: &[],
                github_repo: None,
            },
        )
        .unwrap();
        assert_eq!(cbench_report::parse_json_report(&out).unwrap(), current);
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);

        init_config(&path, false).unwrap();
        let written = CbenchConfig::load(&path).unwrap();
        assert_eq!(written.runner.iterations, 5);

        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
    }

    fn store_with(dir: &Path, runs: &[BenchmarkRun]) -> ResultsStore {
        let store = ResultsStore::new(dir.join("results"));
        for run in runs {
            store.save(run).unwrap();
        }
        store
    }

    fn report_args(compare: &[&str], output: &Path) -> ReportArgs {
        ReportArgs {
            compare: names(compare),
            format: "markdown".to_string(),
            output: Some(output.to_path_buf()),
        }
    }

    fn compare_args(name: &str, against: &[&str], output: &Path) -> CompareArgs {
        CompareArgs {
            name: name.to_string(),
            against: names(against),
            compare_mode: None,
            threshold: None,
            fail_on_regression: false,
            format: "markdown".to_string(),
            output: Some(output.to_path_buf()),
        }
    }

    /// Byte offset of a run's bar in a Mermaid chart
    fn bar_at(report: &str, name: &str) -> usize {
        report
            .find(&format!("\n        {name} ("))
            .unwrap_or_else(|| panic!("no bar for {name} in\n{report}"))
    }

    #[test]
    fn report_defaults_to_every_stored_name_newest_first() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_with(
            tmp.path(),
            &[
                run("baseline", 1, 10.0),
                run("nightly", 2, 11.0),
                run("baseline", 3, 12.0),
                run("release", 4, 13.0),
            ],
        );
        let out = tmp.path().join("report.md");

        report_history(&report_args(&[], &out), &CbenchConfig::default(), &store).unwrap();
        let report = std::fs::read_to_string(&out).unwrap();

        // Newest run leads, then the rest by first appearance
        let release = bar_at(&report, "release");
        let baseline = bar_at(&report, "baseline");
        let nightly = bar_at(&report, "nightly");
        assert!(release < baseline && baseline < nightly, "{report}");
        assert!(report.contains("baseline (12.0 μs)"));
        assert!(!report.contains("baseline (10.0 μs)"));
        assert!(!report.contains("## Summary"));
    }

    #[test]
    fn report_with_names_leads_with_newest_selected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_with(
            tmp.path(),
            &[
                run("baseline", 1, 10.0),
                run("nightly", 2, 11.0),
                run("release", 3, 13.0),
            ],
        );
        let out = tmp.path().join("report.md");

        let args = report_args(&["baseline", "nightly"], &out);
        report_history(&args, &CbenchConfig::default(), &store).unwrap();
        let report = std::fs::read_to_string(&out).unwrap();

        assert!(bar_at(&report, "nightly") < bar_at(&report, "baseline"));
        assert!(!report.contains("release ("));
    }

    #[test]
    fn report_without_history_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ResultsStore::new(tmp.path().join("empty"));
        let out = tmp.path().join("report.md");
        let err = report_history(&report_args(&[], &out), &CbenchConfig::default(), &store)
            .unwrap_err();
        assert!(err.to_string().contains("No saved runs"));
        assert!(!out.exists());
    }

    #[test]
    fn compare_without_baseline_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_with(tmp.path(), &[run("This PR", 1, 10.0)]);
        let out = tmp.path().join("compare.md");
        let config = CbenchConfig::default();

        let err = compare_saved(&compare_args("This PR", &[], &out), &config, &store).unwrap_err();
        assert!(err.to_string().contains("No saved runs to compare"));

        let err = compare_saved(&compare_args("missing", &[], &out), &config, &store).unwrap_err();
        assert!(err.to_string().contains("No saved run named"));
    }

    #[test]
    fn compare_fail_flags_are_ored() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_with(tmp.path(), &[run("baseline", 1, 10.0), run("This PR", 2, 20.0)]);
        let out = tmp.path().join("compare.md");

        let mut config = CbenchConfig::default();
        let mut args = compare_args("This PR", &[], &out);
        assert!(!compare_saved(&args, &config, &store).unwrap());
        assert!(std::fs::read_to_string(&out).unwrap().contains("+100.00%"));

        args.fail_on_regression = true;
        assert!(compare_saved(&args, &config, &store).unwrap());

        args.fail_on_regression = false;
        config.ci.fail_on_regression = true;
        assert!(compare_saved(&args, &config, &store).unwrap());

        // Within threshold: nothing to fail on
        args.threshold = Some(150.0);
        assert!(!compare_saved(&args, &config, &store).unwrap());
    }

    #[test]
    fn compare_against_own_history() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_with(
            tmp.path(),
            &[run("This PR", 1, 10.0), run("This PR", 2, 20.0)],
        );
        let out = tmp.path().join("compare.md");

        let mut args = compare_args("This PR", &["This PR"], &out);
        args.fail_on_regression = true;
        assert!(compare_saved(&args, &CbenchConfig::default(), &store).unwrap());

        let report = std::fs::read_to_string(&out).unwrap();
        assert!(report.contains("This PR (20.0 μs)"));
        assert!(report.contains("This PR (10.0 μs)"));
        assert!(report.contains("+100.00%"));
    }

    #[test]
    fn dispatch_reads_fail_flag_from_config() {
        let tmp = tempfile::tempdir().unwrap();
        store_with(tmp.path(), &[run("baseline", 1, 10.0), run("This PR", 2, 20.0)]);
        let config_path = tmp.path().join(CONFIG_FILE);
        std::fs::write(&config_path, "[ci]\nfail_on_regression = true\n").unwrap();
        let out = tmp.path().join("compare.txt");

        let results = tmp.path().join("results");
        let cli = Cli::try_parse_from([
            "cbench",
            "--config",
            config_path.to_str().unwrap(),
            "--results-dir",
            results.to_str().unwrap(),
            "compare",
            "This PR",
            "-o",
            out.to_str().unwrap(),
        ])
        .unwrap();
        assert!(dispatch(&cli).unwrap());
        assert!(std::fs::read_to_string(&out).unwrap().contains("Regressions: 1"));
    }

    #[test]
    fn dedup_keeps_first() {
        let out = dedup_names(names(&["a", "b", "a", "c"]));
        assert_eq!(out, names(&["a", "b", "c"]));
    }
}
