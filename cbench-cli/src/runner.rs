//! Benchmark Process Runner
//!
//! Runs the pre-built benchmark binaries and turns their output into results.
//!
//! ## Data Flow
//!
//! ```text
//! ExecutionPlan (Box<dyn Benchmark>)
//!        │
//!        ▼
//! ┌──────────────────┐
//! │    Executor      │  iterations × run_command → parse_output
//! └────────┬─────────┘
//!          │  noisy labels? run another round (max_reruns)
//!          ▼
//! ┌──────────────────┐
//! │ merge_iterations │  one BenchResult per label
//! └────────┬─────────┘
//!          ▼
//!   ExecutionOutcome (results + failures)
//! ```
//!
//! A failing case is logged and recorded; the remaining cases still run.

use cbench_core::{BenchEnv, BenchResult, Benchmark, ParseError};
use cbench_stats::{merge_iterations, relative_stddev};
use fxhash::FxHashMap;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Grace period between SIGTERM and SIGKILL
const TERM_GRACE: Duration = Duration::from_millis(500);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Errors from running a single benchmark process
#[derive(Debug, Error)]
pub enum RunError {
    /// The process could not be started or waited on
    #[error("Failed to spawn {command}: {source}")]
    Spawn {
        /// Command line as run
        command: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The process did not finish in time and was terminated
    #[error("{command} timed out after {timeout:?}")]
    Timeout {
        /// Command line as run
        command: String,
        /// Limit that was exceeded
        timeout: Duration,
    },

    /// The process exited unsuccessfully
    #[error("Benchmark exited with {code:?}: {stderr}")]
    Failed {
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The output did not contain a result row
    #[error("Could not parse benchmark output: {0}")]
    Parse(#[from] ParseError),
}

/// Send SIGTERM to a process. Returns `Err` if the signal could not be delivered.
fn send_sigterm(pid: u32) -> Result<(), std::io::Error> {
    let ret = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if ret == -1 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}

fn drain<R: Read + Send + 'static>(source: Option<R>) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut source) = source {
            let _ = source.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn wait_until(
    child: &mut std::process::Child,
    deadline: Instant,
) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// SIGKILL the child and collect its exit status
fn kill_and_reap(child: &mut std::process::Child) {
    // Fails only if the process already exited
    let _ = child.kill();
    let _ = child.wait();
}

/// Run a command and return its standard output.
///
/// `env` is applied on top of the parent environment. Output streams are
/// read on separate threads so a chatty process never blocks on a full pipe.
/// On timeout the process gets SIGTERM, then SIGKILL after a short grace.
pub fn run_command(command: &[String], env: &BenchEnv, timeout: Duration) -> Result<String, RunError> {
    let command_line = command.join(" ");
    let spawn_err = |source: std::io::Error| RunError::Spawn {
        command: command_line.clone(),
        source,
    };

    let (program, args) = command.split_first().ok_or_else(|| {
        spawn_err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "empty command",
        ))
    })?;

    tracing::debug!("running {}", command_line);
    let mut child = Command::new(program)
        .args(args)
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_err)?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let waited = match wait_until(&mut child, Instant::now() + timeout) {
        Ok(waited) => waited,
        Err(e) => {
            kill_and_reap(&mut child);
            return Err(spawn_err(e));
        }
    };
    let status = match waited {
        Some(status) => status,
        None => {
            // Process may already be gone
            let _ = send_sigterm(child.id());
            let exited = wait_until(&mut child, Instant::now() + TERM_GRACE)
                .ok()
                .flatten();
            if exited.is_none() {
                kill_and_reap(&mut child);
            }
            // Reader threads are detached; grandchildren may still hold the pipes
            drop((stdout, stderr));
            return Err(RunError::Timeout {
                command: command_line,
                timeout,
            });
        }
    };

    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();

    if !status.success() {
        return Err(RunError::Failed {
            code: status.code(),
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(stdout)
}

/// Runner settings resolved from config and CLI flags
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Directory with the benchmark binaries
    pub bin_dir: PathBuf,
    /// Per-process timeout
    pub timeout: Duration,
    /// Executions per case
    pub iterations: usize,
    /// Relative stddev above which a case is re-run
    pub stddev_threshold: f64,
    /// Extra rounds for noisy cases
    pub max_reruns: usize,
    /// Environment for every process
    pub env: BenchEnv,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            bin_dir: PathBuf::from("."),
            timeout: Duration::from_secs(600),
            iterations: 5,
            stddev_threshold: 0.02,
            max_reruns: 0,
            env: BenchEnv::new(),
        }
    }
}

/// A case that could not be measured
#[derive(Debug)]
pub struct BenchFailure {
    /// Case label
    pub label: String,
    /// What went wrong
    pub error: RunError,
}

/// Results of executing a plan
#[derive(Debug, Default)]
pub struct ExecutionOutcome {
    /// Merged results in execution order
    pub results: Vec<BenchResult>,
    /// Cases that failed
    pub failures: Vec<BenchFailure>,
}

/// Execute benchmarks and merge their iterations
pub struct Executor {
    settings: RunnerSettings,
}

impl Executor {
    /// Create an executor with resolved settings
    pub fn new(settings: RunnerSettings) -> Self {
        Self { settings }
    }

    /// Execute one benchmark once
    pub fn run_once(&self, bench: &dyn Benchmark) -> Result<Vec<BenchResult>, RunError> {
        let command = bench.command(&self.settings.bin_dir);
        let mut env = self.settings.env.clone();
        env.extend(bench.extra_env_vars());

        let stdout = run_command(&command, &env, self.settings.timeout)?;
        Ok(bench.parse_output(&stdout, command, env)?)
    }

    fn run_round(
        &self,
        bench: &dyn Benchmark,
        rounds: &mut Vec<Vec<BenchResult>>,
    ) -> Result<(), RunError> {
        for _ in 0..self.settings.iterations.max(1) {
            rounds.push(self.run_once(bench)?);
        }
        Ok(())
    }

    /// Whether any label's values spread more than the threshold
    fn is_noisy(&self, rounds: &[Vec<BenchResult>]) -> bool {
        let mut values: FxHashMap<&str, Vec<f64>> = FxHashMap::default();
        for result in rounds.iter().flatten() {
            values.entry(result.label.as_str()).or_default().push(result.value);
        }
        values
            .values()
            .any(|v| relative_stddev(v) > self.settings.stddev_threshold)
    }

    /// Execute a single benchmark: all iterations plus reruns while noisy
    pub fn execute_single(&self, bench: &dyn Benchmark) -> Result<Vec<BenchResult>, RunError> {
        let mut rounds = Vec::new();
        self.run_round(bench, &mut rounds)?;

        for rerun in 0..self.settings.max_reruns {
            if !self.is_noisy(&rounds) {
                break;
            }
            tracing::info!("{} is noisy, rerun {}", bench.label(), rerun + 1);
            self.run_round(bench, &mut rounds)?;
        }

        Ok(merge_iterations(rounds))
    }

    /// Execute all provided benchmarks
    pub fn execute(&self, benchmarks: &[Box<dyn Benchmark>]) -> ExecutionOutcome {
        let pb = ProgressBar::new(benchmarks.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut outcome = ExecutionOutcome::default();
        for bench in benchmarks {
            let label = bench.label();
            pb.set_message(label.clone());
            match self.execute_single(bench.as_ref()) {
                Ok(results) => outcome.results.extend(results),
                Err(error) => {
                    tracing::warn!("{} failed: {}", label, error);
                    outcome.failures.push(BenchFailure { label, error });
                }
            }
            pb.inc(1);
        }

        pb.finish_with_message("Complete");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sh(script: &str) -> Vec<String> {
        vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn captures_stdout_with_env() {
        let mut env = BenchEnv::new();
        env.insert("CBENCH_TEST_VALUE".to_string(), "42".to_string());
        let out = run_command(&sh("echo value=$CBENCH_TEST_VALUE"), &env, Duration::from_secs(10))
            .unwrap();
        assert_eq!(out.trim(), "value=42");
    }

    #[test]
    fn parent_environment_is_inherited() {
        let out = run_command(&sh("echo $PATH"), &BenchEnv::new(), Duration::from_secs(10)).unwrap();
        assert!(!out.trim().is_empty());
    }

    #[test]
    fn nonzero_exit_is_failure() {
        let err = run_command(&sh("echo oops >&2; exit 3"), &BenchEnv::new(), Duration::from_secs(10))
            .unwrap_err();
        match err {
            RunError::Failed { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn timeout_terminates_process() {
        let start = Instant::now();
        let err = run_command(&sh("exec sleep 30"), &BenchEnv::new(), Duration::from_millis(200))
            .unwrap_err();
        match err {
            RunError::Timeout { command, timeout } => {
                assert_eq!(command, "/bin/sh -c exec sleep 30");
                assert_eq!(timeout, Duration::from_millis(200));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn killed_child_is_reaped() {
        let mut child = Command::new("/bin/sh")
            .args(["-c", "exec sleep 30"])
            .spawn()
            .unwrap();
        kill_and_reap(&mut child);
        assert!(child.try_wait().unwrap().is_some());

        // Second call on an exited child is harmless
        kill_and_reap(&mut child);
    }

    #[test]
    fn missing_binary_is_spawn_error() {
        let cmd = vec!["/nonexistent/cbench-binary".to_string()];
        let err = run_command(&cmd, &BenchEnv::new(), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
        let err = run_command(&[], &BenchEnv::new(), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
    }

    /// Prints a CSV row whose mean cycles through `values`
    struct Scripted {
        values: Vec<f64>,
        calls: AtomicUsize,
    }

    impl Benchmark for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }
        fn label(&self) -> String {
            "scripted Case".to_string()
        }
        fn test(&self) -> &str {
            "Case"
        }
        fn command(&self, _bin_dir: &std::path::Path) -> Vec<String> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst);
            let value = self.values[i % self.values.len()];
            sh(&format!("printf 'header\\nCase,{value},1,2,3\\n'"))
        }
    }

    fn scripted(values: &[f64]) -> Scripted {
        Scripted {
            values: values.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn iterations_are_merged() {
        let exec = Executor::new(RunnerSettings {
            iterations: 3,
            ..Default::default()
        });
        let bench = scripted(&[10.0, 12.0, 11.0]);
        let results = exec.execute_single(&bench).unwrap();

        assert_eq!(bench.calls.load(Ordering::SeqCst), 3);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, "scripted Case");
        assert_eq!(results[0].value, 11.0);
        assert!((results[0].stddev - 1.0).abs() < 1e-9);
        assert!(results[0].stdout.contains("Case,"));
    }

    #[test]
    fn noisy_cases_are_rerun() {
        let exec = Executor::new(RunnerSettings {
            iterations: 2,
            stddev_threshold: 0.02,
            max_reruns: 2,
            ..Default::default()
        });
        let bench = scripted(&[10.0, 20.0]);
        exec.execute_single(&bench).unwrap();
        assert_eq!(bench.calls.load(Ordering::SeqCst), 6);

        let stable = scripted(&[10.0]);
        exec.execute_single(&stable).unwrap();
        assert_eq!(stable.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failures_do_not_stop_the_run() {
        let exec = Executor::new(RunnerSettings {
            iterations: 1,
            bin_dir: PathBuf::from("/nonexistent"),
            ..Default::default()
        });
        let plan: Vec<Box<dyn Benchmark>> = vec![
            Box::new(cbench_core::VectorSum),
            Box::new(scripted(&[5.0])),
        ];
        let outcome = exec.execute(&plan);

        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(outcome.failures[0].error, RunError::Spawn { .. }));
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].value, 5.0);
    }
}
