//! Results Store
//!
//! Saved runs live in one directory, one pretty JSON snapshot per run:
//! `<sanitized-name>_<YYYYMMDD_HHMMSS_mmm>.json`. Several snapshots may share
//! a run name; together they form that name's history. Existing snapshots are
//! never overwritten.

use cbench_core::BenchmarkRun;
use cbench_report::{generate_json_report, parse_json_report};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading or writing the results directory
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A run could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Replace everything but ASCII alphanumerics, `-` and `_` with `_`
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Directory of saved benchmark runs
#[derive(Debug, Clone)]
pub struct ResultsStore {
    dir: PathBuf,
}

impl ResultsStore {
    /// Store rooted at `dir`; nothing is created until the first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the snapshots are kept in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot file name for a run
    pub fn file_name(run: &BenchmarkRun) -> String {
        format!(
            "{}_{}.json",
            sanitize_name(&run.name),
            run.date.format("%Y%m%d_%H%M%S_%3f")
        )
    }

    /// Write a run, creating the directory if needed.
    ///
    /// Fails with [`std::io::ErrorKind::AlreadyExists`] when a snapshot with
    /// the same name and timestamp is already stored.
    pub fn save(&self, run: &BenchmarkRun) -> Result<PathBuf, StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        let path = self.dir.join(Self::file_name(run));
        let json = generate_json_report(run)?;
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(io_err(&path))?;
        file.write_all(json.as_bytes()).map_err(io_err(&path))?;
        tracing::info!("saved {} to {}", run.name, path.display());
        Ok(path)
    }

    /// Load every snapshot, oldest first.
    ///
    /// A missing directory is an empty history. Files that cannot be read
    /// or parsed are skipped with a warning.
    pub fn load_all(&self) -> Result<Vec<BenchmarkRun>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(io_err(&self.dir))? {
            let path = entry.map_err(io_err(&self.dir))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut runs: Vec<BenchmarkRun> = paths
            .par_iter()
            .filter_map(|path| {
                let loaded = std::fs::read_to_string(path)
                    .map_err(|e| e.to_string())
                    .and_then(|json| parse_json_report(&json).map_err(|e| e.to_string()));
                match loaded {
                    Ok(run) => Some(run),
                    Err(e) => {
                        tracing::warn!("skipping {}: {}", path.display(), e);
                        None
                    }
                }
            })
            .collect();

        runs.sort_by(|a, b| a.date.cmp(&b.date));
        tracing::debug!("loaded {} runs from {}", runs.len(), self.dir.display());
        Ok(runs)
    }

    /// Newest run with the given name
    pub fn latest(&self, name: &str) -> Result<Option<BenchmarkRun>, StoreError> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|run| run.name == name)
            .max_by(|a, b| a.date.cmp(&b.date)))
    }

    /// Distinct run names, ordered by first appearance (oldest first)
    pub fn names(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = Vec::new();
        for run in self.load_all()? {
            if !names.contains(&run.name) {
                names.push(run.name);
            }
        }
        Ok(names)
    }
}
