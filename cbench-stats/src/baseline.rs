//! History Baselines
//!
//! Builds the reference value each current result is compared against from
//! previously saved runs. Depending on [`CompareMode`], the reference is the
//! newest saved value, or the mean or median of the newest `max` values.

use crate::percentiles::median;
use crate::summary::mean;
use cbench_core::BenchmarkRun;
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

/// How history is reduced to a single reference value per label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Newest saved value
    #[default]
    Latest,
    /// Mean of the newest `max` values
    Average,
    /// Median of the newest `max` values
    Median,
}

impl std::str::FromStr for CompareMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "latest" => Ok(CompareMode::Latest),
            "average" | "mean" => Ok(CompareMode::Average),
            "median" => Ok(CompareMode::Median),
            other => Err(format!("Unknown compare mode: {}", other)),
        }
    }
}

impl std::fmt::Display for CompareMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareMode::Latest => write!(f, "latest"),
            CompareMode::Average => write!(f, "average"),
            CompareMode::Median => write!(f, "median"),
        }
    }
}

/// Reference value for one label
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineEntry {
    /// Reduced reference value
    pub value: f64,
    /// Number of historical values it was reduced from
    pub samples: usize,
    /// Unit of the newest historical result
    pub unit: String,
}

/// Reference values keyed by label
#[derive(Debug, Clone, Default)]
pub struct Baseline {
    entries: FxHashMap<String, BaselineEntry>,
}

impl Baseline {
    /// Reference for a label
    pub fn get(&self, label: &str) -> Option<&BaselineEntry> {
        self.entries.get(label)
    }

    /// Number of labels with a reference
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no label has a reference
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace a reference
    pub fn insert(&mut self, label: impl Into<String>, entry: BaselineEntry) {
        self.entries.insert(label.into(), entry);
    }
}

/// Reduce saved runs to one reference value per label.
///
/// `history` may be in any order; runs are visited newest first. At most
/// `max` values per label are considered (`max == 0` is treated as 1).
pub fn build_baseline(history: &[BenchmarkRun], mode: CompareMode, max: usize) -> Baseline {
    let max = max.max(1);

    let mut runs: Vec<&BenchmarkRun> = history.iter().collect();
    runs.sort_by(|a, b| b.date.cmp(&a.date));

    let mut collected: FxHashMap<&str, (Vec<f64>, &str)> = FxHashMap::default();
    for run in runs {
        for result in &run.results {
            let (values, _) = collected
                .entry(result.label.as_str())
                .or_insert_with(|| (Vec::new(), result.unit.as_str()));
            if values.len() < max {
                values.push(result.value);
            }
        }
    }

    let mut baseline = Baseline::default();
    for (label, (values, unit)) in collected {
        let value = match mode {
            CompareMode::Latest => values[0],
            CompareMode::Average => mean(&values),
            CompareMode::Median => median(&values),
        };
        baseline.insert(
            label,
            BaselineEntry {
                value,
                samples: values.len(),
                unit: unit.to_string(),
            },
        );
    }
    baseline
}
