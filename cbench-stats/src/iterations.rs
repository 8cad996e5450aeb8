//! Iteration Merging
//!
//! Every benchmark case runs several times. The repeated results are folded
//! into one result per label: values more than [`OUTLIER_SIGMAS`] standard
//! deviations from the rest of their group are dropped, the median-positioned result is kept and its
//! `stddev` is set from the spread of the remaining values.

use crate::summary::{mean, std_dev};
use cbench_core::BenchResult;
use fxhash::FxHashMap;

/// Results further than this many standard deviations from the rest of their group are discarded
pub const OUTLIER_SIGMAS: f64 = 3.0;

/// Drop values further than [`OUTLIER_SIGMAS`] standard deviations from the
/// mean of the other values.
///
/// Each value is judged against the rest of the group, so a single spike is
/// caught even in a handful of iterations. When the rest of the group has no
/// spread, any value that differs from it is an outlier. Fewer than three
/// results are returned unchanged, and a group is never emptied.
pub fn filter_outliers(results: Vec<BenchResult>) -> Vec<BenchResult> {
    if results.len() < 3 {
        return results;
    }

    let values: Vec<f64> = results.iter().map(|r| r.value).collect();
    let is_outlier = |i: usize| {
        let others: Vec<f64> = values
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, v)| *v)
            .collect();
        (values[i] - mean(&others)).abs() > OUTLIER_SIGMAS * std_dev(&others)
    };

    let kept: Vec<BenchResult> = results
        .iter()
        .enumerate()
        .filter(|(i, _)| !is_outlier(*i))
        .map(|(_, r)| r.clone())
        .collect();

    if kept.is_empty() { results } else { kept }
}

/// Fold a group of results for the same label into one.
///
/// Returns `None` for an empty group.
pub fn merge_label(results: Vec<BenchResult>) -> Option<BenchResult> {
    let mut results = filter_outliers(results);
    match results.len() {
        0 => None,
        1 => results.pop().map(|mut only| {
            only.stddev = 0.0;
            only
        }),
        n => {
            let values: Vec<f64> = results.iter().map(|r| r.value).collect();
            let spread = std_dev(&values);

            results.sort_by(|a, b| a.value.total_cmp(&b.value));
            let mut median = results.swap_remove(n / 2);
            median.stddev = spread;
            Some(median)
        }
    }
}

/// Merge repeated runs of the same cases into one result per label.
///
/// Labels keep the order in which they were first seen.
pub fn merge_iterations(iterations: Vec<Vec<BenchResult>>) -> Vec<BenchResult> {
    let mut order: Vec<String> = Vec::new();
    let mut by_label: FxHashMap<String, Vec<BenchResult>> = FxHashMap::default();

    for result in iterations.into_iter().flatten() {
        by_label
            .entry(result.label.clone())
            .or_insert_with(|| {
                order.push(result.label.clone());
                Vec::new()
            })
            .push(result);
    }

    order
        .into_iter()
        .filter_map(|label| by_label.remove(&label).and_then(merge_label))
        .collect()
}
