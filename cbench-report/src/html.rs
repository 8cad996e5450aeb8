//! HTML Report
//!
//! A single self-contained page with two chart sections:
//!
//! ```text
//! runs ──► process_benchmark_data ──► create_time_series_chart ──┐
//!   │                                                             ├──► generate_html
//!   └────► create_explicit_groups ──► create_grouped_bar_charts ──┘
//! ```
//!
//! Charts are inline SVG. Tooltips are SVG `<title>` elements and points
//! link to their commit on GitHub when a repository is configured.

use crate::format::format_short;
use crate::model::{
    BenchmarkChart, BenchmarkMetadata, BenchmarkSeries, ExplicitGroup, GroupRow, SeriesPoint,
    SeriesRun,
};
use crate::svg::{LinearScale, PlotArea, color, format_tick, linear_ticks, nice_ticks, px};
use cbench_core::BenchmarkRun;
use chrono::{DateTime, Utc};
use fxhash::FxHashMap;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use rayon::prelude::*;

const CHART_WIDTH: f64 = 1000.0;
const PLOT_HEIGHT: f64 = 290.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_LEFT: f64 = 80.0;
const LEGEND_ROW: f64 = 18.0;
const LEGEND_COLUMNS: usize = 3;
const MAX_BAR_WIDTH: f64 = 0.1;
const SUBTLE: &str = "#666666";

const STYLE: &str = r#"
body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    margin: 0;
    padding: 16px;
    background: #f8f9fa;
}
.container {
    max-width: 1100px;
    margin: 0 auto;
}
h1, h2 {
    color: #212529;
    text-align: center;
    margin-bottom: 24px;
    font-weight: 500;
}
.chart {
    background: white;
    border-radius: 8px;
    padding: 24px;
    margin-bottom: 24px;
    box-shadow: 0 1px 3px rgba(0,0,0,0.1);
    overflow-x: auto;
}
.chart > div {
    min-width: 600px;
    margin: 0 auto;
}
.chart svg {
    width: 100%;
    height: auto;
}
@media (max-width: 768px) {
    body {
        padding: 12px;
    }
    .chart {
        padding: 16px;
        border-radius: 6px;
    }
    h1 {
        font-size: 24px;
        margin-bottom: 16px;
    }
}
.filter-container {
    text-align: center;
    margin-bottom: 24px;
}
.filter-container input {
    padding: 8px;
    font-size: 16px;
    border: 1px solid #ccc;
    border-radius: 4px;
    width: 400px;
    max-width: 100%;
}
"#;

const SCRIPT: &str = r#"
function filterCharts() {
    const regexInput = document.getElementById('bench-filter').value;
    let regex;
    try {
        regex = new RegExp(regexInput, 'i');
    } catch (e) {
        return;
    }
    const charts = document.querySelectorAll('.chart');
    charts.forEach(chart => {
        const label = chart.getAttribute('data-label');
        if (regex.test(label)) {
            chart.style.display = '';
        } else {
            chart.style.display = 'none';
        }
    });
}
"#;

fn metadata_of(result: &cbench_core::BenchResult) -> BenchmarkMetadata {
    BenchmarkMetadata {
        unit: result.unit.clone(),
        lower_is_better: result.lower_is_better,
    }
}

/// Regroup runs into one time series per label.
///
/// Only runs named in `compare_names` are used. Series keep first-seen
/// label order; runs within a series keep first-seen run-name order.
pub fn process_benchmark_data(
    runs: &[BenchmarkRun],
    compare_names: &[String],
) -> Vec<BenchmarkSeries> {
    let mut series: Vec<BenchmarkSeries> = Vec::new();
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();

    for run in runs.iter().filter(|r| compare_names.contains(&r.name)) {
        for result in &run.results {
            let slot = *index.entry(result.label.as_str()).or_insert_with(|| {
                series.push(BenchmarkSeries {
                    label: result.label.clone(),
                    metadata: metadata_of(result),
                    runs: Vec::new(),
                });
                series.len() - 1
            });

            let point = SeriesPoint {
                date: run.date,
                value: result.value,
                stddev: result.stddev,
                git_hash: run.git_hash.clone(),
            };
            let entry = &mut series[slot];
            match entry.runs.iter_mut().find(|r| r.name == run.name) {
                Some(existing) => existing.points.push(point),
                None => entry.runs.push(SeriesRun {
                    name: run.name.clone(),
                    points: vec![point],
                }),
            }
        }
    }

    series
}

/// Collect results carrying an explicit group tag.
///
/// Every label gets one slot per compare name; the first result seen for a
/// slot wins.
pub fn create_explicit_groups(
    runs: &[BenchmarkRun],
    compare_names: &[String],
) -> Vec<ExplicitGroup> {
    let nnames = compare_names.len();
    let mut groups: Vec<ExplicitGroup> = Vec::new();
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();

    for run in runs {
        let Some(slot) = compare_names.iter().position(|n| *n == run.name) else {
            continue;
        };
        for result in &run.results {
            let Some(tag) = result.group() else {
                continue;
            };
            let gi = *index.entry(tag).or_insert_with(|| {
                groups.push(ExplicitGroup {
                    name: tag.to_string(),
                    nnames,
                    names: compare_names.to_vec(),
                    metadata: metadata_of(result),
                    rows: Vec::new(),
                });
                groups.len() - 1
            });

            let rows = &mut groups[gi].rows;
            let ri = match rows.iter().position(|r| r.label == result.label) {
                Some(ri) => ri,
                None => {
                    rows.push(GroupRow {
                        label: result.label.clone(),
                        values: vec![None; nnames],
                    });
                    rows.len() - 1
                }
            };
            let cell = &mut rows[ri].values[slot];
            if cell.is_none() {
                *cell = Some(result.value);
            }
        }
    }

    groups
}

fn y_label(unit: &str) -> String {
    if unit.is_empty() {
        "Value".to_string()
    } else {
        format!("Value ({})", unit)
    }
}

fn indicator(lower_is_better: bool) -> &'static str {
    if lower_is_better {
        "(lower is better)"
    } else {
        "(higher is better)"
    }
}

/// Title, direction subtitle and rotated y axis label
fn chart_frame(title: &str, metadata: &BenchmarkMetadata, plot: PlotArea) -> Markup {
    let center = plot.left + plot.width / 2.0;
    let middle = plot.top + plot.height / 2.0;
    html! {
        text x=(px(center)) y="22" text-anchor="middle" font-size="15" { (title) }
        text x=(px(center)) y="42" text-anchor="middle" font-size="10" font-style="italic" fill=(SUBTLE) {
            (indicator(metadata.lower_is_better))
        }
        text transform=(format!("translate(18,{}) rotate(-90)", px(middle))) text-anchor="middle" {
            (y_label(&metadata.unit))
        }
        rect x=(px(plot.left)) y=(px(plot.top)) width=(px(plot.width)) height=(px(plot.height))
            fill="none" stroke="#333333" stroke-width="0.8";
    }
}

fn y_axis(scale: &LinearScale, plot: PlotArea, grid: bool) -> Markup {
    let (lo, hi) = scale.domain();
    html! {
        @for tick in nice_ticks(lo, hi, 6) {
            @let y = scale.map(tick);
            @if grid {
                line x1=(px(plot.left)) x2=(px(plot.right())) y1=(px(y)) y2=(px(y))
                    stroke="#000000" stroke-opacity="0.2" stroke-width="0.8";
            }
            text x=(px(plot.left - 6.0)) y=(px(y)) dy="0.32em" text-anchor="end" {
                (format_tick(tick))
            }
        }
    }
}

fn point_tooltip(point: &SeriesPoint, unit: &str) -> String {
    format!(
        "Date: {}\nValue: {:.2} {}\nStddev: {:.2} {}\nGit Hash: {}",
        point.date.format("%Y-%m-%d %H:%M:%S"),
        point.value,
        unit,
        point.stddev,
        unit,
        point.git_hash
    )
}

fn commit_url(github_repo: Option<&str>, git_hash: &str) -> Option<String> {
    match github_repo {
        Some(repo) if !repo.is_empty() => {
            Some(format!("https://github.com/{}/commit/{}", repo, git_hash))
        }
        _ => None,
    }
}

/// Value axis bounds: three of the largest stddevs beyond the extreme values
fn value_domain(points: &[&SeriesPoint]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 1.0);
    }
    let (min_v, max_v) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.value), hi.max(p.value))
    });
    let max_sd = points.iter().map(|p| p.stddev).fold(0.0_f64, f64::max);
    (min_v - 3.0 * max_sd, max_v + 3.0 * max_sd)
}

fn render_time_series(series: &BenchmarkSeries, github_repo: Option<&str>) -> BenchmarkChart {
    let legend_width = 200.0;
    let plot = PlotArea {
        left: MARGIN_LEFT,
        top: MARGIN_TOP,
        width: CHART_WIDTH - MARGIN_LEFT - legend_width,
        height: PLOT_HEIGHT,
    };
    let height = plot.bottom() + 50.0;

    let runs: Vec<(&str, Vec<&SeriesPoint>)> = series
        .runs
        .iter()
        .map(|run| {
            let mut points: Vec<&SeriesPoint> = run.points.iter().collect();
            points.sort_by_key(|p| p.date);
            (run.name.as_str(), points)
        })
        .collect();
    let all: Vec<&SeriesPoint> = runs.iter().flat_map(|(_, p)| p.iter().copied()).collect();

    let y = LinearScale::new(value_domain(&all), (plot.bottom(), plot.top));

    let (min_t, max_t) = all.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        let t = p.date.timestamp() as f64;
        (lo.min(t), hi.max(t))
    });
    let x_domain = if all.is_empty() {
        (0.0, 1.0)
    } else if max_t - min_t < 1.0 {
        (min_t - 86_400.0, max_t + 86_400.0)
    } else {
        let pad = (max_t - min_t) * 0.05;
        (min_t - pad, max_t + pad)
    };
    let x = LinearScale::new(x_domain, (plot.left, plot.right()));
    let unit = series.metadata.unit.as_str();

    let svg = html! {
        svg xmlns="http://www.w3.org/2000/svg" viewBox=(format!("0 0 {} {}", CHART_WIDTH, height))
            width=(px(CHART_WIDTH)) height=(px(height)) font-family="sans-serif" font-size="11" {
            (chart_frame(&series.label, &series.metadata, plot))
            (y_axis(&y, plot, true))
            @if !all.is_empty() {
                @for tick in linear_ticks(x_domain.0, x_domain.1, 5) {
                    @let tx = x.map(tick);
                    @let date = DateTime::<Utc>::from_timestamp(tick as i64, 0);
                    line x1=(px(tx)) x2=(px(tx)) y1=(px(plot.top)) y2=(px(plot.bottom()))
                        stroke="#000000" stroke-opacity="0.2" stroke-width="0.8";
                    @if let Some(date) = date {
                        text x=(px(tx)) y=(px(plot.bottom() + 16.0)) text-anchor="middle" {
                            (date.format("%Y-%m-%d").to_string())
                            tspan x=(px(tx)) dy="1.2em" fill=(SUBTLE) {
                                (date.format("%H:%M:%S").to_string())
                            }
                        }
                    }
                }
            }
            @for (i, (name, points)) in runs.iter().enumerate() {
                @let c = color(i);
                g.series data-run=(name) {
                    polyline fill="none" stroke=(c) stroke-width="1.5" stroke-opacity="0.5"
                        points=(points.iter().map(|p| format!("{},{}", px(x.map(p.date.timestamp() as f64)), px(y.map(p.value)))).collect::<Vec<_>>().join(" "));
                    @for p in points {
                        @let px_x = px(x.map(p.date.timestamp() as f64));
                        line x1=(px_x) x2=(px_x) y1=(px(y.map(p.value - p.stddev))) y2=(px(y.map(p.value + p.stddev)))
                            stroke=(c) stroke-opacity="0.5";
                    }
                    @for p in points {
                        @let marker = html! {
                            circle cx=(px(x.map(p.date.timestamp() as f64))) cy=(px(y.map(p.value))) r="4" fill=(c) {
                                title { (point_tooltip(p, unit)) }
                            }
                        };
                        @if let Some(url) = commit_url(github_repo, &p.git_hash) {
                            a href=(url) target="_blank" { (marker) }
                        } @else {
                            (marker)
                        }
                    }
                }
                @let ly = plot.top + 8.0 + LEGEND_ROW * i as f64;
                line x1=(px(plot.right() + 12.0)) x2=(px(plot.right() + 32.0)) y1=(px(ly)) y2=(px(ly))
                    stroke=(c) stroke-width="2";
                text x=(px(plot.right() + 38.0)) y=(px(ly)) dy="0.32em" { (name) }
            }
        }
    };

    BenchmarkChart {
        label: series.label.clone(),
        html: svg.into_string(),
    }
}

/// One time-series chart per benchmark label, rendered in parallel.
pub fn create_time_series_chart(
    series: &[BenchmarkSeries],
    github_repo: Option<&str>,
) -> Vec<BenchmarkChart> {
    series
        .par_iter()
        .map(|s| render_time_series(s, github_repo))
        .collect()
}

fn bar_tooltip(run: &str, label: &str, value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("Run: {}\nLabel: {}\nValue: {:.2} {}", run, label, v, unit),
        None => format!("Run: {}\nLabel: {}\nno data", run, label),
    }
}

fn render_grouped_bars(group: &ExplicitGroup) -> BenchmarkChart {
    let rows = group.rows.len().max(1);
    let legend_lines = group.rows.len().div_ceil(LEGEND_COLUMNS);
    let plot = PlotArea {
        left: MARGIN_LEFT,
        top: MARGIN_TOP,
        width: CHART_WIDTH - MARGIN_LEFT - 40.0,
        height: PLOT_HEIGHT,
    };
    let legend_top = plot.bottom() + 24.0;
    let height = legend_top + LEGEND_ROW * legend_lines as f64 + 10.0;

    let bar_width = MAX_BAR_WIDTH.min(0.8 / rows as f64);
    let last = group.nnames.saturating_sub(1) as f64 + bar_width * (rows - 1) as f64;
    let (lo, hi) = (-bar_width / 2.0, last + bar_width / 2.0);
    let pad = (hi - lo) * 0.05;
    let x = LinearScale::new((lo - pad, hi + pad), (plot.left, plot.right()));

    let values = group.rows.iter().flat_map(|r| r.values.iter().flatten().copied());
    let (min_v, max_height) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let top = if max_height > 0.0 { max_height * 1.25 } else { 1.0 };
    let y = LinearScale::new((min_v, top), (plot.bottom(), plot.top));
    let bar_px = x.map(bar_width) - x.map(0.0);
    let column_width = plot.width / LEGEND_COLUMNS as f64;

    let svg = html! {
        svg xmlns="http://www.w3.org/2000/svg" viewBox=(format!("0 0 {} {}", CHART_WIDTH, height))
            width=(px(CHART_WIDTH)) height=(px(height)) font-family="sans-serif" font-size="11" {
            (chart_frame(&group.name, &group.metadata, plot))
            (y_axis(&y, plot, false))
            @for (i, row) in group.rows.iter().enumerate() {
                @let c = color(i);
                g.bars data-label=(row.label) {
                    @for (j, value) in row.values.iter().enumerate() {
                        @let v = value.unwrap_or(0.0);
                        @let center = x.map(j as f64 + bar_width * i as f64);
                        @let (y0, y1) = (y.map(0.0_f64.max(v)), y.map(0.0_f64.min(v)));
                        @let run = group.names.get(j).map(String::as_str).unwrap_or("");
                        rect x=(px(center - bar_px / 2.0)) y=(px(y0)) width=(px(bar_px)) height=(px(y1 - y0)) fill=(c) {
                            title { (bar_tooltip(run, &row.label, *value, &group.metadata.unit)) }
                        }
                        text x=(px(center)) y=(px(y0 - 3.0)) text-anchor="middle" font-size="9" {
                            (format_short(v))
                        }
                    }
                }
                @let lx = plot.left + column_width * (i % LEGEND_COLUMNS) as f64;
                @let ly = legend_top + LEGEND_ROW * (i / LEGEND_COLUMNS) as f64;
                rect x=(px(lx)) y=(px(ly - 5.0)) width="10" height="10" fill=(c);
                text x=(px(lx + 16.0)) y=(px(ly)) dy="0.32em" { (row.label) }
            }
            @for (j, name) in group.names.iter().enumerate() {
                @let center = x.map(j as f64 + bar_width * (rows - 1) as f64 / 2.0);
                text x=(px(center)) y=(px(y.map(max_height * 1.12))) text-anchor="middle"
                    font-style="italic" fill=(SUBTLE) { (name) }
            }
        }
    };

    BenchmarkChart {
        label: group.name.clone(),
        html: svg.into_string(),
    }
}

/// One grouped bar chart per explicit group, rendered in parallel.
///
/// Bars sit at the compare-name positions, one series per label. Missing
/// values are drawn as zero with a "no data" tooltip.
pub fn create_grouped_bar_charts(groups: &[ExplicitGroup]) -> Vec<BenchmarkChart> {
    groups.par_iter().map(render_grouped_bars).collect()
}

fn chart_list(charts: &[BenchmarkChart]) -> Markup {
    html! {
        @for chart in charts {
            div.chart data-label=(chart.label) {
                div { (PreEscaped(&chart.html)) }
            }
        }
    }
}

/// Complete HTML page with a regex filter over all charts
pub fn generate_html(
    runs: &[BenchmarkRun],
    github_repo: Option<&str>,
    compare_names: &[String],
) -> String {
    let series = process_benchmark_data(runs, compare_names);
    let timeseries = create_time_series_chart(&series, github_repo);

    let groups = create_explicit_groups(runs, compare_names);
    let bar_charts = create_grouped_bar_charts(&groups);

    let page = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Benchmark Results" }
                style { (PreEscaped(STYLE)) }
                script { (PreEscaped(SCRIPT)) }
            }
            body {
                div.container {
                    h1 { "Benchmark Results" }
                    div.filter-container {
                        input type="text" id="bench-filter" placeholder="Regex..." oninput="filterCharts()";
                    }
                    h2 { "Historical Results" }
                    div.charts { (chart_list(&timeseries)) }
                    h2 { "Explicit Group Results" }
                    div.charts { (chart_list(&bar_charts)) }
                }
            }
        }
    };
    page.into_string()
}
