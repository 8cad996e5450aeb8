//! SVG geometry helpers: scales, axis ticks and the series palette

/// Series colors (the tab10 palette)
pub(crate) const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub(crate) fn color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Drawing area inside the margins
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Maps a data interval onto a pixel interval
#[derive(Debug, Clone, Copy)]
pub(crate) struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    /// A degenerate domain is widened so that `map` stays finite.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let (lo, hi) = domain;
        let domain = if (hi - lo).abs() < f64::EPSILON {
            let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.05 };
            (lo - pad, hi + pad)
        } else {
            domain
        };
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// Round a raw step to 1, 2 or 5 times a power of ten
fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let nice = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Roughly `target` evenly spaced round values inside `[lo, hi]`
pub(crate) fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    if !(lo.is_finite() && hi.is_finite()) || hi <= lo || target == 0 {
        return Vec::new();
    }
    let step = nice_step((hi - lo) / target as f64);
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// `target` evenly spaced values covering `[lo, hi]` inclusive
pub(crate) fn linear_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    match target {
        0 => Vec::new(),
        1 => vec![lo],
        n => (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

/// Tick label without float noise
pub(crate) fn format_tick(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{}", rounded)
    }
}

/// Format an `f64` coordinate for an SVG attribute
pub(crate) fn px(value: f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_maps_endpoints() {
        let s = LinearScale::new((0.0, 10.0), (400.0, 100.0));
        assert_eq!(s.map(0.0), 400.0);
        assert_eq!(s.map(10.0), 100.0);
        assert_eq!(s.map(5.0), 250.0);
    }

    #[test]
    fn test_degenerate_domain_is_widened() {
        let s = LinearScale::new((20.0, 20.0), (0.0, 100.0));
        let (lo, hi) = s.domain();
        assert!(lo < 20.0 && hi > 20.0);
        assert!(s.map(20.0).is_finite());

        let z = LinearScale::new((0.0, 0.0), (0.0, 100.0));
        assert_eq!(z.domain(), (-1.0, 1.0));
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        let ticks = nice_ticks(7.3, 12.9, 5);
        assert!(ticks.iter().all(|t| (7.3..=12.9).contains(t)));
        assert!(!ticks.is_empty());
        assert!(nice_ticks(1.0, 1.0, 5).is_empty());
    }

    #[test]
    fn test_linear_ticks() {
        assert_eq!(linear_ticks(0.0, 10.0, 3), vec![0.0, 5.0, 10.0]);
        assert_eq!(linear_ticks(4.0, 10.0, 1), vec![4.0]);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(0.30000000000000004), "0.3");
        assert_eq!(format_tick(-0.0), "0");
        assert_eq!(format_tick(12.0), "12");
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(color(0), color(10));
    }
}
