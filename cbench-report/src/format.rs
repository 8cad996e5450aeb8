//! Number formatting shared by the text renderers

/// Format a measured value the way it appears in charts and tables.
///
/// Whole numbers keep one decimal (`100.0`), everything else uses the
/// shortest representation that round-trips (`12.345`).
///
/// ```
/// assert_eq!(cbench_report::format_value(100.0), "100.0");
/// assert_eq!(cbench_report::format_value(12.345), "12.345");
/// ```
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Signed percentage with two decimals, e.g. `+8.00%`
pub fn format_delta(delta_percent: f64) -> String {
    format!("{:+.2}%", delta_percent)
}

/// Compact label for a bar value: at most two decimals, trailing zeros trimmed
pub(crate) fn format_short(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" || s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.0), "0.0");
        assert_eq!(format_value(3.5), "3.5");
        assert_eq!(format_value(-2.0), "-2.0");
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(8.0), "+8.00%");
        assert_eq!(format_delta(-12.346), "-12.35%");
    }

    #[test]
    fn test_format_short() {
        assert_eq!(format_short(12.0), "12");
        assert_eq!(format_short(12.5), "12.5");
        assert_eq!(format_short(0.004), "0");
        assert_eq!(format_short(1.236), "1.24");
    }
}
