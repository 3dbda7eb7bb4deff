//! Formatting helpers shared across modules.

use std::time::Duration;

/// Formats a `std::time::Duration` into a human-readable string using `humantime`.
#[inline]
pub fn format_duration(duration: Duration) -> String {
    humantime::format_duration(duration).to_string()
}

/// Formats a weighted mean for display, rounded to two places.
pub fn format_statistic(statistic: Option<f64>) -> String {
    match statistic {
        Some(value) => {
            let rounded = (value * 100.0).round() / 100.0;
            format!("{rounded}")
        }
        None => "n/a".to_string(),
    }
}

/// Progress marker such as `(3/12 25%)`.
pub fn format_progress(current: usize, total: usize) -> String {
    let percent = if total > 0 { current * 100 / total } else { 100 };
    format!("({current}/{total} {percent}%)")
}

/// Renders an error and its `source()` chain, one cause per line.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str("\ncaused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistic_rounding() {
        assert_eq!(format_statistic(Some(19.0)), "19");
        assert_eq!(format_statistic(Some(23.456)), "23.46");
        assert_eq!(format_statistic(None), "n/a");
    }

    #[test]
    fn progress() {
        assert_eq!(format_progress(1, 3), "(1/3 33%)");
        assert_eq!(format_progress(3, 3), "(3/3 100%)");
        assert_eq!(format_progress(0, 0), "(0/0 100%)");
    }

    #[test]
    fn chain_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let outer = crate::replay::DecodeError::Io(io);
        assert_eq!(
            error_chain(&outer),
            "failed to read replay file\ncaused by: disk on fire"
        );
    }
}
