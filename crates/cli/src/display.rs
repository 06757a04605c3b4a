use std::time::Duration;

use chrono::{DateTime, Local};
use itertools::Itertools;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f %Z";

/// Formats `duration` as e.g. `1h 15m 3s`, skipping zero parts.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let parts = [(total / 3600, "h"), (total / 60 % 60, "m"), (total % 60, "s")];

    let formatted = parts
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .join(" ");

    if formatted.is_empty() {
        "0s".to_string()
    } else {
        formatted
    }
}

#[must_use]
pub fn format_time(time: &DateTime<Local>) -> String {
    time.format(TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_millis(999)), "0s");
        assert_eq!(format_duration(Duration::from_secs(45)), "45s");
        assert_eq!(format_duration(Duration::from_secs(900)), "15m");
        assert_eq!(format_duration(Duration::from_secs(3600 + 61)), "1h 1m 1s");
        assert_eq!(format_duration(Duration::from_secs(2 * 3600)), "2h");
    }
}
