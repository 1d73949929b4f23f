/// Reminder interval math
///
/// Level 1 reminds once an hour, level 10 every five minutes, with a linear
/// interpolation in between rounded to whole minutes.

use crate::domain::Level;

/// Interval for the lowest level
pub const SLOWEST_INTERVAL_MINUTES: u32 = 60;
/// Interval for the highest level
pub const FASTEST_INTERVAL_MINUTES: u32 = 5;

/// Reminder interval in minutes for a raw level
///
/// The level is clamped to 1..=10 first, so out-of-range input behaves like
/// the nearest valid level.
pub fn interval_minutes(level: i64) -> u32 {
    let clamped = Level::clamped(level).value() as f64;
    let span = (SLOWEST_INTERVAL_MINUTES - FASTEST_INTERVAL_MINUTES) as f64;
    let steps = (Level::MAX - Level::MIN) as f64;
    let interval = SLOWEST_INTERVAL_MINUTES as f64 - (clamped - 1.0) * (span / steps);
    interval.round() as u32
}

/// Human readable interval: "45 minutes", "1 hour", "1h 30m"
pub fn format_interval(minutes: u32) -> String {
    if minutes >= 60 {
        let hours = minutes / 60;
        let remaining = minutes % 60;
        if remaining == 0 {
            return format!("{} hour{}", hours, plural(hours));
        }
        return format!("{}h {}m", hours, remaining);
    }
    format!("{} minute{}", minutes, plural(minutes))
}

/// Formatted reminder interval for a raw level
pub fn interval_for_level(level: i64) -> String {
    format_interval(interval_minutes(level))
}

fn plural(value: u32) -> &'static str {
    if value > 1 { "s" } else { "" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_endpoints() {
        assert_eq!(interval_minutes(1), 60);
        assert_eq!(interval_minutes(10), 5);
    }

    #[test]
    fn test_interval_every_level() {
        let expected = [60, 54, 48, 42, 36, 29, 23, 17, 11, 5];
        for (level, minutes) in (1..=10).zip(expected) {
            assert_eq!(interval_minutes(level), minutes, "level {}", level);
        }
    }

    #[test]
    fn test_interval_clamps_out_of_range() {
        assert_eq!(interval_minutes(0), interval_minutes(1));
        assert_eq!(interval_minutes(-3), interval_minutes(1));
        assert_eq!(interval_minutes(11), interval_minutes(10));
        assert_eq!(interval_minutes(i64::MAX), 5);
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(60), "1 hour");
        assert_eq!(format_interval(120), "2 hours");
        assert_eq!(format_interval(90), "1h 30m");
        assert_eq!(format_interval(45), "45 minutes");
        assert_eq!(format_interval(1), "1 minute");
        assert_eq!(format_interval(0), "0 minute");
    }

    #[test]
    fn test_interval_for_level() {
        assert_eq!(interval_for_level(1), "1 hour");
        assert_eq!(interval_for_level(10), "5 minutes");
    }
}
