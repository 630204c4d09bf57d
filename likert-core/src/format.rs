//! Formatting helpers shared by front ends.

use chrono::{DateTime, FixedOffset, Local, TimeZone};

use crate::scale::ScaleKind;

/// Shown when a record's metric no longer exists.
pub const UNKNOWN_SCALE: &str = "unknown scale";

/// Time of day of a record on the local clock.
pub fn format_time_of_day(ts: &DateTime<FixedOffset>) -> String {
    format_time_in(ts, &Local)
}

/// Time of day of `ts` on the clock of `tz`.
pub fn format_time_in<Tz: TimeZone>(ts: &DateTime<FixedOffset>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.with_timezone(tz).format("%H:%M:%S").to_string()
}

/// Bucket average rounded for display.
pub fn format_average(value: f64) -> String {
    format!("{:.2}", value)
}

/// Scale label for a metric lookup, falling back to [`UNKNOWN_SCALE`].
pub fn format_scale(scale: Option<&ScaleKind>) -> String {
    scale
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| UNKNOWN_SCALE.to_string())
}

/// Render a scale bound without a trailing `.0` on whole numbers.
pub fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_timestamp;

    #[test]
    fn test_time_of_day_uses_viewer_clock() {
        let ts = parse_timestamp("2024-01-01T21:05:09+02:00").unwrap();
        assert_eq!(format_time_in(&ts, &FixedOffset::east_opt(2 * 3600).unwrap()), "21:05:09");
        assert_eq!(format_time_in(&ts, &chrono::Utc), "19:05:09");
        assert_eq!(format_time_in(&ts, &FixedOffset::west_opt(5 * 3600).unwrap()), "14:05:09");

        let utc = parse_timestamp("2024-01-01T19:05:09Z").unwrap();
        assert_eq!(format_time_of_day(&ts), format_time_of_day(&utc));
    }

    #[test]
    fn test_format_average() {
        assert_eq!(format_average(3.0), "3.00");
        assert_eq!(format_average(10.0 / 3.0), "3.33");
    }

    #[test]
    fn test_format_scale_fallback() {
        assert_eq!(format_scale(Some(&ScaleKind::Binary)), "Yes/No (0-1)");
        assert_eq!(format_scale(None), UNKNOWN_SCALE);
    }

    #[test]
    fn test_format_bound() {
        assert_eq!(format_bound(100.0), "100");
        assert_eq!(format_bound(0.5), "0.5");
    }
}
