//! Display formatting for durations and timestamps.
//!
//! Two distinct formatters: durations render as zero-padded `HH:MM:SS` from
//! a seconds count (hours unbounded), absolute timestamps render as a fixed
//! UTC date-time string with a `--:--` placeholder when missing.

use chrono::{DateTime, Utc};

/// Placeholder shown for a missing start or stop timestamp.
pub const MISSING_TIME: &str = "--:--";

/// Format a duration in whole seconds as zero-padded `HH:MM:SS`.
///
/// Hours are not capped at 24. Negative input clamps to zero, so a missing
/// duration renders as `00:00:00`.
pub fn format_duration(total_secs: i64) -> String {
    let total = total_secs.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Format an absolute timestamp in UTC, or the placeholder when absent.
pub fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => MISSING_TIME.to_string(),
    }
}

/// Parse a Postgres interval string (`HH:MM:SS` or `D days HH:MM:SS`) into
/// total seconds. Unparseable input yields 0, matching the lenient handling
/// of the analysis screen this serves.
pub fn parse_interval_secs(interval: &str) -> i64 {
    let s = interval.trim();
    if s.is_empty() {
        return 0;
    }

    let (days, hms) = match s.split_once(" day") {
        Some((d, rest)) => {
            let days = d.trim().parse::<i64>().unwrap_or(0);
            (days, rest.trim_start_matches('s').trim())
        }
        None => (0, s),
    };

    let mut parts = hms.split(':');
    let (h, m, sec) = match (parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), Some(sec)) => (h, m, sec),
        _ => return 0,
    };

    let h: i64 = match h.trim().parse() {
        Ok(v) => v,
        Err(_) => return 0,
    };
    let m: i64 = match m.trim().parse() {
        Ok(v) => v,
        Err(_) => return 0,
    };
    // seconds may carry a fractional part; truncate it
    let sec: i64 = match sec.split('.').next().unwrap_or("0").trim().parse() {
        Ok(v) => v,
        Err(_) => return 0,
    };

    days * 86_400 + h * 3600 + m * 60 + sec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_zero_pads() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(3), "00:00:03");
        assert_eq!(format_duration(5445), "01:30:45");
    }

    #[test]
    fn duration_hours_unbounded() {
        assert_eq!(format_duration(100 * 3600 + 61), "100:01:01");
    }

    #[test]
    fn duration_negative_clamps() {
        assert_eq!(format_duration(-5), "00:00:00");
    }

    #[test]
    fn timestamp_placeholder_when_missing() {
        assert_eq!(format_timestamp(None), "--:--");
        let ts = "2024-01-01T10:00:00Z".parse().unwrap();
        assert_eq!(format_timestamp(Some(ts)), "2024-01-01 10:00:00 UTC");
    }

    #[test]
    fn interval_plain_hms() {
        assert_eq!(parse_interval_secs("01:30:45"), 5445);
        assert_eq!(parse_interval_secs("00:00:00"), 0);
    }

    #[test]
    fn interval_with_days() {
        assert_eq!(parse_interval_secs("1 day 01:02:03"), 86_400 + 3723);
        assert_eq!(parse_interval_secs("2 days 00:00:01"), 2 * 86_400 + 1);
    }

    #[test]
    fn interval_fractional_seconds_truncate() {
        assert_eq!(parse_interval_secs("00:00:45.5"), 45);
    }

    #[test]
    fn interval_garbage_is_zero() {
        assert_eq!(parse_interval_secs(""), 0);
        assert_eq!(parse_interval_secs("soon"), 0);
        assert_eq!(parse_interval_secs("12:34"), 0);
    }
}
