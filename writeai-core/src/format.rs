//! Formatting helpers shared across front-ends.

use chrono::{DateTime, Utc};

/// Format a timestamp relative to `now` the way the dashboard shows it:
/// "just now" under an hour, then whole hours, then whole days, then an
/// absolute date once it is a week old or more.
pub fn relative_time_at(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let hours = now.signed_duration_since(ts).num_hours();

    if hours < 1 {
        // Covers future timestamps from clock skew as well
        "just now".to_string()
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else {
        let days = hours / 24;
        if days < 7 {
            format!("{}d ago", days)
        } else {
            ts.format("%b %d, %Y").to_string()
        }
    }
}

/// Format a timestamp relative to the current time.
pub fn relative_time(ts: DateTime<Utc>) -> String {
    relative_time_at(ts, Utc::now())
}

/// Format a byte count with a binary unit suffix (e.g., "1.2 MB").
pub fn human_bytes(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;

    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Format a duration in seconds as "m:ss".
pub fn audio_duration(seconds: i64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc::now();

        assert_eq!(relative_time_at(now - Duration::minutes(10), now), "just now");
        assert_eq!(relative_time_at(now - Duration::minutes(90), now), "1h ago");
        assert_eq!(relative_time_at(now - Duration::hours(23), now), "23h ago");
        assert_eq!(relative_time_at(now - Duration::hours(25), now), "1d ago");
        assert_eq!(relative_time_at(now - Duration::days(6), now), "6d ago");
    }

    #[test]
    fn test_relative_time_falls_back_to_date() {
        let now = Utc::now();
        let old = now - Duration::days(10);
        let formatted = relative_time_at(old, now);
        assert!(!formatted.ends_with("ago"), "got {}", formatted);
        assert_eq!(formatted, old.format("%b %d, %Y").to_string());
    }

    #[test]
    fn test_relative_time_future_is_just_now() {
        let now = Utc::now();
        assert_eq!(relative_time_at(now + Duration::minutes(5), now), "just now");
    }

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(2048), "2.0 KB");
        assert_eq!(human_bytes(1_300_000), "1.2 MB");
    }

    #[test]
    fn test_audio_duration() {
        assert_eq!(audio_duration(65), "1:05");
        assert_eq!(audio_duration(9), "0:09");
    }
}
