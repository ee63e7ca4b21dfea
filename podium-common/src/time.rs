//! Timestamp utilities
//!
//! Rows store timestamps as RFC 3339 text.

use chrono::{DateTime, Utc};

/// Current time as stored in the database
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Milliseconds since the unix epoch
pub fn unix_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a stored timestamp, falling back to the unix epoch for garbage
pub fn parse_rfc3339(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_now_roundtrips_through_parse() {
        let stored = now_rfc3339();
        let parsed = parse_rfc3339(&stored);
        // Should be a reasonable timestamp (after year 2000)
        assert!(parsed.timestamp() > 946_684_800);
    }

    #[test]
    fn test_garbage_parses_to_epoch() {
        assert_eq!(parse_rfc3339("yesterday").timestamp(), 0);
    }

    #[tokio::test]
    async fn test_unix_millis_advances() {
        let first = unix_millis();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(unix_millis() > first);
    }

    #[test]
    fn test_millis_to_duration_one_second() {
        assert_eq!(millis_to_duration(1000), Duration::from_secs(1));
    }
}
