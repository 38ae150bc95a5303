//! Date helper functions

use chrono::{DateTime, NaiveDate};

/// Format a published date for display (like "January 1, 2024")
///
/// Accepts a plain `YYYY-MM-DD` date or an RFC 3339 timestamp; anything
/// else is returned unchanged.
pub fn full_date(value: &str) -> String {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.format("%B %-d, %Y").to_string();
    }

    value
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_date() {
        assert_eq!(full_date("2024-01-15"), "January 15, 2024");
        assert_eq!(full_date("2025-06-01T08:30:00Z"), "June 1, 2025");
        assert_eq!(full_date("2023-11-05 10:00"), "November 5, 2023");
    }

    #[test]
    fn test_unparseable_date_is_kept() {
        assert_eq!(full_date("sometime in May"), "sometime in May");
        assert_eq!(full_date(""), "");
    }
}
