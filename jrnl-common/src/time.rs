//! Timestamp utilities
//!
//! Timestamps are stored as RFC 3339 text with microsecond precision and a
//! `Z` suffix, so lexicographic order in SQLite matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::Result;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp for storage
pub fn to_storage(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub fn parse_storage(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

/// Short "Mon D" label used by mood trend charts (e.g. "Jul 7")
pub fn short_date_label(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d").to_string()
}

/// Date with year used when listing entries in prompts (e.g. "Jul 7, 2025")
pub fn long_date_label(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y").to_string()
}

/// Current Unix epoch time in milliseconds
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}
