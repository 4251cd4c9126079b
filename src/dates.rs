//! Lenient timestamp parsing for client-supplied dates.
//!
//! Inputs without an offset are read in the caller's local offset. Callers
//! decide what to do when nothing parses; none of these functions fail loudly.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde_json::Value;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

pub fn parse_timestamp(raw: &str, local: FixedOffset) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })?;
    local
        .from_local_datetime(&naive)
        .single()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Accepts a date string or a number of milliseconds since the epoch.
pub fn timestamp_from_json(value: &Value, local: FixedOffset) -> Option<DateTime<Utc>> {
    match value {
        Value::String(raw) => parse_timestamp(raw, local),
        Value::Number(millis) => millis
            .as_i64()
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// Calendar date of `raw`, read in UTC.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let utc = FixedOffset::east_opt(0)?;
    parse_timestamp(raw, utc).map(|timestamp| timestamp.date_naive())
}
