//! ISO-8601 normalization for record dates.
//!
//! Stored and returned dates use `YYYY-MM-DDTHH:MM:SS.mmmZ`. Inputs may be
//! RFC 3339 timestamps, bare dates (midnight UTC) or local date-times without
//! an offset, which are read as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use super::errors::RecordError;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(n) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(n.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}

pub fn to_iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Normalize a date taken from client input.
///
/// Absent or blank values become `None`; unparseable values are rejected.
pub fn normalize_input(field: &str, value: Option<&str>) -> Result<Option<String>, RecordError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse(s)
            .map(|dt| Some(to_iso(dt)))
            .ok_or_else(|| RecordError::Validation(format!("{field}: invalid date '{s}'"))),
    }
}

/// Render a stored date. Values that no longer parse are passed through as-is.
pub fn display(value: Option<&str>) -> Option<String> {
    match value {
        None | Some("") => None,
        Some(s) => Some(parse(s).map(to_iso).unwrap_or_else(|| s.to_string())),
    }
}
