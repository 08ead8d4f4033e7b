//! ISO-8601 date and time parsing.
//!
//! These are the only parsers the converter uses for date/time fields.
//! Date-times carrying an offset are normalized to UTC; date-times without
//! one are taken as written.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, ParseError};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Parse an ISO-8601 date-time, with or without an offset.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, ParseError> {
    let s = s.trim();
    let mut last = match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => return Ok(dt.naive_utc()),
        Err(e) => e,
    };
    for format in DATETIME_FORMATS {
        match NaiveDateTime::parse_from_str(s, format) {
            Ok(dt) => return Ok(dt),
            Err(e) => last = e,
        }
    }
    Err(last)
}

/// Parse an ISO-8601 calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
}

/// Parse an ISO-8601 time of day.
pub fn parse_time(s: &str) -> Result<NaiveTime, ParseError> {
    let s = s.trim();
    let mut last = match NaiveTime::parse_from_str(s, TIME_FORMATS[0]) {
        Ok(t) => return Ok(t),
        Err(e) => e,
    };
    for format in &TIME_FORMATS[1..] {
        match NaiveTime::parse_from_str(s, format) {
            Ok(t) => return Ok(t),
            Err(e) => last = e,
        }
    }
    Err(last)
}
