//! Calendar-date handling shared by the key scheme and the wire payloads.
//!
//! Callers hand us calendar dates (`YYYY-MM-DD`) while the server stores and
//! returns full RFC 3339 date-times.

use crate::error::{CoreError, Result};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(value: &str) -> Result<Date> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map_err(|e| CoreError::invalid_date(format!("'{value}' is not a YYYY-MM-DD date: {e}")))
}

/// Returns the calendar-date portion of a date or date-time string.
///
/// Anything that does not start with a valid `YYYY-MM-DD` (optionally followed
/// by a time part) reduces to the empty string, as does `None`.
pub fn date_only(value: Option<&str>) -> &str {
    let Some(raw) = value.map(str::trim) else {
        return "";
    };
    let Some(head) = raw.get(..10) else {
        return "";
    };
    let rest = &raw[10..];
    let has_time_part =
        rest.is_empty() || rest.starts_with('T') || rest.starts_with('t') || rest.starts_with(' ');
    if has_time_part && parse_calendar_date(head).is_ok() {
        head
    } else {
        ""
    }
}

/// Formats a calendar date as midnight UTC in RFC 3339.
pub fn midnight_utc(date: Date) -> Result<String> {
    Ok(PrimitiveDateTime::new(date, Time::MIDNIGHT)
        .assume_utc()
        .format(&Rfc3339)?)
}

/// Converts a caller-supplied date into the date-time the server expects.
///
/// Blank or absent values become `None` so they are omitted from payloads
/// rather than sent as empty strings. Full RFC 3339 values are normalized to UTC.
pub fn to_server_datetime(value: Option<&str>) -> Result<Option<String>> {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Ok(date) = parse_calendar_date(raw) {
        return midnight_utc(date).map(Some);
    }
    let parsed = OffsetDateTime::parse(raw, &Rfc3339).map_err(|e| {
        CoreError::invalid_date(format!("'{raw}' is neither YYYY-MM-DD nor RFC 3339: {e}"))
    })?;
    Ok(Some(parsed.to_offset(UtcOffset::UTC).format(&Rfc3339)?))
}

/// Converts a due date to midnight UTC of the calendar day it names.
///
/// Accepts the same input as [`to_server_datetime`], but the time and offset
/// of a full date-time are dropped: the stored day is the day written, which
/// is also the day [`date_only`] keys on.
pub fn to_server_date(value: Option<&str>) -> Result<Option<String>> {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let day = match parse_calendar_date(raw) {
        Ok(date) => date,
        Err(_) => OffsetDateTime::parse(raw, &Rfc3339)
            .map_err(|e| {
                CoreError::invalid_date(format!("'{raw}' is neither YYYY-MM-DD nor RFC 3339: {e}"))
            })?
            .date(),
    };
    midnight_utc(day).map(Some)
}
