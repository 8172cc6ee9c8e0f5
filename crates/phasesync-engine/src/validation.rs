//! Input checks that run before any remote call.

use std::collections::BTreeMap;
use std::fmt;

use phasesync_core::{DesiredPhase, parse_calendar_date, to_server_date};
use serde::{Deserialize, Serialize};
use time::Date;

/// Field path to messages, e.g. `deliverables[2].title`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Checks a desired phase and collects every problem found.
///
/// Range bounds must be `YYYY-MM-DD`. Deliverable due dates may also be full
/// RFC 3339 date-times, since editors reload them from the server.
pub fn validate_desired_phase(desired: &DesiredPhase) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if desired.title.trim().is_empty() {
        errors.add("title", "Title is required");
    }
    if desired.description.trim().is_empty() {
        errors.add("description", "Description is required");
    }

    let range = &desired.date_range;
    let start = check_range_bound(&mut errors, "dateRange.start", range.start.as_deref());
    let end = check_range_bound(&mut errors, "dateRange.end", range.end.as_deref());
    if let (Some(start), Some(end)) = (start, end)
        && start > end
    {
        errors.add("dateRange.end", "End date must not be before the start date");
    }

    if desired.deliverables.is_empty() {
        errors.add("deliverables", "At least one deliverable is required");
    }
    for (index, deliverable) in desired.deliverables.iter().enumerate() {
        if deliverable.title.trim().is_empty() {
            errors.add(format!("deliverables[{index}].title"), "Title is required");
        }
        if to_server_date(deliverable.due_date.as_deref()).is_err() {
            errors.add(
                format!("deliverables[{index}].dueDate"),
                "Due date must be YYYY-MM-DD or an RFC 3339 date-time",
            );
        }
    }

    errors.into_result()
}

fn check_range_bound(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
) -> Option<Date> {
    let raw = value.map(str::trim).filter(|v| !v.is_empty())?;
    match parse_calendar_date(raw) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "Date must be YYYY-MM-DD");
            None
        }
    }
}
