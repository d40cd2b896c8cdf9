// Task record and due-date handling

use crate::error::TaskError;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Naive date-time layouts accepted for due dates, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub text: String,
    #[serde(rename = "date", with = "due_format")]
    pub due_at: NaiveDateTime,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Build a pending task. `text` is stored trimmed.
    pub fn new(id: i64, text: &str, due_at: NaiveDateTime) -> Self {
        Self {
            id,
            text: text.trim().to_string(),
            due_at,
            completed: false,
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.completed { "Done" } else { "Pending" }
    }
}

/// Trimmed task text, or a validation error when nothing is left
pub fn validate_text(text: &str) -> Result<&str, TaskError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TaskError::Validation("task text cannot be empty".to_string()));
    }
    Ok(trimmed)
}

/// Parse a user-supplied or stored due date.
///
/// Accepts the `datetime-local` layout (`2024-05-01T14:30`), the same with
/// seconds or a space separator, RFC 3339, and a bare date (midnight).
/// Sub-second precision is dropped.
///
/// Due dates are stored as local wall-clock times. RFC 3339 input is converted
/// from its offset into the local zone first, so instants written with
/// different offsets still order chronologically.
pub fn parse_due(input: &str) -> Result<NaiveDateTime, TaskError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(TaskError::Validation("due date cannot be empty".to_string()));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(truncate_subsec(dt));
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(truncate_subsec(dt.with_timezone(&Local).naive_local()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(TaskError::Validation(format!("unrecognized due date: {:?}", s)))
}

/// Storage layout for a due date: minutes precision unless seconds are set
pub fn format_due(dt: &NaiveDateTime) -> String {
    if dt.second() == 0 {
        dt.format("%Y-%m-%dT%H:%M").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

fn truncate_subsec(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// Next id for a task created at `now` (epoch millis).
///
/// Ids follow creation time but stay strictly above every existing id, so two
/// tasks created in the same millisecond still get distinct ids. Fails when
/// an existing id already sits at `i64::MAX`.
pub fn next_id(existing: &[Task], now: i64) -> Result<i64, TaskError> {
    match existing.iter().map(|t| t.id).max() {
        Some(max) => {
            let after = max
                .checked_add(1)
                .ok_or_else(|| TaskError::Validation(format!("no task id left after {}", max)))?;
            Ok(now.max(after))
        }
        None => Ok(now),
    }
}

/// Current timestamp in milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub(crate) mod due_format {
    use super::{format_due, parse_due};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_due(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_due(&raw).map_err(serde::de::Error::custom)
    }
}
