// Encoding of the persisted task collection

use crate::error::TaskError;
use crate::task::Task;
use eyre::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Tasks recovered from a stored slot
#[derive(Debug, Default)]
pub struct Decoded {
    pub tasks: Vec<Task>,
    /// Records dropped because they failed validation
    pub skipped: usize,
}

/// Serialize the full collection as a JSON array, in insertion order
pub fn encode_tasks(tasks: &[Task]) -> Result<String> {
    serde_json::to_string(tasks).context("Failed to serialize task collection")
}

/// Decode a stored task array.
///
/// The slot must hold a JSON array (or `null`, treated as empty); anything
/// else is [`TaskError::StorageCorrupt`]. Inside the array each record is
/// checked on its own: records that do not fit the task schema, have blank
/// text, or repeat an earlier id are skipped with a warning so that one bad
/// entry does not take the rest of the list down with it.
pub fn decode_tasks(raw: &str) -> Result<Decoded, TaskError> {
    let items = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Null) => return Ok(Decoded::default()),
        Ok(other) => {
            return Err(TaskError::StorageCorrupt(format!(
                "expected a JSON array, found {}",
                value_kind(&other)
            )));
        }
        Err(e) => return Err(TaskError::StorageCorrupt(e.to_string())),
    };

    let mut decoded = Decoded::default();
    let mut seen_ids = HashSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let mut task: Task = match serde_json::from_value(item) {
            Ok(t) => t,
            Err(e) => {
                warn!(index, error = %e, "Failed to parse task record, skipping");
                decoded.skipped += 1;
                continue;
            }
        };

        let trimmed = task.text.trim();
        if trimmed.is_empty() {
            warn!(index, id = task.id, "Task record has empty text, skipping");
            decoded.skipped += 1;
            continue;
        }
        if trimmed.len() != task.text.len() {
            task.text = trimmed.to_string();
        }

        if !seen_ids.insert(task.id) {
            warn!(index, id = task.id, "Duplicate task id, keeping first occurrence");
            decoded.skipped += 1;
            continue;
        }

        decoded.tasks.push(task);
    }

    debug!(
        count = decoded.tasks.len(),
        skipped = decoded.skipped,
        "Decoded task records"
    );

    Ok(decoded)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::parse_due;

    fn sample() -> Vec<Task> {
        let mut done = Task::new(2, "Walk dog", parse_due("2024-05-02T08:15:30").unwrap());
        done.completed = true;
        vec![
            Task::new(1, "Buy milk", parse_due("2024-05-01T14:30").unwrap()),
            done,
            Task::new(3, "Call mom", parse_due("2023-12-31").unwrap()),
        ]
    }

    #[test]
    fn test_encode_then_decode_preserves_collection() {
        let tasks = sample();
        let raw = encode_tasks(&tasks).unwrap();
        let decoded = decode_tasks(&raw).unwrap();

        assert_eq!(decoded.tasks, tasks);
        assert_eq!(decoded.skipped, 0);
    }

    #[test]
    fn test_encoded_layout() {
        let raw = encode_tasks(&sample()[..1]).unwrap();
        assert_eq!(
            raw,
            r#"[{"id":1,"text":"Buy milk","date":"2024-05-01T14:30","completed":false}]"#
        );
    }

    #[test]
    fn test_decode_empty_array_and_null() {
        assert!(decode_tasks("[]").unwrap().tasks.is_empty());
        assert!(decode_tasks("null").unwrap().tasks.is_empty());
    }

    #[test]
    fn test_decode_malformed_json_is_corrupt() {
        assert!(matches!(decode_tasks("{not json"), Err(TaskError::StorageCorrupt(_))));
        assert!(matches!(decode_tasks(""), Err(TaskError::StorageCorrupt(_))));
    }

    #[test]
    fn test_decode_non_array_is_corrupt() {
        let err = decode_tasks(r#"{"id":1}"#).unwrap_err();
        match err {
            TaskError::StorageCorrupt(msg) => assert!(msg.contains("an object")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_skips_bad_records_and_keeps_the_rest() {
        let raw = r#"[
            {"id":1,"text":"Valid","date":"2024-05-01T14:30","completed":false},
            {"id":"two","text":"Bad id","date":"2024-05-01T14:30","completed":false},
            {"id":3,"text":"Bad date","date":"someday","completed":false},
            {"id":4,"text":"   ","date":"2024-05-01T14:30","completed":false},
            {"id":5,"date":"2024-05-01T14:30"},
            42,
            {"id":6,"text":"Also valid","date":"2024-05-03T10:00","completed":true}
        ]"#;

        let decoded = decode_tasks(raw).unwrap();
        let ids: Vec<i64> = decoded.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 6]);
        assert_eq!(decoded.skipped, 5);
    }

    #[test]
    fn test_decode_repairs_missing_flag_and_padded_text() {
        let raw = r#"[{"id":1,"text":"  Buy milk ","date":"2024-05-01T14:30"}]"#;
        let decoded = decode_tasks(raw).unwrap();

        assert_eq!(decoded.tasks.len(), 1);
        assert_eq!(decoded.tasks[0].text, "Buy milk");
        assert!(!decoded.tasks[0].completed);
    }

    #[test]
    fn test_decode_duplicate_ids_keep_first() {
        let raw = r#"[
            {"id":7,"text":"first","date":"2024-05-01T14:30","completed":false},
            {"id":7,"text":"second","date":"2024-05-01T14:30","completed":true}
        ]"#;
        let decoded = decode_tasks(raw).unwrap();

        assert_eq!(decoded.tasks.len(), 1);
        assert_eq!(decoded.tasks[0].text, "first");
        assert_eq!(decoded.skipped, 1);
    }
}
