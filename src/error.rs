// Error taxonomy for task store commands

/// Errors surfaced by [`TaskStore`](crate::TaskStore) commands
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Missing or malformed user input
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("no task with id {0}")]
    NotFound(i64),

    /// Bulk delete on an empty collection
    #[error("nothing to delete")]
    Empty,

    /// Persisted task data could not be decoded at all
    #[error("stored task data is corrupt: {0}")]
    StorageCorrupt(String),

    /// The storage backend failed to read or write
    #[error("storage failure: {0:#}")]
    Storage(eyre::Report),
}

impl From<eyre::Report> for TaskError {
    fn from(report: eyre::Report) -> Self {
        TaskError::Storage(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    #[test]
    fn test_error_messages() {
        assert_eq!(TaskError::NotFound(42).to_string(), "no task with id 42");
        assert_eq!(TaskError::Empty.to_string(), "nothing to delete");
        assert_eq!(
            TaskError::Validation("task text cannot be empty".to_string()).to_string(),
            "invalid input: task text cannot be empty"
        );
    }

    #[test]
    fn test_storage_error_keeps_context_chain() {
        let report = Err::<(), _>(eyre::eyre!("disk full"))
            .wrap_err("Failed to write key todos")
            .unwrap_err();
        let err: TaskError = report.into();

        let message = err.to_string();
        assert!(message.contains("Failed to write key todos"));
        assert!(message.contains("disk full"));
    }
}
