//! Error types for the taskmaster crate.

use thiserror::Error;

/// Error types for task management and prioritization
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TasksError {
    // Task errors
    #[error("Task '{task_id}' not found")]
    TaskNotFound { task_id: String },

    #[error("Invalid status: '{status}'")]
    InvalidStatus { status: String },

    #[error("Invalid effort: '{effort}'")]
    InvalidEffort { effort: String },

    /// Malformed request or task shape. Raised before any backend call.
    #[error("Validation error: {reason}")]
    Validation { reason: String },

    // Prioritization errors
    /// Backend unreachable, timed out, or returned non-conforming output.
    #[error("Model response error: {reason}")]
    ModelResponse { reason: String },

    #[error("Prioritization result #{sequence} is stale (latest request is #{latest})")]
    StaleResult { sequence: u64, latest: u64 },

    #[error("AI provider not configured: {provider}")]
    ProviderNotConfigured { provider: String },

    #[error("Prompt template error: {reason}")]
    Template { reason: String },

    // Configuration errors
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("Failed to read file '{path}': {reason}")]
    FileRead { path: String, reason: String },

    #[error("Failed to parse JSON: {reason}")]
    JsonParse { reason: String },
}

impl TasksError {
    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub(crate) fn model_response(reason: impl Into<String>) -> Self {
        Self::ModelResponse {
            reason: reason.into(),
        }
    }

    /// Whether the caller can keep going with its task list unchanged.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ModelResponse { .. } | Self::StaleResult { .. })
    }
}

impl From<serde_json::Error> for TasksError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for taskmaster operations
pub type TasksResult<T> = Result<T, TasksError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TasksError::TaskNotFound {
            task_id: "123".to_string(),
        };
        assert_eq!(err.to_string(), "Task '123' not found");
    }

    #[test]
    fn test_stale_result_display() {
        let err = TasksError::StaleResult {
            sequence: 1,
            latest: 3,
        };
        assert_eq!(
            err.to_string(),
            "Prioritization result #1 is stale (latest request is #3)"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(TasksError::model_response("timeout").is_recoverable());
        assert!(!TasksError::validation("missing title").is_recoverable());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: TasksError = json_err.into();
        assert!(matches!(err, TasksError::JsonParse { .. }));
    }
}
