// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RefServeError>;

#[derive(Error, Debug)]
pub enum RefServeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Reference not found or expired: {ref_id}")]
    NotFound { ref_id: String },

    #[error("Access denied for reference: {ref_id}")]
    AccessDenied { ref_id: String },

    #[error("Scaffold error: {0}")]
    Scaffold(String),

    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RefServeError {
    /// True for the two cache lookup failures that tools report as the
    /// generic "invalid or inaccessible reference" response.
    pub fn is_reference_error(&self) -> bool {
        matches!(
            self,
            RefServeError::NotFound { .. } | RefServeError::AccessDenied { .. }
        )
    }
}

impl From<serde_json::Error> for RefServeError {
    fn from(err: serde_json::Error) -> Self {
        RefServeError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_error_classification() {
        let not_found = RefServeError::NotFound {
            ref_id: "ref-abc".to_string(),
        };
        let denied = RefServeError::AccessDenied {
            ref_id: "ref-abc".to_string(),
        };
        let other = RefServeError::Validation("count out of range".to_string());

        assert!(not_found.is_reference_error());
        assert!(denied.is_reference_error());
        assert!(!other.is_reference_error());
    }

    #[test]
    fn test_error_display() {
        let err = RefServeError::CommandFailed {
            command: "git init".to_string(),
            message: "not a directory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command 'git init' failed: not a directory"
        );
    }
}
