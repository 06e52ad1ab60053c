//! Error types for the execution service

use std::io;
use thiserror::Error;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that can occur while handling an execution request
///
/// Timeouts and output truncation are not represented here: both are normal,
/// successfully-reported outcomes carried as flags on
/// [`crate::execution::ExecutionResult`].
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Missing or incorrect credential
    #[error("Unauthorized")]
    Auth,

    /// A request field failed validation
    #[error("{field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    /// The operating system could not create the child process
    #[error("failed to start process: {0}")]
    Spawn(io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected failure in the executor's own bookkeeping
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_display() {
        let err = ServiceError::Auth;
        assert_eq!(err.to_string(), "Unauthorized");
    }

    #[test]
    fn test_validation_carries_field_and_reason() {
        let err = ServiceError::Validation {
            field: "command",
            reason: "must not be empty".to_string(),
        };
        assert_eq!(err.to_string(), "command: must not be empty");
    }

    #[test]
    fn test_spawn_wraps_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let err = ServiceError::Spawn(io_err);
        assert!(err.to_string().contains("failed to start process"));
    }

    #[test]
    fn test_result_type() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
