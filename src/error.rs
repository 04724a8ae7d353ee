//! Error types for exec-stream.

use thiserror::Error;

use crate::execution::ExecutionResult;

/// Main error type for exec-stream operations.
#[derive(Error, Debug)]
pub enum ExecStreamError {
    /// Command line produced no tokens.
    #[error("command is empty")]
    EmptyCommand,

    /// Command line could not be tokenized (unbalanced quotes).
    #[error("failed to parse command line: {0}")]
    CommandParse(#[from] shell_words::ParseError),

    /// The executable could not be started.
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The watchdog killed the process. Carries the partial result so the
    /// command, captured output, and duration stay readable.
    #[error("'{}' timed out after {}s", .0.command_line(), .0.duration().as_secs())]
    Timeout(Box<ExecutionResult>),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Write attempted on a closed file sink.
    #[error("output sink is closed")]
    SinkClosed,

    /// The background output pump did not run to completion.
    #[error("output pump failed: {0}")]
    Pump(String),

    /// Git output did not match the expected shape.
    #[error("git metadata error: {0}")]
    Git(String),
}

/// Convenience Result type for exec-stream operations.
pub type Result<T> = std::result::Result<T, ExecStreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_display() {
        let err = ExecStreamError::EmptyCommand;
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_spawn_display() {
        let err = ExecStreamError::Spawn {
            command: "no-such-binary --flag".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("no-such-binary --flag"));
        assert!(err.to_string().contains("failed to spawn"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ExecStreamError = io_err.into();
        assert!(matches!(err, ExecStreamError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_sink_closed_display() {
        let err = ExecStreamError::SinkClosed;
        assert!(err.to_string().contains("closed"));
    }

    #[test]
    fn test_git_display() {
        let err = ExecStreamError::Git("no remote configured".into());
        assert!(err.to_string().contains("no remote configured"));
    }
}
