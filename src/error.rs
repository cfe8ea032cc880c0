//! Error types for rootshell.

use thiserror::Error;

use crate::execution::ExecutionPhase;

/// Main error type for rootshell operations.
///
/// Command execution itself never surfaces these: faults while talking to a
/// session are folded into the [`CommandResult`](crate::CommandResult).
#[derive(Error, Debug)]
pub enum RootShellError {
    /// The shell program could not be started.
    #[error("failed to spawn shell '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A spawned shell did not expose one of its standard pipes.
    #[error("shell process has no {0} pipe")]
    MissingPipe(&'static str),

    /// The shell is running but did not grant elevated permissions.
    #[error("privileged session was not granted")]
    PermissionDenied,

    /// Invalid execution phase transition attempted.
    #[error("invalid phase transition from {from:?} to {to:?}")]
    InvalidPhaseTransition {
        from: ExecutionPhase,
        to: ExecutionPhase,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for rootshell operations.
pub type Result<T> = std::result::Result<T, RootShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_display() {
        let err = RootShellError::Spawn {
            program: "su".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("'su'"));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_missing_pipe_display() {
        let err = RootShellError::MissingPipe("stdin");
        assert_eq!(err.to_string(), "shell process has no stdin pipe");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: RootShellError = io_err.into();
        assert!(matches!(err, RootShellError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_phase_transition_display() {
        let err = RootShellError::InvalidPhaseTransition {
            from: ExecutionPhase::Done,
            to: ExecutionPhase::Writing,
        };
        assert!(err.to_string().contains("Done"));
        assert!(err.to_string().contains("Writing"));
    }
}
