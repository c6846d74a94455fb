//! Error types for notebook sessions

use nb_codec::CodecError;
use nb_edit::EditError;
use nb_exec::{ExecError, RunState};
use std::path::PathBuf;

/// Session errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Decode, encode or file I/O failed
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Edit refused or invariant broken
    #[error("edit failed: {0}")]
    Edit(#[from] EditError),

    /// Execution request failed
    #[error("execution error: {0}")]
    Exec(#[from] ExecError),

    /// The operation is not allowed while cells are running
    #[error("{operation} is not allowed while {state}")]
    Busy {
        /// What was attempted
        operation: &'static str,
        /// Coordinator state at the time
        state: RunState,
    },

    /// Save requested for a document that was never given a path
    #[error("document has no path; use save_as")]
    NoPath,

    /// Revert requested before anything was loaded or saved
    #[error("no saved state to revert to")]
    NoSavedState,

    /// The flush sink refused pending changes
    #[error("failed to flush pending changes: {0}")]
    Flush(#[source] std::io::Error),

    /// Configuration file could not be read
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid TOML for [`SessionConfig`](crate::SessionConfig)
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

impl SessionError {
    /// Check if the error was a refusal because of an active run
    #[must_use]
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Busy { .. } => true,
            Self::Exec(err) => err.is_busy(),
            _ => false,
        }
    }
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_covers_coordinator_refusals() {
        let exec = SessionError::from(ExecError::Busy {
            state: RunState::Running(2),
        });
        assert!(exec.is_busy());

        let err = SessionError::Busy {
            operation: "Delete Cell",
            state: RunState::Cancelling,
        };
        assert_eq!(err.to_string(), "Delete Cell is not allowed while cancelling");
        assert!(!SessionError::NoPath.is_busy());
    }
}
