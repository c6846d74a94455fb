//! Error types for the execution coordinator
//!
//! [`RunFailure`] is what a runner reports when the code it runs fails. It
//! never reaches the caller as an error: the coordinator turns it into an
//! `Error` output on the running cell. [`ExecError`] covers requests the
//! coordinator refuses and invariant violations it detects.

use crate::state::RunState;
use nb_model::{CellType, ModelError, OutputVariant};

/// Failure reported by the code runner for the running cell
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{ename}: {evalue}")]
pub struct RunFailure {
    /// Error name, e.g. `ZeroDivisionError`
    pub ename: String,
    /// Error message
    pub evalue: String,
    /// Traceback lines
    pub traceback: Vec<String>,
}

impl RunFailure {
    /// Create failure without traceback
    pub fn new(ename: impl Into<String>, evalue: impl Into<String>) -> Self {
        Self {
            ename: ename.into(),
            evalue: evalue.into(),
            traceback: Vec::new(),
        }
    }

    /// Set traceback lines
    #[inline]
    #[must_use]
    pub fn with_traceback(mut self, traceback: Vec<String>) -> Self {
        self.traceback = traceback;
        self
    }

    /// Error output recording this failure
    #[must_use]
    pub fn into_output(self) -> OutputVariant {
        OutputVariant::Error {
            ename: self.ename,
            evalue: self.evalue,
            traceback: self.traceback,
        }
    }
}

/// Coordinator errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    /// A run was requested while another is in progress
    #[error("coordinator is busy ({state}); request ignored")]
    Busy {
        /// State at the time of the request
        state: RunState,
    },

    /// Requested cell does not exist
    #[error("no cell at index {index} (document has {len} cells)")]
    NoSuchCell {
        /// Requested index
        index: usize,
        /// Number of cells
        len: usize,
    },

    /// Requested cell is not a code cell
    #[error("cell {index} is a {cell_type} cell and cannot be executed")]
    NotExecutable {
        /// Requested index
        index: usize,
        /// Its type
        cell_type: CellType,
    },

    /// State machine refused a transition
    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition {
        /// Current state
        from: RunState,
        /// Requested state
        to: RunState,
    },

    /// Document or cursor invariant violated during a run
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ExecError {
    /// Check if the request was refused because a run is in progress
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

/// Result type alias for coordinator operations
pub type Result<T> = std::result::Result<T, ExecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_becomes_error_output() {
        let failure = RunFailure::new("ValueError", "bad input")
            .with_traceback(vec!["line 1".into(), "line 2".into()]);
        assert_eq!(failure.to_string(), "ValueError: bad input");

        let output = failure.into_output();
        assert!(output.is_error());
        assert_eq!(output.summary().as_deref(), Some("ValueError: bad input"));
    }

    #[test]
    fn busy_display() {
        let err = ExecError::Busy {
            state: RunState::Running(2),
        };
        assert!(err.is_busy());
        assert_eq!(err.to_string(), "coordinator is busy (running cell 2); request ignored");
    }
}
