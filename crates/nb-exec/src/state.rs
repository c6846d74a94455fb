//! Coordinator state machine
//!
//! `Idle → Running(i)` on a run request, `Running(i) → Running(i')` when an
//! execute-all pass moves on to the next code cell, `Running(i) → Idle` on
//! completion or failure, and `Running(i) → Cancelling → Idle` on stop.

use crate::error::{ExecError, Result};

/// Coordinator state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RunState {
    /// No cell is running
    #[default]
    Idle,
    /// The cell at this index is running
    Running(usize),
    /// A stop was requested; waiting for the runner to acknowledge
    Cancelling,
}

/// State without the cell index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// See [`RunState::Idle`]
    Idle,
    /// See [`RunState::Running`]
    Running,
    /// See [`RunState::Cancelling`]
    Cancelling,
}

impl RunState {
    /// Phase of this state
    #[inline]
    #[must_use]
    pub fn phase(self) -> RunPhase {
        match self {
            Self::Idle => RunPhase::Idle,
            Self::Running(_) => RunPhase::Running,
            Self::Cancelling => RunPhase::Cancelling,
        }
    }

    /// Running cell index
    #[inline]
    #[must_use]
    pub fn running_cell(self) -> Option<usize> {
        match self {
            Self::Running(i) => Some(i),
            Self::Idle | Self::Cancelling => None,
        }
    }

    /// Check if idle
    #[inline]
    #[must_use]
    pub fn is_idle(self) -> bool {
        self == Self::Idle
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Running(i) => write!(f, "running cell {i}"),
            Self::Cancelling => f.write_str("cancelling"),
        }
    }
}

/// Phases reachable from a phase
#[must_use]
pub fn allowed_transitions(from: RunPhase) -> &'static [RunPhase] {
    match from {
        RunPhase::Idle => &[RunPhase::Running],
        RunPhase::Running => &[RunPhase::Running, RunPhase::Idle, RunPhase::Cancelling],
        RunPhase::Cancelling => &[RunPhase::Idle],
    }
}

/// Validate a state transition
///
/// `Running → Running` is only legal when moving forward to a later cell.
///
/// # Errors
/// Returns [`ExecError::IllegalTransition`] otherwise
pub fn validate_transition(from: RunState, to: RunState) -> Result<()> {
    let forward = match (from, to) {
        (RunState::Running(i), RunState::Running(j)) => j > i,
        _ => true,
    };
    if forward && allowed_transitions(from.phase()).contains(&to.phase()) {
        Ok(())
    } else {
        Err(ExecError::IllegalTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transitions() {
        assert!(validate_transition(RunState::Idle, RunState::Running(0)).is_ok());
        assert!(validate_transition(RunState::Running(0), RunState::Running(2)).is_ok());
        assert!(validate_transition(RunState::Running(0), RunState::Idle).is_ok());
        assert!(validate_transition(RunState::Running(3), RunState::Cancelling).is_ok());
        assert!(validate_transition(RunState::Cancelling, RunState::Idle).is_ok());
    }

    #[test]
    fn illegal_transitions() {
        assert!(validate_transition(RunState::Idle, RunState::Cancelling).is_err());
        assert!(validate_transition(RunState::Idle, RunState::Idle).is_err());
        assert!(validate_transition(RunState::Cancelling, RunState::Running(0)).is_err());
        assert!(validate_transition(RunState::Running(2), RunState::Running(2)).is_err());
        assert!(validate_transition(RunState::Running(2), RunState::Running(1)).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(RunState::Idle.to_string(), "idle");
        assert_eq!(RunState::Running(4).to_string(), "running cell 4");
        assert_eq!(RunState::Running(4).running_cell(), Some(4));
        assert_eq!(RunState::Cancelling.running_cell(), None);
    }
}
