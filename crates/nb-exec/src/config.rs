//! Coordinator configuration

use serde::{Deserialize, Serialize};

/// Coordinator behavior switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Keep going after a failed cell in an execute-all pass
    pub continue_after_error: bool,
    /// Give every started cell the next execution count
    pub assign_execution_counts: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            continue_after_error: false,
            assign_execution_counts: true,
        }
    }
}

impl CoordinatorConfig {
    /// Create default config
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set execute-all error behavior
    #[inline]
    #[must_use]
    pub fn with_continue_after_error(mut self, value: bool) -> Self {
        self.continue_after_error = value;
        self
    }

    /// Set execution count assignment
    #[inline]
    #[must_use]
    pub fn with_execution_counts(mut self, value: bool) -> Self {
        self.assign_execution_counts = value;
        self
    }
}
