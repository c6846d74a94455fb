//! Error types for the document model
//!
//! Everything here is an invariant violation: given correct use of the
//! editing and execution layers these are unreachable, so callers abort
//! the operation in progress rather than try to recover.

/// Model invariant violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Cell index outside the document
    #[error("cell index {index} out of range for document of {len} cells")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of cells in the document
        len: usize,
    },

    /// Outputs or execution counts attached to a non-code cell
    #[error("{cell_type} cells cannot carry outputs or execution counts")]
    OutputsNotAllowed {
        /// Type of the offending cell
        cell_type: crate::CellType,
    },

    /// A second cell was marked running while another one still is
    #[error("cell {requested} cannot run while cell {running} is running")]
    AlreadyRunning {
        /// Index currently running
        running: usize,
        /// Index that was requested
        requested: usize,
    },

    /// Generic invariant violation
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl ModelError {
    /// Create index-out-of-range error
    #[inline]
    #[must_use]
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellType;

    #[test]
    fn out_of_range_display() {
        let err = ModelError::out_of_range(5, 2);
        assert_eq!(
            err.to_string(),
            "cell index 5 out of range for document of 2 cells"
        );
    }

    #[test]
    fn outputs_not_allowed_display() {
        let err = ModelError::OutputsNotAllowed {
            cell_type: CellType::Raw,
        };
        assert!(err.to_string().starts_with("raw cells"));
    }
}
