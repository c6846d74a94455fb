//! Error types for editing operations

use nb_model::ModelError;

/// Editing errors
///
/// A failed edit leaves the document and cursor exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// The operation's precondition does not hold (e.g. merge at the last cell)
    #[error("{op}: {reason}")]
    InvalidOperation {
        /// Operation name
        op: &'static str,
        /// Why it cannot be applied
        reason: String,
    },

    /// The document or cursor was already inconsistent
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl EditError {
    /// Create invalid-operation error
    pub fn invalid(op: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            op,
            reason: reason.into(),
        }
    }

    /// Check if the edit was refused (as opposed to an invariant violation)
    #[inline]
    #[must_use]
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation { .. })
    }
}

/// Result type alias for editing operations
pub type Result<T> = std::result::Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_operation_display() {
        let err = EditError::invalid("Merge Cell Below", "selected cell is the last cell");
        assert_eq!(
            err.to_string(),
            "Merge Cell Below: selected cell is the last cell"
        );
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn model_errors_convert() {
        let err: EditError = ModelError::out_of_range(3, 1).into();
        assert!(!err.is_invalid_operation());
    }
}
