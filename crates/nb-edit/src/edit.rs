//! Edit operations

use nb_model::CellType;

/// What to do with a code cell's outputs when it is retyped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputPolicy {
    /// Drop them; the edit record's before-snapshot still holds them
    #[default]
    Discard,
    /// Refuse to retype a cell that has outputs
    RequireEmpty,
}

/// A single editing operation
///
/// Operations without an explicit index act on the selected cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Insert an empty cell at `index`, select it and enter edit mode
    Insert {
        /// Position of the new cell
        index: usize,
        /// Type of the new cell
        cell_type: CellType,
    },
    /// Insert an empty code cell at the selection
    AddCellAbove,
    /// Insert an empty code cell after the selection and select it
    AddCellBelow,
    /// Remove the selected cell
    Delete,
    /// Swap the selected cell with the one above
    MoveUp,
    /// Swap the selected cell with the one below
    MoveDown,
    /// Split the selected cell at a character offset of its text
    Split {
        /// Caret position, in characters
        offset: usize,
    },
    /// Append the cell below to the selected cell
    MergeBelow,
    /// Append the selected cell to the cell above
    MergeAbove,
    /// Change the selected cell's type
    Retype {
        /// New type
        to: CellType,
        /// Handling of existing outputs when leaving `Code`
        outputs: OutputPolicy,
    },
    /// Replace the `#` prefix of a markdown cell's first line
    SetHeaderLevel(u8),
    /// Remove the selected cell's outputs
    ClearOutputs,
    /// Remove the outputs of every cell
    ClearAllOutputs,
    /// Replace the selected cell's text
    CommitText(String),
}

impl Edit {
    /// Retype discarding outputs
    #[inline]
    #[must_use]
    pub fn retype(to: CellType) -> Self {
        Self::Retype {
            to,
            outputs: OutputPolicy::Discard,
        }
    }

    /// Undo label for the operation
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "Add Cell",
            Self::AddCellAbove => "Add Cell Above",
            Self::AddCellBelow => "Add Cell Below",
            Self::Delete => "Delete Cell",
            Self::MoveUp => "Move Cell Up",
            Self::MoveDown => "Move Cell Down",
            Self::Split { .. } => "Split Cell",
            Self::MergeBelow => "Merge Cell Below",
            Self::MergeAbove => "Merge Cell Above",
            Self::Retype { .. } => "Change Cell Type",
            Self::SetHeaderLevel(_) => "Set Header Level",
            Self::ClearOutputs => "Clear Outputs",
            Self::ClearAllOutputs => "Clear All Outputs",
            Self::CommitText(_) => "Edit Cell",
        }
    }

    /// Whether the operation changes the cell list itself
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Insert { .. }
                | Self::AddCellAbove
                | Self::AddCellBelow
                | Self::Delete
                | Self::MoveUp
                | Self::MoveDown
                | Self::Split { .. }
                | Self::MergeBelow
                | Self::MergeAbove
        )
    }
}

impl std::fmt::Display for Edit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(Edit::Delete.label(), "Delete Cell");
        assert_eq!(Edit::retype(CellType::Markdown).to_string(), "Change Cell Type");
        assert_eq!(Edit::Split { offset: 0 }.label(), "Split Cell");
    }

    #[test]
    fn structural_classification() {
        assert!(Edit::MergeAbove.is_structural());
        assert!(Edit::Insert {
            index: 0,
            cell_type: CellType::Code
        }
        .is_structural());
        assert!(!Edit::SetHeaderLevel(2).is_structural());
        assert!(!Edit::ClearAllOutputs.is_structural());
        assert!(!Edit::CommitText(String::new()).is_structural());
    }
}
