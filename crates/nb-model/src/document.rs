//! Notebook document
//!
//! [`NotebookDocument`] exclusively owns its cells. Structural changes go
//! through the methods here, each of which bumps a layout revision so a
//! writer that captured the revision earlier can check nobody else changed
//! the cell list underneath it.

use crate::cell::{Cell, CellType};
use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};

/// nbformat version pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FormatVersion {
    /// Major version (`nbformat`)
    pub major: u32,
    /// Minor version (`nbformat_minor`)
    pub minor: u32,
}

impl FormatVersion {
    /// Version written for newly created documents
    pub const DEFAULT: Self = Self { major: 4, minor: 2 };

    /// Create version pair
    #[inline]
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Whether cells carry an `id` field (nbformat 4.5+)
    #[inline]
    #[must_use]
    pub fn has_cell_ids(self) -> bool {
        self >= Self::new(4, 5)
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Ordered sequence of cells plus format metadata
#[derive(Debug, Clone, Default)]
pub struct NotebookDocument {
    format: FormatVersion,
    metadata: serde_json::Map<String, serde_json::Value>,
    cells: Vec<Cell>,
    revision: u64,
}

impl PartialEq for NotebookDocument {
    // The layout revision is bookkeeping for writers, not content.
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format && self.metadata == other.metadata && self.cells == other.cells
    }
}

impl NotebookDocument {
    /// Empty document at the default format version
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Document with one empty code cell, as created by the authoring action
    #[must_use]
    pub fn with_starter_cell() -> Self {
        Self::from_cells(vec![Cell::new(CellType::Code)])
    }

    /// Document holding the given cells
    #[inline]
    #[must_use]
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            ..Self::default()
        }
    }

    /// Set format version
    #[inline]
    #[must_use]
    pub fn with_format(mut self, format: FormatVersion) -> Self {
        self.format = format;
        self
    }

    /// Set notebook metadata
    #[inline]
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Format version
    #[inline]
    #[must_use]
    pub fn format(&self) -> FormatVersion {
        self.format
    }

    /// Notebook-level metadata
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.metadata
    }

    /// Mutable notebook-level metadata
    #[inline]
    pub fn metadata_mut(&mut self) -> &mut serde_json::Map<String, serde_json::Value> {
        &mut self.metadata
    }

    /// Cells in document order
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at index
    #[inline]
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Mutable cell at index (content only; the cell list stays fixed)
    #[inline]
    pub fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    /// Cell at index, or an invariant violation
    ///
    /// # Errors
    /// Returns [`ModelError::IndexOutOfRange`] if `index` is past the end
    pub fn try_cell_mut(&mut self, index: usize) -> Result<&mut Cell> {
        let len = self.cells.len();
        self.cells
            .get_mut(index)
            .ok_or(ModelError::out_of_range(index, len))
    }

    /// Iterate mutably over cells
    #[inline]
    pub fn cells_mut(&mut self) -> std::slice::IterMut<'_, Cell> {
        self.cells.iter_mut()
    }

    /// Number of cells
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if document has no cells
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Index of the last cell
    #[inline]
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.cells.len().checked_sub(1)
    }

    /// Layout revision, bumped by every structural change
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Insert a cell, shifting cells at `>= index` down
    ///
    /// # Errors
    /// Returns [`ModelError::IndexOutOfRange`] if `index > len`
    pub fn insert_cell(&mut self, index: usize, cell: Cell) -> Result<()> {
        if index > self.cells.len() {
            return Err(ModelError::out_of_range(index, self.cells.len()));
        }
        self.cells.insert(index, cell);
        self.bump();
        Ok(())
    }

    /// Remove and return the cell at `index`
    ///
    /// # Errors
    /// Returns [`ModelError::IndexOutOfRange`] if `index >= len`
    pub fn remove_cell(&mut self, index: usize) -> Result<Cell> {
        if index >= self.cells.len() {
            return Err(ModelError::out_of_range(index, self.cells.len()));
        }
        let cell = self.cells.remove(index);
        self.bump();
        Ok(cell)
    }

    /// Move a cell by removing it and reinserting it at `to`
    ///
    /// # Errors
    /// Returns [`ModelError::IndexOutOfRange`] if either index is past the end
    pub fn move_cell(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.cells.len();
        if from >= len {
            return Err(ModelError::out_of_range(from, len));
        }
        if to >= len {
            return Err(ModelError::out_of_range(to, len));
        }
        let cell = self.cells.remove(from);
        self.cells.insert(to, cell);
        self.bump();
        Ok(())
    }

    /// Clear outputs of every cell
    ///
    /// Returns the number of outputs removed.
    pub fn clear_all_outputs(&mut self) -> usize {
        self.cells
            .iter_mut()
            .map(|cell| cell.clear_outputs().len())
            .sum()
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{OutputVariant, StreamName};

    fn doc(texts: &[&str]) -> NotebookDocument {
        NotebookDocument::from_cells(texts.iter().map(|t| Cell::code(t)).collect())
    }

    fn texts(doc: &NotebookDocument) -> Vec<String> {
        doc.cells().iter().map(Cell::text).collect()
    }

    #[test]
    fn new_document_is_empty_v4_2() {
        let doc = NotebookDocument::new();
        assert!(doc.is_empty());
        assert_eq!(doc.format(), FormatVersion::new(4, 2));
        assert_eq!(doc.last_index(), None);
    }

    #[test]
    fn starter_document_has_one_code_cell() {
        let doc = NotebookDocument::with_starter_cell();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.cells()[0].cell_type(), CellType::Code);
    }

    #[test]
    fn insert_shifts_and_bumps_revision() {
        let mut d = doc(&["a", "b"]);
        d.insert_cell(1, Cell::code("x")).unwrap();
        assert_eq!(texts(&d), vec!["a", "x", "b"]);
        assert_eq!(d.revision(), 1);

        assert!(d.insert_cell(4, Cell::code("y")).is_err());
        assert_eq!(d.revision(), 1);
    }

    #[test]
    fn remove_and_move() {
        let mut d = doc(&["a", "b", "c"]);
        d.move_cell(0, 2).unwrap();
        assert_eq!(texts(&d), vec!["b", "c", "a"]);

        let removed = d.remove_cell(1).unwrap();
        assert_eq!(removed.text(), "c");
        assert_eq!(texts(&d), vec!["b", "a"]);
        assert_eq!(d.revision(), 2);

        assert_eq!(
            d.remove_cell(2).unwrap_err(),
            ModelError::out_of_range(2, 2)
        );
    }

    #[test]
    fn equality_ignores_revision() {
        let mut a = doc(&["a"]);
        a.insert_cell(1, Cell::code("b")).unwrap();
        let b = doc(&["a", "b"]);
        assert_ne!(a.revision(), b.revision());
        assert_eq!(a, b);
    }

    #[test]
    fn clear_all_outputs_counts() {
        let mut d = doc(&["a", "b"]);
        for cell in d.cells_mut() {
            cell.push_output(OutputVariant::stream(StreamName::Stdout, "x"))
                .unwrap();
        }
        assert_eq!(d.clear_all_outputs(), 2);
        assert!(d.cells().iter().all(|c| c.outputs().is_empty()));
    }

    #[test]
    fn cell_ids_from_4_5() {
        assert!(!FormatVersion::new(4, 4).has_cell_ids());
        assert!(FormatVersion::new(4, 5).has_cell_ids());
        assert_eq!(FormatVersion::DEFAULT.to_string(), "4.2");
    }
}
