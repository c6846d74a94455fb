//! Notebook cells
//!
//! A [`Cell`] stores its persisted source as nbformat lines. While the host is
//! interactively editing, the cell also holds an edit buffer: one
//! concatenated string that is split back into lines on commit. Outside an
//! in-progress edit the buffer is absent, so the two can never disagree.

use crate::error::{ModelError, Result};
use crate::output::OutputVariant;
use crate::text::{join_lines, split_lines};
use serde::{Deserialize, Serialize};

/// Type of notebook cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    /// Markdown documentation cell
    Markdown,
    /// Executable code cell
    #[default]
    Code,
    /// Raw text cell (no formatting, never executed)
    Raw,
}

impl CellType {
    /// nbformat `cell_type` tag
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Code => "code",
            Self::Raw => "raw",
        }
    }
}

impl std::fmt::Display for CellType {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CellType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "markdown" => Ok(Self::Markdown),
            "code" => Ok(Self::Code),
            "raw" => Ok(Self::Raw),
            _ => Err(format!(
                "Unknown cell type '{s}'. Expected: code, markdown, raw"
            )),
        }
    }
}

/// Single notebook cell
///
/// # Invariants
/// - Only `Code` cells carry outputs or an execution count
/// - The edit buffer, when present, is the only pending change; committing
///   it rewrites `source`
#[derive(Debug, Clone, Default)]
pub struct Cell {
    cell_type: CellType,
    id: Option<String>,
    source: Vec<String>,
    execution_count: Option<u32>,
    outputs: Vec<OutputVariant>,
    metadata: serde_json::Map<String, serde_json::Value>,
    edit_buffer: Option<String>,
}

impl PartialEq for Cell {
    // The edit buffer is transient scratch space, not document content.
    fn eq(&self, other: &Self) -> bool {
        self.cell_type == other.cell_type
            && self.id == other.id
            && self.source == other.source
            && self.execution_count == other.execution_count
            && self.outputs == other.outputs
            && self.metadata == other.metadata
    }
}

impl Cell {
    /// Empty cell of the given type
    #[inline]
    #[must_use]
    pub fn new(cell_type: CellType) -> Self {
        Self {
            cell_type,
            ..Self::default()
        }
    }

    /// Cell of the given type with source text
    #[must_use]
    pub fn with_text(cell_type: CellType, text: &str) -> Self {
        Self {
            cell_type,
            source: split_lines(text),
            ..Self::default()
        }
    }

    /// Code cell
    #[inline]
    #[must_use]
    pub fn code(text: &str) -> Self {
        Self::with_text(CellType::Code, text)
    }

    /// Markdown cell
    #[inline]
    #[must_use]
    pub fn markdown(text: &str) -> Self {
        Self::with_text(CellType::Markdown, text)
    }

    /// Raw cell
    #[inline]
    #[must_use]
    pub fn raw(text: &str) -> Self {
        Self::with_text(CellType::Raw, text)
    }

    /// Set the nbformat cell id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set cell metadata
    #[inline]
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set source lines verbatim
    #[inline]
    #[must_use]
    pub fn with_source(mut self, source: Vec<String>) -> Self {
        self.source = source;
        self
    }

    /// Cell type
    #[inline]
    #[must_use]
    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    /// nbformat cell id
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Cell metadata
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.metadata
    }

    /// Mutable cell metadata
    #[inline]
    pub fn metadata_mut(&mut self) -> &mut serde_json::Map<String, serde_json::Value> {
        &mut self.metadata
    }

    /// Persisted source lines
    #[inline]
    #[must_use]
    pub fn source(&self) -> &[String] {
        &self.source
    }

    /// Mutable source lines
    ///
    /// Discards any in-progress edit, since the buffer would no longer match.
    pub fn source_mut(&mut self) -> &mut Vec<String> {
        self.edit_buffer = None;
        &mut self.source
    }

    /// Current text: the edit buffer while editing, otherwise the joined source
    #[must_use]
    pub fn text(&self) -> String {
        match &self.edit_buffer {
            Some(buffer) => buffer.clone(),
            None => join_lines(&self.source),
        }
    }

    /// Check if the cell has no text
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match &self.edit_buffer {
            Some(buffer) => buffer.is_empty(),
            None => self.source.iter().all(String::is_empty),
        }
    }

    /// Replace the cell's text, committing it to source
    pub fn set_text(&mut self, text: &str) {
        self.source = split_lines(text);
        self.edit_buffer = None;
    }

    /// Start an interactive edit; the buffer starts as the current source
    pub fn begin_edit(&mut self) -> &mut String {
        let source = &self.source;
        self.edit_buffer.get_or_insert_with(|| join_lines(source))
    }

    /// In-progress edit buffer
    #[inline]
    #[must_use]
    pub fn edit_buffer(&self) -> Option<&str> {
        self.edit_buffer.as_deref()
    }

    /// Mutable edit buffer, if editing
    #[inline]
    pub fn edit_buffer_mut(&mut self) -> Option<&mut String> {
        self.edit_buffer.as_mut()
    }

    /// Check if an edit is in progress
    #[inline]
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.edit_buffer.is_some()
    }

    /// Commit the edit buffer to source
    ///
    /// Returns true if the source changed.
    pub fn commit_edit(&mut self) -> bool {
        let Some(buffer) = self.edit_buffer.take() else {
            return false;
        };
        let lines = split_lines(&buffer);
        if lines == self.source {
            return false;
        }
        self.source = lines;
        true
    }

    /// Drop the edit buffer without touching source
    #[inline]
    pub fn cancel_edit(&mut self) {
        self.edit_buffer = None;
    }

    /// Execution count (`In [n]`)
    #[inline]
    #[must_use]
    pub fn execution_count(&self) -> Option<u32> {
        self.execution_count
    }

    /// Set the execution count
    ///
    /// # Errors
    /// Returns [`ModelError::OutputsNotAllowed`] for non-code cells
    pub fn set_execution_count(&mut self, count: Option<u32>) -> Result<()> {
        if count.is_some() && self.cell_type != CellType::Code {
            return Err(ModelError::OutputsNotAllowed {
                cell_type: self.cell_type,
            });
        }
        self.execution_count = count;
        Ok(())
    }

    /// Outputs in production order
    #[inline]
    #[must_use]
    pub fn outputs(&self) -> &[OutputVariant] {
        &self.outputs
    }

    /// Append an output
    ///
    /// # Errors
    /// Returns [`ModelError::OutputsNotAllowed`] for non-code cells
    pub fn push_output(&mut self, output: OutputVariant) -> Result<()> {
        if self.cell_type != CellType::Code {
            return Err(ModelError::OutputsNotAllowed {
                cell_type: self.cell_type,
            });
        }
        self.outputs.push(output);
        Ok(())
    }

    /// Remove and return all outputs
    pub fn clear_outputs(&mut self) -> Vec<OutputVariant> {
        std::mem::take(&mut self.outputs)
    }

    /// Change the cell type
    ///
    /// Leaving `Code` drops the outputs and execution count, which are
    /// returned so the caller can decide what to do with them.
    pub fn set_cell_type(&mut self, cell_type: CellType) -> Vec<OutputVariant> {
        self.cell_type = cell_type;
        if cell_type == CellType::Code {
            return Vec::new();
        }
        self.execution_count = None;
        self.clear_outputs()
    }
}
