//! Applying edits
//!
//! Every operation runs against a working copy of the document and cursor.
//! Only when it succeeds is the copy swapped in, and the replaced state is
//! handed back in the [`EditRecord`] for an external undo stack. A failed
//! operation therefore never leaves a half-applied change behind.

use crate::edit::{Edit, OutputPolicy};
use crate::error::{EditError, Result};
use crate::header::{with_header_level, MAX_HEADER_LEVEL};
use nb_model::{Cell, CellType, Cursor, ModelError, NotebookDocument};

/// Document and cursor at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// The document
    pub document: NotebookDocument,
    /// The cursor
    pub cursor: Cursor,
}

/// Outcome of a successful edit
#[derive(Debug, Clone, PartialEq)]
pub struct EditRecord {
    /// Undo label
    pub label: &'static str,
    /// State before the edit
    pub before: Snapshot,
    /// Whether the document content changed
    pub changed: bool,
    /// Cached syntax highlighting of the selected cell is stale
    pub refresh_highlighting: bool,
}

impl EditRecord {
    /// Restore the state captured before the edit
    pub fn undo(self, document: &mut NotebookDocument, cursor: &mut Cursor) {
        *document = self.before.document;
        *cursor = self.before.cursor;
    }
}

/// Result of running an edit on a working copy
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// Edited document
    pub document: NotebookDocument,
    /// Updated cursor
    pub cursor: Cursor,
    /// See [`EditRecord::refresh_highlighting`]
    pub refresh_highlighting: bool,
}

/// Apply an edit in place
///
/// # Errors
/// - [`EditError::InvalidOperation`] if the edit's precondition fails
/// - [`EditError::Model`] if the cursor does not point into the document
///
/// Both leave `document` and `cursor` untouched.
pub fn apply(document: &mut NotebookDocument, cursor: &mut Cursor, edit: &Edit) -> Result<EditRecord> {
    let applied = match applied(document, cursor, edit) {
        Ok(applied) => applied,
        Err(err) => {
            tracing::debug!(edit = edit.label(), error = %err, "Edit refused");
            return Err(err);
        }
    };

    let changed = applied.document != *document;
    let before = Snapshot {
        document: std::mem::replace(document, applied.document),
        cursor: std::mem::replace(cursor, applied.cursor),
    };
    tracing::info!(
        edit = edit.label(),
        selected = cursor.selected(),
        cells = document.len(),
        changed,
        "Applied edit"
    );
    Ok(EditRecord {
        label: edit.label(),
        before,
        changed,
        refresh_highlighting: applied.refresh_highlighting,
    })
}

/// Run an edit against copies of the document and cursor
///
/// # Errors
/// As [`apply`]
pub fn applied(document: &NotebookDocument, cursor: &Cursor, edit: &Edit) -> Result<Applied> {
    let mut work = Applied {
        document: document.clone(),
        cursor: *cursor,
        refresh_highlighting: false,
    };
    let op = edit.label();
    let doc = &mut work.document;
    let cur = &mut work.cursor;

    match edit {
        Edit::Insert { index, cell_type } => {
            if *index > doc.len() {
                return Err(EditError::invalid(
                    op,
                    format!("index {index} is past the end of {} cells", doc.len()),
                ));
            }
            doc.insert_cell(*index, Cell::new(*cell_type))?;
            cur.select(*index, doc.len());
            cur.enter_edit_mode();
        }
        Edit::AddCellAbove => {
            let at = if doc.is_empty() { 0 } else { selected(doc, cur)? };
            doc.insert_cell(at, Cell::new(CellType::Code))?;
            cur.select(at, doc.len());
        }
        Edit::AddCellBelow => {
            let at = if doc.is_empty() { 0 } else { selected(doc, cur)? + 1 };
            doc.insert_cell(at, Cell::new(CellType::Code))?;
            cur.select(at, doc.len());
        }
        Edit::Delete => {
            let sel = non_empty(doc, cur, op)?;
            doc.remove_cell(sel)?;
            cur.select(sel.saturating_sub(1), doc.len());
            cur.enter_command_mode();
        }
        Edit::MoveUp => {
            let sel = non_empty(doc, cur, op)?;
            if sel == 0 {
                return Err(EditError::invalid(op, "selected cell is the first cell"));
            }
            doc.move_cell(sel, sel - 1)?;
            cur.select(sel - 1, doc.len());
        }
        Edit::MoveDown => {
            let sel = non_empty(doc, cur, op)?;
            if sel + 1 == doc.len() {
                return Err(EditError::invalid(op, "selected cell is the last cell"));
            }
            doc.move_cell(sel, sel + 1)?;
            cur.select(sel + 1, doc.len());
        }
        Edit::Split { offset } => {
            let sel = non_empty(doc, cur, op)?;
            let cell = doc.try_cell_mut(sel)?;
            let text = cell.text();
            if text.is_empty() {
                return Err(EditError::invalid(op, "cell source is empty"));
            }
            let Some(at) = byte_offset(&text, *offset) else {
                return Err(EditError::invalid(
                    op,
                    format!("offset {offset} is past the end of the cell text"),
                ));
            };
            let (first, second) = text.split_at(at);
            cell.set_text(first.strip_suffix('\n').unwrap_or(first));
            let new_cell = Cell::with_text(cell.cell_type(), second);
            doc.insert_cell(sel + 1, new_cell)?;
            cur.select(sel + 1, doc.len());
        }
        Edit::MergeBelow => {
            let sel = non_empty(doc, cur, op)?;
            if sel + 1 == doc.len() {
                return Err(EditError::invalid(op, "selected cell is the last cell"));
            }
            merge_into(doc, sel)?;
            work.refresh_highlighting = true;
        }
        Edit::MergeAbove => {
            let sel = non_empty(doc, cur, op)?;
            if sel == 0 {
                return Err(EditError::invalid(op, "selected cell is the first cell"));
            }
            merge_into(doc, sel - 1)?;
            cur.select(sel - 1, doc.len());
            work.refresh_highlighting = true;
        }
        Edit::Retype { to, outputs } => {
            let sel = non_empty(doc, cur, op)?;
            let cell = doc.try_cell_mut(sel)?;
            if *outputs == OutputPolicy::RequireEmpty
                && *to != CellType::Code
                && !cell.outputs().is_empty()
            {
                return Err(EditError::invalid(
                    op,
                    format!("cell has {} outputs", cell.outputs().len()),
                ));
            }
            let dropped = cell.set_cell_type(*to);
            if !dropped.is_empty() {
                tracing::debug!(cell = sel, dropped = dropped.len(), "Retype discarded outputs");
            }
        }
        Edit::SetHeaderLevel(level) => {
            if !(1..=MAX_HEADER_LEVEL).contains(level) {
                return Err(EditError::invalid(
                    op,
                    format!("header level {level} is outside 1..={MAX_HEADER_LEVEL}"),
                ));
            }
            let sel = non_empty(doc, cur, op)?;
            let cell = doc.try_cell_mut(sel)?;
            if cell.cell_type() != CellType::Markdown {
                return Err(EditError::invalid(op, "only markdown cells have headers"));
            }
            if cell.is_blank() {
                return Err(EditError::invalid(op, "cell source is empty"));
            }
            let text = with_header_level(&cell.text(), *level);
            cell.set_text(&text);
        }
        Edit::ClearOutputs => {
            let sel = non_empty(doc, cur, op)?;
            doc.try_cell_mut(sel)?.clear_outputs();
        }
        Edit::ClearAllOutputs => {
            doc.clear_all_outputs();
        }
        Edit::CommitText(text) => {
            let sel = non_empty(doc, cur, op)?;
            doc.try_cell_mut(sel)?.set_text(text);
        }
    }

    Ok(work)
}

/// Selected index, checked against the document
fn selected(doc: &NotebookDocument, cursor: &Cursor) -> Result<usize> {
    let sel = cursor.selected();
    if sel >= doc.len() {
        return Err(ModelError::out_of_range(sel, doc.len()).into());
    }
    Ok(sel)
}

fn non_empty(doc: &NotebookDocument, cursor: &Cursor, op: &'static str) -> Result<usize> {
    if doc.is_empty() {
        return Err(EditError::invalid(op, "document has no cells"));
    }
    selected(doc, cursor)
}

/// Append the text of cell `upper + 1` to cell `upper` and remove it
///
/// The surviving cell keeps its own outputs; the consumed cell's are dropped.
fn merge_into(doc: &mut NotebookDocument, upper: usize) -> Result<()> {
    let lower = doc.remove_cell(upper + 1)?;
    let cell = doc.try_cell_mut(upper)?;
    let merged = format!("{}\n{}", cell.text(), lower.text());
    cell.set_text(&merged);
    Ok(())
}

/// Byte index of the `chars`-th character, allowing one past the end
fn byte_offset(text: &str, chars: usize) -> Option<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(chars)
}
