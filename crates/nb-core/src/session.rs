//! Notebook session
//!
//! One open document together with its cursor, execution coordinator and
//! persistence state. The session is the single writer of its document:
//! edits go through [`NotebookSession::apply_edit`], execution through the
//! coordinator methods, and the two are serialized by `&mut self`.

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use nb_codec::{DecodeReport, NotebookCodec};
use nb_edit::{Edit, EditRecord};
use nb_exec::{CodeRunner, Coordinator, RunState, TickOutcome};
use nb_model::{Cursor, NotebookDocument};
use std::path::{Path, PathBuf};

/// An open notebook
#[derive(Debug)]
pub struct NotebookSession<R: CodeRunner> {
    document: NotebookDocument,
    cursor: Cursor,
    coordinator: Coordinator<R>,
    codec: NotebookCodec,
    flush_on_switch: bool,
    path: Option<PathBuf>,
    /// Document as last loaded or saved
    saved: Option<NotebookDocument>,
    dirty: bool,
}

impl<R: CodeRunner> NotebookSession<R> {
    /// Session on a new document with one empty code cell
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self::with_config(runner, SessionConfig::default())
    }

    /// Session with explicit config
    #[must_use]
    pub fn with_config(runner: R, config: SessionConfig) -> Self {
        Self {
            document: NotebookDocument::with_starter_cell(),
            cursor: Cursor::new(),
            coordinator: Coordinator::with_config(runner, config.coordinator),
            codec: NotebookCodec::with_options(config.codec),
            flush_on_switch: config.flush_on_switch,
            path: None,
            saved: None,
            dirty: false,
        }
    }

    /// Current document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &NotebookDocument {
        &self.document
    }

    /// Session cursor
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Move the selection, clamped to the document
    pub fn select(&mut self, index: usize) {
        self.cursor.select(index, self.document.len());
    }

    /// Execution coordinator
    #[inline]
    #[must_use]
    pub fn coordinator(&self) -> &Coordinator<R> {
        &self.coordinator
    }

    /// Coordinator state
    #[inline]
    #[must_use]
    pub fn state(&self) -> RunState {
        self.coordinator.state()
    }

    /// File the document was loaded from or saved to
    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether there are changes since the last load or save
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the host should redraw; clears the flag
    pub fn needs_redraw(&mut self) -> bool {
        self.coordinator.needs_redraw()
    }

    /// Apply an editing operation
    ///
    /// Edits that change the cell list or a cell's type are refused while a
    /// run is active, since the coordinator holds on to a cell index.
    ///
    /// # Errors
    /// - [`SessionError::Busy`] for a refused edit during a run
    /// - [`SessionError::Edit`] if the edit itself fails
    pub fn apply_edit(&mut self, edit: &Edit) -> Result<EditRecord> {
        if self.coordinator.is_busy() && locks_layout(edit) {
            return Err(SessionError::Busy {
                operation: edit.label(),
                state: self.coordinator.state(),
            });
        }
        let record = nb_edit::apply(&mut self.document, &mut self.cursor, edit)?;
        self.dirty |= record.changed;
        Ok(record)
    }

    /// Restore the state captured by an edit
    ///
    /// # Errors
    /// Returns [`SessionError::Busy`] while a run is active
    pub fn undo(&mut self, record: EditRecord) -> Result<()> {
        self.ensure_idle("Undo")?;
        tracing::info!(edit = record.label, "Undo");
        record.undo(&mut self.document, &mut self.cursor);
        self.dirty = true;
        Ok(())
    }

    /// Run one cell
    ///
    /// # Errors
    /// See [`Coordinator::execute_cell`]
    pub fn execute_cell(&mut self, index: usize) -> Result<()> {
        self.coordinator
            .execute_cell(&mut self.document, &mut self.cursor, index)?;
        self.dirty = true;
        Ok(())
    }

    /// Run the selected cell
    ///
    /// # Errors
    /// See [`Coordinator::execute_cell`]
    pub fn execute_selected(&mut self) -> Result<()> {
        self.execute_cell(self.cursor.selected())
    }

    /// Run every code cell from the top
    ///
    /// # Errors
    /// See [`Coordinator::execute_all`]
    pub fn execute_all(&mut self) -> Result<()> {
        self.coordinator
            .execute_all(&mut self.document, &mut self.cursor)?;
        self.dirty |= self.coordinator.is_busy();
        Ok(())
    }

    /// Request a stop of the active run
    pub fn stop(&mut self) -> bool {
        self.coordinator.stop()
    }

    /// Clear the execution counter
    ///
    /// # Errors
    /// See [`Coordinator::reset`]
    pub fn reset(&mut self) -> Result<()> {
        Ok(self.coordinator.reset()?)
    }

    /// Advance the active run by one step
    ///
    /// # Errors
    /// See [`Coordinator::tick`]
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let outcome = self.coordinator.tick(&mut self.document, &mut self.cursor)?;
        if matches!(
            outcome,
            TickOutcome::Appended { .. } | TickOutcome::Failed { .. }
        ) {
            self.dirty = true;
        }
        Ok(outcome)
    }

    /// Tick until idle
    ///
    /// # Errors
    /// See [`Coordinator::tick`]
    pub fn run_to_completion(&mut self) -> Result<usize> {
        let mut ticks = 0;
        while self.coordinator.is_busy() {
            self.tick()?;
            ticks += 1;
        }
        Ok(ticks)
    }

    /// Encode the document as it would be saved
    ///
    /// # Errors
    /// See [`NotebookCodec::encode`]
    pub fn to_json(&self) -> Result<String> {
        Ok(self.codec.encode(&self.document)?)
    }

    /// Save to the current path
    ///
    /// # Errors
    /// - [`SessionError::NoPath`] if the document has never been saved
    /// - [`SessionError::Codec`] if encoding or writing fails
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(SessionError::NoPath)?;
        self.save_as(path)
    }

    /// Save to `path` and make it the current path
    ///
    /// # Errors
    /// Returns [`SessionError::Codec`] if encoding or writing fails
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        self.codec.write(&path, &self.document)?;
        self.path = Some(path);
        self.saved = Some(self.document.clone());
        self.dirty = false;
        Ok(())
    }

    /// Replace the document with one read from `path`
    ///
    /// Pending changes are discarded; use [`switch_document`](Self::switch_document)
    /// to flush them first.
    ///
    /// # Errors
    /// - [`SessionError::Busy`] while a run is active
    /// - [`SessionError::Codec`] if the file cannot be read or decoded; the
    ///   session is unchanged
    pub fn load(&mut self, path: impl Into<PathBuf>) -> Result<DecodeReport> {
        self.ensure_idle("Load")?;
        let path = path.into();
        let decoded = self.codec.read(&path)?;
        self.saved = Some(decoded.document.clone());
        self.replace(decoded.document);
        self.path = Some(path);
        self.dirty = false;
        Ok(decoded.report)
    }

    /// Replace the document with another one
    ///
    /// When there are unsaved changes and flushing is enabled, `flush`
    /// receives the current path and the encoded document first; a flush
    /// error aborts the switch.
    ///
    /// # Errors
    /// - [`SessionError::Busy`] while a run is active
    /// - [`SessionError::Flush`] if the sink fails
    pub fn switch_document<F>(
        &mut self,
        document: NotebookDocument,
        path: Option<PathBuf>,
        flush: F,
    ) -> Result<()>
    where
        F: FnOnce(Option<&Path>, &str) -> std::io::Result<()>,
    {
        self.ensure_idle("Switch document")?;
        if self.dirty && self.flush_on_switch {
            let json = self.to_json()?;
            flush(self.path.as_deref(), &json).map_err(SessionError::Flush)?;
            tracing::debug!(path = ?self.path, "Flushed pending changes");
        }
        tracing::info!(path = ?path, cells = document.len(), "Switched document");
        self.replace(document);
        self.path = path;
        self.saved = None;
        self.dirty = false;
        Ok(())
    }

    /// Drop all changes since the last load or save
    ///
    /// # Errors
    /// - [`SessionError::NoSavedState`] if nothing was loaded or saved
    /// - [`SessionError::Busy`] while a run is active
    pub fn revert(&mut self) -> Result<()> {
        self.ensure_idle("Revert")?;
        let saved = self.saved.clone().ok_or(SessionError::NoSavedState)?;
        self.replace(saved);
        self.dirty = false;
        tracing::info!(path = ?self.path, "Reverted notebook");
        Ok(())
    }

    fn replace(&mut self, document: NotebookDocument) {
        self.document = document;
        let selected = self.cursor.selected();
        self.cursor = Cursor::new();
        self.cursor.select(selected, self.document.len());
    }

    fn ensure_idle(&self, operation: &'static str) -> Result<()> {
        if self.coordinator.is_busy() {
            return Err(SessionError::Busy {
                operation,
                state: self.coordinator.state(),
            });
        }
        Ok(())
    }
}

/// Whether an edit must wait for the coordinator to go idle
fn locks_layout(edit: &Edit) -> bool {
    edit.is_structural() || matches!(edit, Edit::Retype { .. })
}
