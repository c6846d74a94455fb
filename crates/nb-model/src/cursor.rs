//! Session cursor
//!
//! Which cell editing operations target (the selection) and which cell the
//! execution coordinator is writing to (the running cell). Kept outside the
//! document and passed explicitly to every operation.

use crate::error::{ModelError, Result};

/// Selected and running cell indices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    selected: usize,
    running: Option<usize>,
    edit_mode: bool,
}

impl Cursor {
    /// Cursor at the first cell, idle, in command mode
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor selecting `index`
    #[inline]
    #[must_use]
    pub fn at(index: usize) -> Self {
        Self {
            selected: index,
            ..Self::default()
        }
    }

    /// Selected cell index
    #[inline]
    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Running cell index, if a run is in progress
    #[inline]
    #[must_use]
    pub fn running(&self) -> Option<usize> {
        self.running
    }

    /// Running cell index with `-1` meaning idle
    #[inline]
    #[must_use]
    pub fn running_index(&self) -> i64 {
        self.running
            .and_then(|i| i64::try_from(i).ok())
            .unwrap_or(-1)
    }

    /// Check if a cell is running
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Whether the selected cell is being edited
    #[inline]
    #[must_use]
    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Select a cell, clamped to `[0, len - 1]`
    pub fn select(&mut self, index: usize, len: usize) {
        self.selected = index;
        self.clamp(len);
    }

    /// Select the next cell, staying on the last one
    pub fn select_next(&mut self, len: usize) {
        self.select(self.selected.saturating_add(1), len);
    }

    /// Select the previous cell, staying on the first one
    pub fn select_previous(&mut self, len: usize) {
        self.select(self.selected.saturating_sub(1), len);
    }

    /// Pull the selection back into range after a structural edit
    ///
    /// An empty document keeps the selection at 0.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Enter edit mode on the selected cell
    #[inline]
    pub fn enter_edit_mode(&mut self) {
        self.edit_mode = true;
    }

    /// Leave edit mode
    #[inline]
    pub fn enter_command_mode(&mut self) {
        self.edit_mode = false;
    }

    /// Mark a cell as running
    ///
    /// # Errors
    /// Returns [`ModelError::AlreadyRunning`] if a different cell is running
    pub fn mark_running(&mut self, index: usize) -> Result<()> {
        match self.running {
            Some(running) if running != index => Err(ModelError::AlreadyRunning {
                running,
                requested: index,
            }),
            _ => {
                self.running = Some(index);
                Ok(())
            }
        }
    }

    /// Clear the running marker
    #[inline]
    pub fn clear_running(&mut self) {
        self.running = None;
    }

    /// Hand the running marker to the next cell of a sequential run
    ///
    /// # Errors
    /// Returns [`ModelError::InvariantViolation`] if nothing was running
    pub fn hand_over(&mut self, next: usize) -> Result<()> {
        if self.running.is_none() {
            return Err(ModelError::InvariantViolation(
                "hand-over requested while idle".to_string(),
            ));
        }
        self.running = Some(next);
        Ok(())
    }
}
