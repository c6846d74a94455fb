//! Execution coordinator
//!
//! A single-threaded stepper. The host calls [`Coordinator::tick`] once per
//! update cycle; each tick pulls at most one value from the active run and
//! appends the resulting output to the running cell, so outputs land in
//! exactly the order they were produced.
//!
//! The document and cursor are passed into every call rather than owned.
//! The document's layout revision is recorded when a run starts; if it
//! changes while the run is active, another writer touched the cell list
//! and the run is aborted instead of appending to the wrong cell.

use crate::config::CoordinatorConfig;
use crate::error::{ExecError, Result};
use crate::runner::{CellRun, CodeRunner};
use crate::state::{validate_transition, RunState};
use nb_model::{CellType, Cursor, ModelError, NotebookDocument, OutputVariant};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to do
    Idle,
    /// One output was appended to the running cell
    Appended {
        /// Cell that received the output
        cell: usize,
    },
    /// The runner yielded a value that maps to no output
    Dropped {
        /// Running cell
        cell: usize,
    },
    /// The cell's run completed; an execute-all pass may have moved on
    Finished {
        /// Cell that completed
        cell: usize,
    },
    /// The cell's run failed and an error output was appended
    Failed {
        /// Cell that failed
        cell: usize,
    },
    /// A stop is pending the runner's acknowledgement
    CancelPending,
    /// The runner acknowledged the stop; state is idle
    Cancelled {
        /// Cell that was running
        cell: usize,
    },
}

struct ActiveRun<Run> {
    cell: usize,
    run: Run,
    execution_count: Option<u32>,
    revision: u64,
    execute_all: bool,
}

/// Drives a [`CodeRunner`] one output at a time
pub struct Coordinator<R: CodeRunner> {
    runner: R,
    config: CoordinatorConfig,
    state: RunState,
    active: Option<ActiveRun<R::Run>>,
    execution_count: u32,
    redraw: bool,
}

impl<R: CodeRunner> std::fmt::Debug for Coordinator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("state", &self.state)
            .field("execution_count", &self.execution_count)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<R: CodeRunner> Coordinator<R> {
    /// Create coordinator with default config
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self::with_config(runner, CoordinatorConfig::default())
    }

    /// Create coordinator with config
    #[must_use]
    pub fn with_config(runner: R, config: CoordinatorConfig) -> Self {
        Self {
            runner,
            config,
            state: RunState::Idle,
            active: None,
            execution_count: 0,
            redraw: false,
        }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Check if idle
    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    /// Check if a run is in progress or being cancelled
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        !self.state.is_idle()
    }

    /// Last execution count handed out
    #[inline]
    #[must_use]
    pub fn execution_count(&self) -> u32 {
        self.execution_count
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// The runner
    #[inline]
    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Mutable runner
    #[inline]
    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }

    /// Whether anything changed since the last poll; clears the flag
    pub fn needs_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    /// Run one cell
    ///
    /// Prior outputs are kept; clearing them is the caller's decision.
    ///
    /// # Errors
    /// - [`ExecError::Busy`] if a run is in progress (state is unchanged)
    /// - [`ExecError::NoSuchCell`] / [`ExecError::NotExecutable`] for a bad target
    pub fn execute_cell(
        &mut self,
        doc: &mut NotebookDocument,
        cursor: &mut Cursor,
        index: usize,
    ) -> Result<()> {
        self.ensure_idle(index)?;
        let cell = doc.cell(index).ok_or(ExecError::NoSuchCell {
            index,
            len: doc.len(),
        })?;
        if cell.cell_type() != CellType::Code {
            return Err(ExecError::NotExecutable {
                index,
                cell_type: cell.cell_type(),
            });
        }
        self.start(doc, cursor, index, false)
    }

    /// Run every code cell in order, starting at the first
    ///
    /// Non-code cells are skipped. Does nothing if there are no code cells.
    ///
    /// # Errors
    /// Returns [`ExecError::Busy`] if a run is in progress (state is unchanged)
    pub fn execute_all(&mut self, doc: &mut NotebookDocument, cursor: &mut Cursor) -> Result<()> {
        self.ensure_idle(0)?;
        match next_code_cell(doc, 0) {
            Some(first) => self.start(doc, cursor, first, true),
            None => {
                tracing::debug!("Execute all: no code cells");
                Ok(())
            }
        }
    }

    /// Request a stop of the active run
    ///
    /// Takes effect at the next tick. Returns false if nothing was running.
    pub fn stop(&mut self) -> bool {
        let RunState::Running(cell) = self.state else {
            return false;
        };
        if validate_transition(self.state, RunState::Cancelling).is_err() {
            return false;
        }
        tracing::info!(cell, "Stop requested");
        self.state = RunState::Cancelling;
        self.redraw = true;
        true
    }

    /// Clear the execution counter
    ///
    /// # Errors
    /// Returns [`ExecError::Busy`] while a run is in progress
    pub fn reset(&mut self) -> Result<()> {
        if self.is_busy() {
            return Err(ExecError::Busy { state: self.state });
        }
        tracing::info!(previous = self.execution_count, "Execution counter reset");
        self.execution_count = 0;
        self.redraw = true;
        Ok(())
    }

    /// Advance the active run by one step
    ///
    /// # Errors
    /// Returns [`ExecError::Model`] if the document layout changed under the
    /// run; the run is aborted and the coordinator is idle afterwards
    pub fn tick(&mut self, doc: &mut NotebookDocument, cursor: &mut Cursor) -> Result<TickOutcome> {
        let Some(active) = self.active.as_mut() else {
            return Ok(TickOutcome::Idle);
        };
        let cell = active.cell;

        if self.state == RunState::Cancelling {
            if !active.run.cancel() {
                return Ok(TickOutcome::CancelPending);
            }
            tracing::info!(cell, "Run cancelled");
            self.finish(cursor);
            return Ok(TickOutcome::Cancelled { cell });
        }

        if doc.revision() != active.revision {
            let reason = format!(
                "document layout changed while cell {cell} was running (revision {} -> {})",
                active.revision,
                doc.revision()
            );
            tracing::error!(cell, "{reason}");
            self.finish(cursor);
            return Err(ModelError::InvariantViolation(reason).into());
        }

        match active.run.next() {
            Some(Ok(produced)) => {
                let Some(output) = OutputVariant::from_produced(produced, active.execution_count)
                else {
                    return Ok(TickOutcome::Dropped { cell });
                };
                self.append(doc, cursor, cell, output)?;
                Ok(TickOutcome::Appended { cell })
            }
            Some(Err(failure)) => {
                tracing::warn!(cell, error = %failure, "Cell run failed");
                let execute_all = active.execute_all;
                self.append(doc, cursor, cell, failure.into_output())?;
                if execute_all && self.config.continue_after_error {
                    self.advance(doc, cursor, cell)?;
                } else {
                    self.finish(cursor);
                }
                Ok(TickOutcome::Failed { cell })
            }
            None => {
                tracing::info!(cell, "Cell run finished");
                if active.execute_all {
                    self.advance(doc, cursor, cell)?;
                } else {
                    self.finish(cursor);
                }
                Ok(TickOutcome::Finished { cell })
            }
        }
    }

    /// Tick until idle, returning the number of ticks taken
    ///
    /// A runner that never acknowledges a stop keeps this looping.
    ///
    /// # Errors
    /// As [`tick`](Self::tick)
    pub fn run_to_completion(
        &mut self,
        doc: &mut NotebookDocument,
        cursor: &mut Cursor,
    ) -> Result<usize> {
        let mut ticks = 0;
        while self.is_busy() {
            self.tick(doc, cursor)?;
            ticks += 1;
        }
        Ok(ticks)
    }

    fn ensure_idle(&self, requested: usize) -> Result<()> {
        if self.is_busy() {
            tracing::debug!(requested, state = %self.state, "Run request ignored");
            return Err(ExecError::Busy { state: self.state });
        }
        Ok(())
    }

    fn start(
        &mut self,
        doc: &mut NotebookDocument,
        cursor: &mut Cursor,
        index: usize,
        execute_all: bool,
    ) -> Result<()> {
        let next = RunState::Running(index);
        validate_transition(self.state, next)?;

        let revision = doc.revision();
        let cell = doc.try_cell_mut(index)?;
        cursor.mark_running(index)?;

        let execution_count = if self.config.assign_execution_counts {
            self.execution_count = self.execution_count.saturating_add(1);
            Some(self.execution_count)
        } else {
            None
        };
        if let Err(err) = cell.set_execution_count(execution_count) {
            cursor.clear_running();
            return Err(err.into());
        }

        let run = self.runner.start(&cell.text());
        tracing::info!(cell = index, execution_count, execute_all, "Cell run started");
        self.active = Some(ActiveRun {
            cell: index,
            run,
            execution_count,
            revision,
            execute_all,
        });
        self.state = next;
        self.redraw = true;
        Ok(())
    }

    /// Move an execute-all pass to the next code cell, or finish
    fn advance(&mut self, doc: &mut NotebookDocument, cursor: &mut Cursor, from: usize) -> Result<()> {
        let Some(next) = next_code_cell(doc, from + 1) else {
            self.finish(cursor);
            return Ok(());
        };
        validate_transition(self.state, RunState::Running(next))?;

        self.active = None;
        self.state = RunState::Idle;
        cursor.clear_running();
        self.start(doc, cursor, next, true)
    }

    fn finish(&mut self, cursor: &mut Cursor) {
        self.active = None;
        self.state = RunState::Idle;
        cursor.clear_running();
        self.redraw = true;
    }

    fn append(
        &mut self,
        doc: &mut NotebookDocument,
        cursor: &mut Cursor,
        cell: usize,
        output: OutputVariant,
    ) -> Result<()> {
        let pushed = doc
            .try_cell_mut(cell)
            .and_then(|target| target.push_output(output));
        if let Err(err) = pushed {
            tracing::error!(cell, error = %err, "Aborting run");
            self.finish(cursor);
            return Err(err.into());
        }
        self.redraw = true;
        Ok(())
    }
}

fn next_code_cell(doc: &NotebookDocument, from: usize) -> Option<usize> {
    doc.cells()
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, cell)| cell.cell_type() == CellType::Code)
        .map(|(i, _)| i)
}
