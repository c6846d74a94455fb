//! Notebook Execution Coordinator
//!
//! Runs code cells one output at a time through an external [`CodeRunner`],
//! appending each produced value to the running cell as an output.
//!
//! # States
//!
//! - [`RunState::Idle`]: nothing running, run requests accepted
//! - [`RunState::Running`]: one cell running; further run requests are
//!   rejected with [`ExecError::Busy`], not queued
//! - [`RunState::Cancelling`]: stop requested, waiting for the runner
//!
//! # Failure
//!
//! A [`RunFailure`] from the runner becomes an `Error` output on the cell
//! and ends the run. An execute-all pass stops there unless
//! [`CoordinatorConfig::continue_after_error`] is set.
//!
//! # Example
//!
//! ```rust
//! use nb_exec::{iter_run, Coordinator, RunItem};
//! use nb_model::{Cell, Cursor, NotebookDocument, Produced, StreamName};
//!
//! let runner = |_: &str| {
//!     iter_run(vec![RunItem::Ok(Produced::Stream {
//!         name: StreamName::Stdout,
//!         text: "1\n".into(),
//!     })])
//! };
//! let mut coordinator = Coordinator::new(runner);
//! let mut doc = NotebookDocument::from_cells(vec![Cell::code("print(1)")]);
//! let mut cursor = Cursor::new();
//!
//! coordinator.execute_cell(&mut doc, &mut cursor, 0).unwrap();
//! coordinator.run_to_completion(&mut doc, &mut cursor).unwrap();
//! assert_eq!(doc.cells()[0].outputs().len(), 1);
//! assert_eq!(cursor.running_index(), -1);
//! ```

#![warn(unreachable_pub)]

mod config;
mod coordinator;
mod error;
mod runner;
mod state;

pub use config::CoordinatorConfig;
pub use coordinator::{Coordinator, TickOutcome};
pub use error::{ExecError, Result, RunFailure};
pub use runner::{iter_run, CellRun, CodeRunner, IterRun, RunItem};
pub use state::{allowed_transitions, validate_transition, RunPhase, RunState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
