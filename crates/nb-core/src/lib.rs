//! Notebook Session
//!
//! Ties a [`NotebookDocument`](nb_model::NotebookDocument), its
//! [`Cursor`](nb_model::Cursor), an execution [`Coordinator`](nb_exec::Coordinator)
//! and file persistence together behind one owner.
//!
//! # Example
//!
//! ```rust
//! use nb_core::NotebookSession;
//! use nb_edit::Edit;
//! use nb_exec::{iter_run, RunItem};
//! use nb_model::{Produced, StreamName};
//!
//! let runner = |source: &str| {
//!     iter_run(vec![RunItem::Ok(Produced::Stream {
//!         name: StreamName::Stdout,
//!         text: format!("{source}\n"),
//!     })])
//! };
//! let mut session = NotebookSession::new(runner);
//! session.apply_edit(&Edit::CommitText("1 + 1".into())).unwrap();
//! session.execute_selected().unwrap();
//! session.run_to_completion().unwrap();
//!
//! assert_eq!(session.document().cells()[0].outputs().len(), 1);
//! assert!(session.is_dirty());
//! ```

#![warn(unreachable_pub)]

mod config;
mod error;
mod session;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use session::NotebookSession;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
