//! Notebook Editing Operations
//!
//! Structural and content edits over a [`NotebookDocument`] and its
//! [`Cursor`]. Each edit either fully applies or leaves both untouched, and
//! returns an [`EditRecord`] carrying the prior state for undo.
//!
//! # Example
//!
//! ```rust
//! use nb_edit::{apply, Edit};
//! use nb_model::{Cell, Cursor, NotebookDocument};
//!
//! let mut doc = NotebookDocument::from_cells(vec![Cell::code("ab\ncd")]);
//! let mut cursor = Cursor::new();
//!
//! let record = apply(&mut doc, &mut cursor, &Edit::Split { offset: 3 }).unwrap();
//! assert_eq!(record.label, "Split Cell");
//! assert_eq!(doc.len(), 2);
//! assert_eq!(cursor.selected(), 1);
//!
//! record.undo(&mut doc, &mut cursor);
//! assert_eq!(doc.len(), 1);
//! ```

#![warn(unreachable_pub)]

mod apply;
mod edit;
mod error;
mod header;

pub use apply::{applied, apply, Applied, EditRecord, Snapshot};
pub use edit::{Edit, OutputPolicy};
pub use error::{EditError, Result};
pub use header::{with_header_level, MAX_HEADER_LEVEL};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
