//! Notebook Document Model
//!
//! Cells, output variants and session cursor state for an in-editor notebook.
//!
//! # Core Concepts
//!
//! - [`NotebookDocument`]: ordered cells plus format version and metadata
//! - [`Cell`]: typed cell with persisted source lines and an edit buffer
//! - [`OutputVariant`]: tagged union of stream, result, display and error outputs
//! - [`MimeBundle`]: mime-keyed alternative representations of one result
//! - [`Cursor`]: selected and running cell indices, passed explicitly
//! - [`RendererRegistry`]: mime-type capability dispatch for hosts
//!
//! # Example
//!
//! ```rust
//! use nb_model::{Cell, NotebookDocument, OutputVariant, StreamName};
//!
//! let mut doc = NotebookDocument::new();
//! doc.insert_cell(0, Cell::code("print(1)")).unwrap();
//! doc.cell_mut(0)
//!     .unwrap()
//!     .push_output(OutputVariant::stream(StreamName::Stdout, "1\n"))
//!     .unwrap();
//! assert_eq!(doc.cells()[0].outputs().len(), 1);
//! ```

#![warn(unreachable_pub)]

mod cell;
mod cursor;
mod document;
mod error;
mod mime;
mod output;
mod produce;
mod render;
pub mod text;

pub use cell::{Cell, CellType};
pub use cursor::Cursor;
pub use document::{FormatVersion, NotebookDocument};
pub use error::{ModelError, Result};
pub use mime::{MimeBundle, MimeEntry, MimePayload, OutputMetadata, PayloadKind};
pub use output::{OutputKind, OutputVariant, StreamName};
pub use produce::{Image, ImageFormat, Produced, Table, Value};
pub use render::{MimeRenderer, PlainTextRenderer, RendererRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_text() -> impl Strategy<Value = String> {
        "[a-z #\n]{0,24}"
    }

    proptest! {
        #[test]
        fn commit_edit_keeps_text(initial in arb_text(), typed in arb_text()) {
            let mut cell = Cell::code(&initial);
            cell.begin_edit().push_str(&typed);
            cell.commit_edit();
            prop_assert!(!cell.is_editing());
            prop_assert_eq!(cell.text(), format!("{initial}{typed}"));
            prop_assert_eq!(text::join_lines(cell.source()), cell.text());
        }

        #[test]
        fn cursor_stays_in_range(start in 0usize..32, len in 0usize..8, steps in prop::collection::vec(any::<bool>(), 0..16)) {
            let mut cursor = Cursor::at(start);
            cursor.clamp(len);
            for forward in steps {
                if forward {
                    cursor.select_next(len);
                } else {
                    cursor.select_previous(len);
                }
                prop_assert!(cursor.selected() <= len.saturating_sub(1));
            }
        }
    }

    #[test]
    fn retype_to_markdown_drops_outputs_of_code_cell() {
        let mut doc = NotebookDocument::from_cells(vec![Cell::code("1 + 1")]);
        let cell = doc.cell_mut(0).unwrap();
        cell.set_execution_count(Some(1)).unwrap();
        let out = OutputVariant::from_produced(Produced::Result(Value::Text("2".into())), Some(1))
            .unwrap();
        cell.push_output(out).unwrap();

        let dropped = cell.set_cell_type(CellType::Markdown);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].kind(), OutputKind::ExecuteResult);
        assert!(doc.cells()[0].outputs().is_empty());
    }

    #[test]
    fn rendered_output_through_registry() {
        let registry = RendererRegistry::text_only();
        let out = OutputVariant::from_produced(
            Produced::Display(Value::Json(serde_json::json!({"k": 1}))),
            None,
        )
        .unwrap();
        let rendered = registry.render_bundle(out.data().unwrap()).unwrap();
        assert!(rendered.contains("\"k\": 1"));
    }
}
