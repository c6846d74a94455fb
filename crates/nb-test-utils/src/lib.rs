//! Testing utilities for the notebook workspace
//!
//! Shared fixtures, a scripted code runner and proptest strategies.

#![allow(missing_docs)]

use nb_exec::{CellRun, CodeRunner, RunFailure, RunItem};
use nb_model::{
    Cell, CellType, Cursor, MimeBundle, MimeEntry, MimePayload, NotebookDocument, OutputMetadata,
    OutputVariant, Produced, StreamName,
};
use std::collections::{HashMap, VecDeque};

pub fn code_cell(text: &str) -> Cell {
    Cell::code(text)
}

pub fn markdown_cell(text: &str) -> Cell {
    Cell::markdown(text)
}

pub fn raw_cell(text: &str) -> Cell {
    Cell::raw(text)
}

pub fn document_of(cells: Vec<Cell>) -> NotebookDocument {
    NotebookDocument::from_cells(cells)
}

/// Document of code cells with the given sources
pub fn code_document(sources: &[&str]) -> NotebookDocument {
    document_of(sources.iter().map(|s| code_cell(s)).collect())
}

/// Cursor selecting `index`
pub fn cursor_at(index: usize) -> Cursor {
    Cursor::at(index)
}

pub fn stdout(text: &str) -> RunItem {
    Ok(Produced::Stream {
        name: StreamName::Stdout,
        text: text.to_string(),
    })
}

pub fn failure(ename: &str, evalue: &str) -> RunItem {
    Err(RunFailure::new(ename, evalue))
}

/// Texts of all cells, in order
pub fn texts(doc: &NotebookDocument) -> Vec<String> {
    doc.cells().iter().map(Cell::text).collect()
}

/// Code runner that replays a fixed script per source text
///
/// Sources without a script produce an empty run. Each run acknowledges a
/// stop only after `cancel_delay` refused requests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    scripts: HashMap<String, Vec<RunItem>>,
    cancel_delay: usize,
    started: Vec<String>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the items a source yields
    #[must_use]
    pub fn with_script(mut self, source: &str, items: Vec<RunItem>) -> Self {
        self.scripts.insert(source.to_string(), items);
        self
    }

    /// Refuse this many stop requests per run before acknowledging
    #[must_use]
    pub fn with_cancel_delay(mut self, delay: usize) -> Self {
        self.cancel_delay = delay;
        self
    }

    /// Sources started so far, in order
    pub fn started(&self) -> &[String] {
        &self.started
    }
}

impl CodeRunner for ScriptedRunner {
    type Run = ScriptedRun;

    fn start(&mut self, source: &str) -> ScriptedRun {
        self.started.push(source.to_string());
        ScriptedRun {
            items: self.scripts.get(source).cloned().unwrap_or_default().into(),
            cancel_delay: self.cancel_delay,
            cancel_requests: 0,
        }
    }
}

/// Run produced by [`ScriptedRunner`]
#[derive(Debug, Clone)]
pub struct ScriptedRun {
    items: VecDeque<RunItem>,
    cancel_delay: usize,
    cancel_requests: usize,
}

impl Iterator for ScriptedRun {
    type Item = RunItem;

    fn next(&mut self) -> Option<RunItem> {
        self.items.pop_front()
    }
}

impl CellRun for ScriptedRun {
    fn cancel(&mut self) -> bool {
        self.cancel_requests += 1;
        self.cancel_requests > self.cancel_delay
    }
}

/// Proptest strategies for model values
pub mod strategies {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    pub fn arb_lines() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-z0-9 #=()]{0,8}\n?", 0..4)
    }

    pub fn arb_text() -> impl Strategy<Value = String> {
        "[a-z0-9 #]{0,10}(\n[a-z0-9 #]{0,10}){0,3}"
    }

    pub fn arb_metadata() -> impl Strategy<Value = OutputMetadata> {
        prop::collection::vec(("[a-z]{1,6}", any::<i32>()), 0..3)
            .prop_map(|pairs| pairs.into_iter().map(|(k, v)| (k, json!(v))).collect())
    }

    pub fn arb_entry() -> impl Strategy<Value = MimeEntry> {
        prop_oneof![
            arb_lines().prop_map(|l| MimeEntry::new("text/plain", MimePayload::Text(l))),
            arb_lines().prop_map(|l| MimeEntry::new("text/html", MimePayload::Text(l))),
            prop::collection::vec(any::<u8>(), 0..24)
                .prop_map(|b| MimeEntry::new("image/png", MimePayload::Binary(b))),
            any::<i32>().prop_map(|n| {
                MimeEntry::new("application/json", MimePayload::Json(json!({"n": n})))
            }),
            // payloads of the wrong kind for their mime type
            prop::collection::vec(any::<u8>(), 0..12)
                .prop_map(|b| MimeEntry::new("text/markdown", MimePayload::Binary(b))),
            arb_lines().prop_map(|l| MimeEntry::new("image/jpeg", MimePayload::Text(l))),
        ]
    }

    pub fn arb_bundle() -> impl Strategy<Value = MimeBundle> {
        prop::collection::vec(arb_entry(), 0..4).prop_map(MimeBundle::from_iter)
    }

    pub fn arb_output() -> impl Strategy<Value = OutputVariant> {
        prop_oneof![
            (any::<bool>(), arb_lines()).prop_map(|(err, text)| OutputVariant::Stream {
                name: if err { StreamName::Stderr } else { StreamName::Stdout },
                text,
            }),
            (prop::option::of(0u32..1000), arb_bundle(), arb_metadata()).prop_map(
                |(execution_count, data, metadata)| OutputVariant::ExecuteResult {
                    execution_count,
                    data,
                    metadata,
                }
            ),
            (arb_bundle(), arb_metadata())
                .prop_map(|(data, metadata)| OutputVariant::DisplayData { data, metadata }),
            ("[A-Za-z]{1,12}", "[a-z ]{0,16}", arb_lines()).prop_map(|(ename, evalue, tb)| {
                OutputVariant::error(ename, evalue, tb)
            }),
        ]
    }

    pub fn arb_cell() -> impl Strategy<Value = Cell> {
        let code = (
            arb_lines(),
            prop::option::of(0u32..1000),
            prop::collection::vec(arb_output(), 0..4),
            arb_metadata(),
        )
            .prop_map(|(source, count, outputs, metadata)| {
                let mut cell = Cell::new(CellType::Code)
                    .with_source(source)
                    .with_metadata(metadata);
                cell.set_execution_count(count)
                    .expect("code cells take execution counts");
                for output in outputs {
                    cell.push_output(output).expect("code cells take outputs");
                }
                cell
            });
        let prose = (
            prop_oneof![Just(CellType::Markdown), Just(CellType::Raw)],
            arb_lines(),
            prop::option::of("[a-f0-9]{8}"),
        )
            .prop_map(|(cell_type, source, id)| {
                let cell = Cell::new(cell_type).with_source(source);
                match id {
                    Some(id) => cell.with_id(id),
                    None => cell,
                }
            });
        prop_oneof![code, prose]
    }

    pub fn arb_document() -> impl Strategy<Value = NotebookDocument> {
        (
            prop::collection::vec(arb_cell(), 0..5),
            0u32..=5,
            arb_metadata(),
        )
            .prop_map(|(cells, minor, metadata)| {
                NotebookDocument::from_cells(cells)
                    .with_format(nb_model::FormatVersion::new(4, minor))
                    .with_metadata(metadata)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_runner_replays_and_records() {
        let mut runner = ScriptedRunner::new().with_script("a", vec![stdout("1\n")]);
        let items: Vec<_> = runner.start("a").collect();
        assert_eq!(items, vec![stdout("1\n")]);
        assert_eq!(runner.start("unknown").count(), 0);
        assert_eq!(runner.started(), &["a".to_string(), "unknown".to_string()]);
    }

    #[test]
    fn cancel_delay_is_honored() {
        let mut run = ScriptedRunner::new().with_cancel_delay(2).start("x");
        assert!(!run.cancel());
        assert!(!run.cancel());
        assert!(run.cancel());
    }
}
