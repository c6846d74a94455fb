//! Document → JSON
//!
//! Structural keys are written in sorted order, matching what Jupyter's own
//! writer produces. Mime bundles and metadata keep their insertion order.

use crate::error::{CodecError, Result};
use crate::options::CodecOptions;
use nb_model::{Cell, CellType, MimeBundle, NotebookDocument, OutputVariant};
use serde::Serialize;
use serde_json::{json, Map, Value};

pub(crate) fn encode_document(document: &NotebookDocument, options: &CodecOptions) -> Result<String> {
    let value = document_value(document);

    let indent = vec![b' '; options.indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    if options.trailing_newline {
        buf.push(b'\n');
    }

    tracing::debug!(cells = document.len(), bytes = buf.len(), "Encoded notebook");
    String::from_utf8(buf).map_err(|e| CodecError::Encode(e.to_string()))
}

/// JSON value of a whole document
#[must_use]
pub fn document_value(document: &NotebookDocument) -> Value {
    let mut root = Map::new();
    root.insert(
        "cells".to_string(),
        Value::Array(document.cells().iter().map(cell_value).collect()),
    );
    root.insert(
        "metadata".to_string(),
        Value::Object(document.metadata().clone()),
    );
    root.insert("nbformat".to_string(), json!(document.format().major));
    root.insert("nbformat_minor".to_string(), json!(document.format().minor));
    Value::Object(root)
}

fn cell_value(cell: &Cell) -> Value {
    let mut obj = Map::new();
    obj.insert("cell_type".to_string(), json!(cell.cell_type().as_str()));
    if cell.cell_type() == CellType::Code {
        obj.insert("execution_count".to_string(), json!(cell.execution_count()));
    }
    if let Some(id) = cell.id() {
        obj.insert("id".to_string(), json!(id));
    }
    obj.insert("metadata".to_string(), Value::Object(cell.metadata().clone()));
    if cell.cell_type() == CellType::Code {
        obj.insert(
            "outputs".to_string(),
            Value::Array(cell.outputs().iter().map(output_value).collect()),
        );
    }
    // Pending edits are not persisted; only committed source is written.
    obj.insert("source".to_string(), json!(cell.source()));
    Value::Object(obj)
}

fn output_value(output: &OutputVariant) -> Value {
    let mut obj = Map::new();
    match output {
        OutputVariant::Stream { name, text } => {
            obj.insert("name".to_string(), json!(name.as_str()));
            obj.insert("output_type".to_string(), json!(output.kind().as_str()));
            obj.insert("text".to_string(), json!(text));
        }
        OutputVariant::ExecuteResult {
            execution_count,
            data,
            metadata,
        } => {
            obj.insert("data".to_string(), bundle_value(data));
            obj.insert("execution_count".to_string(), json!(execution_count));
            obj.insert("metadata".to_string(), Value::Object(metadata.clone()));
            obj.insert("output_type".to_string(), json!(output.kind().as_str()));
        }
        OutputVariant::DisplayData { data, metadata } => {
            obj.insert("data".to_string(), bundle_value(data));
            obj.insert("metadata".to_string(), Value::Object(metadata.clone()));
            obj.insert("output_type".to_string(), json!(output.kind().as_str()));
        }
        OutputVariant::Error {
            ename,
            evalue,
            traceback,
        } => {
            obj.insert("ename".to_string(), json!(ename));
            obj.insert("evalue".to_string(), json!(evalue));
            obj.insert("output_type".to_string(), json!(output.kind().as_str()));
            obj.insert("traceback".to_string(), json!(traceback));
        }
    }
    Value::Object(obj)
}

fn bundle_value(bundle: &MimeBundle) -> Value {
    let data: Map<String, Value> = bundle
        .iter()
        .map(|entry| (entry.mime_type().to_owned(), entry.payload().to_wire()))
        .collect();
    Value::Object(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nb_model::{MimeEntry, MimePayload, StreamName};

    #[test]
    fn sources_are_always_arrays() {
        let doc = NotebookDocument::from_cells(vec![Cell::markdown("# A\nbody")]);
        let value = document_value(&doc);
        assert_eq!(value["cells"][0]["source"], json!(["# A\n", "body"]));
        assert!(value["cells"][0].get("outputs").is_none());
        assert!(value["cells"][0].get("execution_count").is_none());
    }

    #[test]
    fn code_cell_layout() {
        let mut cell = Cell::code("print(1)");
        cell.push_output(OutputVariant::stream(StreamName::Stdout, "1\n"))
            .unwrap();
        let value = cell_value(&cell);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["cell_type", "execution_count", "metadata", "outputs", "source"]
        );
        assert_eq!(
            value["outputs"][0],
            json!({"name": "stdout", "output_type": "stream", "text": ["1\n"]})
        );
        assert_eq!(value["execution_count"], Value::Null);
    }

    #[test]
    fn binary_payload_is_base64() {
        let bundle = MimeBundle::new()
            .with(MimeEntry::new("image/png", MimePayload::Binary(vec![0x89, 0x50, 0x4e, 0x47])));
        assert_eq!(bundle_value(&bundle), json!({"image/png": "iVBORw=="}));
    }

    #[test]
    fn error_layout() {
        let value = output_value(&OutputVariant::error(
            "ZeroDivisionError",
            "division by zero",
            vec!["line 1".into()],
        ));
        assert_eq!(value["output_type"], "error");
        assert_eq!(value["traceback"], json!(["line 1"]));
    }

    #[test]
    fn indent_and_trailing_newline() {
        let doc = NotebookDocument::new();
        let two = encode_document(&doc, &CodecOptions::default().with_indent(2)).unwrap();
        assert!(two.starts_with("{\n  \"cells\": []"));
        assert!(two.ends_with("}\n"));

        let bare = encode_document(&doc, &CodecOptions::default().with_trailing_newline(false))
            .unwrap();
        assert!(bare.ends_with('}'));
    }
}
