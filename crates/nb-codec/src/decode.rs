//! JSON → document
//!
//! Decoding walks a parsed [`serde_json::Value`] rather than deriving
//! `Deserialize`, so every failure carries the location it happened at and a
//! single malformed cell or output can be skipped without losing the rest of
//! the document.

use crate::error::{CodecError, Result};
use crate::options::CodecOptions;
use nb_model::{
    Cell, CellType, FormatVersion, MimeBundle, MimeEntry, NotebookDocument, OutputKind,
    OutputMetadata, OutputVariant, StreamName,
};
use serde_json::{Map, Value};

/// A cell or output dropped during best-effort decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    /// Location of the dropped element, e.g. `cells[3]`
    pub path: String,
    /// Why it was dropped
    pub reason: String,
}

/// What a best-effort decode had to drop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Cells skipped entirely
    pub skipped_cells: Vec<Recovered>,
    /// Outputs dropped from otherwise valid cells
    pub skipped_outputs: Vec<Recovered>,
}

impl DecodeReport {
    /// Check if nothing was dropped
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped_cells.is_empty() && self.skipped_outputs.is_empty()
    }

    /// Total number of dropped elements
    #[inline]
    #[must_use]
    pub fn recovered_count(&self) -> usize {
        self.skipped_cells.len() + self.skipped_outputs.len()
    }
}

/// Decoded document plus recovery report
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// The document
    pub document: NotebookDocument,
    /// Elements dropped while decoding
    pub report: DecodeReport,
}

pub(crate) fn decode_document(json: &str, options: &CodecOptions) -> Result<Decoded> {
    let root: Value = serde_json::from_str(json)?;
    let Value::Object(root) = root else {
        return Err(CodecError::malformed("$", "top level is not an object"));
    };

    let format = FormatVersion::new(
        required_u32(&root, "nbformat", "$")?,
        required_u32(&root, "nbformat_minor", "$")?,
    );
    if format.major != 4 {
        return Err(CodecError::malformed(
            "$.nbformat",
            format!("unsupported nbformat {}", format.major),
        ));
    }

    let metadata = optional_object(&root, "metadata", "$")?;
    let cells = match root.get("cells") {
        Some(Value::Array(cells)) => cells,
        Some(_) => return Err(CodecError::malformed("$.cells", "expected an array")),
        None => return Err(CodecError::malformed("$", "missing cells")),
    };

    let mut report = DecodeReport::default();
    let mut decoded = Vec::with_capacity(cells.len());
    for (i, value) in cells.iter().enumerate() {
        let path = format!("cells[{i}]");
        match decode_cell(value, &path, options, &mut report) {
            Ok(cell) => decoded.push(cell),
            Err(CodecError::MalformedDocument { path, reason }) if options.recover_malformed_cells => {
                tracing::warn!(%path, %reason, "Skipping malformed cell");
                report.skipped_cells.push(Recovered { path, reason });
            }
            Err(err) => return Err(err),
        }
    }

    tracing::debug!(
        cells = decoded.len(),
        recovered = report.recovered_count(),
        format = %format,
        "Decoded notebook"
    );

    let document = NotebookDocument::from_cells(decoded)
        .with_format(format)
        .with_metadata(metadata);
    Ok(Decoded { document, report })
}

fn decode_cell(
    value: &Value,
    path: &str,
    options: &CodecOptions,
    report: &mut DecodeReport,
) -> Result<Cell> {
    let Value::Object(obj) = value else {
        return Err(CodecError::malformed(path, "cell is not an object"));
    };

    let cell_type: CellType = match obj.get("cell_type") {
        Some(Value::String(tag)) => tag
            .parse()
            .map_err(|reason: String| CodecError::malformed(format!("{path}.cell_type"), reason))?,
        Some(_) => {
            return Err(CodecError::malformed(
                format!("{path}.cell_type"),
                "expected a string",
            ))
        }
        None => return Err(CodecError::malformed(path, "missing cell_type")),
    };

    let source = match obj.get("source") {
        Some(value) => multiline(value, &format!("{path}.source"))?,
        None => return Err(CodecError::malformed(path, "missing source")),
    };

    let mut cell = Cell::new(cell_type)
        .with_source(source)
        .with_metadata(optional_object(obj, "metadata", path)?);
    if let Some(id) = obj.get("id") {
        let id = id
            .as_str()
            .ok_or_else(|| CodecError::malformed(format!("{path}.id"), "expected a string"))?;
        cell = cell.with_id(id);
    }

    if cell_type != CellType::Code {
        return Ok(cell);
    }

    let count = execution_count(obj, path)?;
    cell.set_execution_count(count)
        .map_err(|e| CodecError::malformed(path, e.to_string()))?;

    let outputs = match obj.get("outputs") {
        Some(Value::Array(outputs)) => outputs.as_slice(),
        Some(_) => {
            return Err(CodecError::malformed(
                format!("{path}.outputs"),
                "expected an array",
            ))
        }
        None => &[],
    };
    for (j, value) in outputs.iter().enumerate() {
        let output_path = format!("{path}.outputs[{j}]");
        match decode_output(value, &output_path) {
            Ok(output) => cell
                .push_output(output)
                .map_err(|e| CodecError::malformed(&output_path, e.to_string()))?,
            Err(CodecError::MalformedDocument { path, reason }) if options.recover_malformed_cells => {
                tracing::warn!(%path, %reason, "Dropping malformed output");
                report.skipped_outputs.push(Recovered { path, reason });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(cell)
}

fn decode_output(value: &Value, path: &str) -> Result<OutputVariant> {
    let Value::Object(obj) = value else {
        return Err(CodecError::malformed(path, "output is not an object"));
    };

    let kind: OutputKind = match obj.get("output_type") {
        Some(Value::String(tag)) => tag
            .parse()
            .map_err(|reason: String| CodecError::malformed(format!("{path}.output_type"), reason))?,
        Some(_) => {
            return Err(CodecError::malformed(
                format!("{path}.output_type"),
                "expected a string",
            ))
        }
        None => return Err(CodecError::malformed(path, "missing output_type")),
    };

    let output = match kind {
        OutputKind::Stream => {
            let name: StreamName = required_str(obj, "name", path)?
                .parse()
                .map_err(|reason: String| CodecError::malformed(format!("{path}.name"), reason))?;
            let text = match obj.get("text") {
                Some(value) => multiline(value, &format!("{path}.text"))?,
                None => return Err(CodecError::malformed(path, "missing text")),
            };
            OutputVariant::Stream { name, text }
        }
        OutputKind::ExecuteResult => OutputVariant::ExecuteResult {
            execution_count: execution_count(obj, path)?,
            data: mime_bundle(obj, path)?,
            metadata: optional_object(obj, "metadata", path)?,
        },
        OutputKind::DisplayData => OutputVariant::DisplayData {
            data: mime_bundle(obj, path)?,
            metadata: optional_object(obj, "metadata", path)?,
        },
        OutputKind::Error => {
            let traceback = match obj.get("traceback") {
                Some(Value::Array(lines)) => lines
                    .iter()
                    .map(|line| {
                        line.as_str().map(str::to_owned).ok_or_else(|| {
                            CodecError::malformed(format!("{path}.traceback"), "expected strings")
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
                Some(_) => {
                    return Err(CodecError::malformed(
                        format!("{path}.traceback"),
                        "expected an array",
                    ))
                }
                None => Vec::new(),
            };
            OutputVariant::Error {
                ename: required_str(obj, "ename", path)?.to_owned(),
                evalue: required_str(obj, "evalue", path)?.to_owned(),
                traceback,
            }
        }
    };
    Ok(output)
}

fn mime_bundle(obj: &Map<String, Value>, path: &str) -> Result<MimeBundle> {
    let data = match obj.get("data") {
        Some(Value::Object(data)) => data,
        Some(_) => {
            return Err(CodecError::malformed(
                format!("{path}.data"),
                "expected an object",
            ))
        }
        None => return Ok(MimeBundle::new()),
    };
    Ok(data
        .iter()
        .map(|(mime, value)| MimeEntry::from_wire(mime.clone(), value))
        .collect())
}

/// nbformat multiline string: a single string or an array of strings
fn multiline(value: &Value, path: &str) -> Result<Vec<String>> {
    match value {
        Value::String(text) => Ok(nb_model::text::split_lines(text)),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| CodecError::malformed(path, "expected an array of strings"))
            })
            .collect(),
        _ => Err(CodecError::malformed(
            path,
            "expected a string or an array of strings",
        )),
    }
}

fn execution_count(obj: &Map<String, Value>, path: &str) -> Result<Option<u32>> {
    match obj.get("execution_count") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                CodecError::malformed(
                    format!("{path}.execution_count"),
                    "expected a non-negative integer or null",
                )
            }),
    }
}

fn required_u32(obj: &Map<String, Value>, key: &str, path: &str) -> Result<u32> {
    let value = obj
        .get(key)
        .ok_or_else(|| CodecError::malformed(path, format!("missing {key}")))?;
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| CodecError::malformed(format!("{path}.{key}"), "expected an integer"))
}

fn required_str<'a>(obj: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a str> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(CodecError::malformed(
            format!("{path}.{key}"),
            "expected a string",
        )),
        None => Err(CodecError::malformed(path, format!("missing {key}"))),
    }
}

fn optional_object(obj: &Map<String, Value>, key: &str, path: &str) -> Result<OutputMetadata> {
    match obj.get(key) {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(CodecError::malformed(
            format!("{path}.{key}"),
            "expected an object",
        )),
    }
}
