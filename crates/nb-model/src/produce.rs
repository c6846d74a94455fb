//! Converting producer values into outputs
//!
//! The execution engine yields [`Produced`] values; [`OutputVariant::from_produced`]
//! picks the variant and mime types for each one.
//!
//! # Unrecognized values
//!
//! Host values the model has no mime mapping for arrive as [`Value::Opaque`].
//! If the producer supplied a textual representation it becomes a
//! `text/plain` entry. Otherwise the value is dropped and nothing is appended
//! to the cell.

use crate::mime::{MimeBundle, MimeEntry, MimePayload, OutputMetadata};
use crate::output::{OutputVariant, StreamName};
use serde_json::json;
use std::fmt::Write;

/// Raster image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG
    Png,
    /// JPEG
    Jpeg,
    /// GIF
    Gif,
}

impl ImageFormat {
    /// Mime type of the format
    #[inline]
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }
}

/// Encoded image with optional display size
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Encoding of `bytes`
    pub format: ImageFormat,
    /// Encoded image data
    pub bytes: Vec<u8>,
    /// Display width in pixels
    pub width: Option<u32>,
    /// Display height in pixels
    pub height: Option<u32>,
}

impl Image {
    /// PNG image without size hints
    #[inline]
    #[must_use]
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            format: ImageFormat::Png,
            bytes,
            width: None,
            height: None,
        }
    }

    /// Set display size
    #[inline]
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Simple table of strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Column headers
    pub columns: Vec<String>,
    /// Rows; short rows are padded with empty cells
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.columns.len()))
            .max()
            .unwrap_or(0)
    }

    /// Column-aligned plain text rendering
    #[must_use]
    pub fn to_plain(&self) -> String {
        let width = self.width();
        let mut widths = vec![0usize; width];
        for row in std::iter::once(&self.columns).chain(&self.rows) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let render_row = |row: &[String]| -> String {
            let cells: Vec<String> = (0..width)
                .map(|i| {
                    let cell = row.get(i).map_or("", String::as_str);
                    format!("{cell:<w$}", w = widths[i])
                })
                .collect();
            cells.join("  ").trim_end().to_string()
        };

        let mut lines = vec![render_row(&self.columns)];
        lines.extend(self.rows.iter().map(|row| render_row(row)));
        lines.join("\n")
    }

    /// HTML `<table>` rendering
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table>\n<thead>\n<tr>");
        for column in &self.columns {
            let _ = write!(html, "<th>{}</th>", escape_html(column));
        }
        html.push_str("</tr>\n</thead>\n<tbody>\n");
        for row in &self.rows {
            html.push_str("<tr>");
            for cell in row {
                let _ = write!(html, "<td>{}</td>", escape_html(cell));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>");
        html
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// A structured value handed over by the execution engine
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Plain text
    Text(String),
    /// Raster image
    Image(Image),
    /// Tabular data
    Table(Table),
    /// JSON document
    Json(serde_json::Value),
    /// Host value without a mime mapping
    Opaque {
        /// Host type name, for diagnostics
        type_name: String,
        /// Textual representation, if the host has one
        repr: Option<String>,
    },
}

impl Value {
    /// Mime bundle and metadata for this value
    ///
    /// Returns `None` for opaque values without a representation.
    #[must_use]
    pub fn into_bundle(self) -> Option<(MimeBundle, OutputMetadata)> {
        let mut metadata = OutputMetadata::new();
        let bundle = match self {
            Self::Text(text) => MimeBundle::new().with(MimeEntry::plain(&text)),
            Self::Image(image) => {
                let mime = image.format.mime_type();
                let mut size = serde_json::Map::new();
                if let Some(width) = image.width {
                    size.insert("width".to_string(), json!(width));
                }
                if let Some(height) = image.height {
                    size.insert("height".to_string(), json!(height));
                }
                if !size.is_empty() {
                    metadata.insert(mime.to_string(), serde_json::Value::Object(size));
                }
                MimeBundle::new()
                    .with(MimeEntry::new(mime, MimePayload::Binary(image.bytes)))
                    .with(MimeEntry::plain(&format!("<{mime} image>")))
            }
            Self::Table(table) => MimeBundle::new()
                .with(MimeEntry::new("text/html", MimePayload::text(&table.to_html())))
                .with(MimeEntry::plain(&table.to_plain())),
            Self::Json(value) => {
                let plain = serde_json::to_string_pretty(&value).unwrap_or_default();
                MimeBundle::new()
                    .with(MimeEntry::new("application/json", MimePayload::Json(value)))
                    .with(MimeEntry::plain(&plain))
            }
            Self::Opaque { type_name, repr } => match repr {
                Some(repr) => MimeBundle::new().with(MimeEntry::plain(&repr)),
                None => {
                    tracing::debug!("Dropping {type_name} value without a text representation");
                    return None;
                }
            },
        };
        Some((bundle, metadata))
    }
}

/// One unit of output yielded by the execution engine
#[derive(Debug, Clone, PartialEq)]
pub enum Produced {
    /// Text written to a stream
    Stream {
        /// Target stream
        name: StreamName,
        /// Written text
        text: String,
    },
    /// Value explicitly shown by the running code
    Display(Value),
    /// Value of the cell's final expression
    Result(Value),
}

impl OutputVariant {
    /// Convert a produced value into an output
    ///
    /// `execution_count` is recorded on execute results. Returns `None` when
    /// the value is dropped (see module docs).
    #[must_use]
    pub fn from_produced(produced: Produced, execution_count: Option<u32>) -> Option<Self> {
        match produced {
            Produced::Stream { name, text } => Some(Self::stream(name, &text)),
            Produced::Display(value) => value
                .into_bundle()
                .map(|(data, metadata)| Self::DisplayData { data, metadata }),
            Produced::Result(value) => {
                value
                    .into_bundle()
                    .map(|(data, metadata)| Self::ExecuteResult {
                        execution_count,
                        data,
                        metadata,
                    })
            }
        }
    }
}
