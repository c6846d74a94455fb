//! Mime-keyed payloads
//!
//! A rich output carries one logical result in several alternative
//! representations, each keyed by its mime type. [`MimeBundle`] keeps those
//! entries in insertion order with at most one entry per mime type.

use crate::text::split_lines;
use base64::Engine;
use serde_json::{json, Value};

/// Output metadata: mime type (or free-form key) to a JSON value
///
/// Image outputs typically carry `{"image/png": {"width": 640, "height": 480}}`.
pub type OutputMetadata = serde_json::Map<String, Value>;

/// How a mime type's payload is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// UTF-8 text split into lines
    Text,
    /// Binary data, base64 encoded when persisted
    Binary,
    /// Structured JSON
    Json,
}

impl PayloadKind {
    /// Classify a mime type
    ///
    /// Raster images are binary. `image/svg+xml` is XML text. `application/json`
    /// and any `+json` suffix carry structured JSON.
    #[must_use]
    pub fn of(mime_type: &str) -> Self {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if essence == "application/json" || essence.ends_with("+json") {
            Self::Json
        } else if essence.starts_with("image/") && essence != "image/svg+xml" {
            Self::Binary
        } else {
            Self::Text
        }
    }
}

/// Payload of a single mime entry
#[derive(Debug, Clone, PartialEq)]
pub enum MimePayload {
    /// Text lines, nbformat style (terminators kept)
    Text(Vec<String>),
    /// Decoded binary data (images)
    Binary(Vec<u8>),
    /// Structured JSON document
    Json(Value),
}

impl MimePayload {
    /// Text payload from a single string
    #[inline]
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self::Text(split_lines(text))
    }

    /// Payload kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Text(_) => PayloadKind::Text,
            Self::Binary(_) => PayloadKind::Binary,
            Self::Json(_) => PayloadKind::Json,
        }
    }

    /// Joined text, if this is a text payload
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(lines) => Some(crate::text::join_lines(lines)),
            _ => None,
        }
    }

    /// Raw bytes, if this is a binary payload
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Persisted JSON form: line arrays, base64 strings or the JSON as is
    #[must_use]
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Text(lines) => json!(lines),
            Self::Binary(bytes) => {
                Value::String(base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            Self::Json(value) => value.clone(),
        }
    }

    /// Read a persisted value as a payload of the given kind
    ///
    /// Never fails. A value that does not fit the kind's shape is kept as
    /// JSON, and undecodable base64 is kept as text, so writing the result
    /// back gives the same value.
    #[must_use]
    pub fn from_wire(kind: PayloadKind, value: &Value) -> Self {
        if kind == PayloadKind::Json {
            return Self::Json(value.clone());
        }
        let Some(lines) = wire_lines(value) else {
            return Self::Json(value.clone());
        };
        if kind == PayloadKind::Text {
            return Self::Text(lines);
        }

        let encoded: String = lines
            .concat()
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        match base64::engine::general_purpose::STANDARD.decode(encoded) {
            Ok(bytes) => Self::Binary(bytes),
            Err(err) => {
                tracing::debug!(%err, "Keeping undecodable binary payload as text");
                Self::Text(lines)
            }
        }
    }
}

/// nbformat multiline string: a single string or an array of strings
fn wire_lines(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(text) => Some(split_lines(text)),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_owned))
            .collect(),
        _ => None,
    }
}

/// A `(mime type, payload)` pair
///
/// The payload always has the shape that its persisted form reads back as
/// under [`PayloadKind::of`] the mime type.
#[derive(Debug, Clone, PartialEq)]
pub struct MimeEntry {
    mime_type: String,
    payload: MimePayload,
}

impl MimeEntry {
    /// Create new entry
    ///
    /// A payload of another kind than the mime type calls for is converted
    /// through its persisted form, e.g. text under `image/png` is read as
    /// base64.
    #[must_use]
    pub fn new(mime_type: impl Into<String>, payload: MimePayload) -> Self {
        let mime_type = mime_type.into();
        let kind = PayloadKind::of(&mime_type);
        let payload = if payload.kind() == kind {
            payload
        } else {
            MimePayload::from_wire(kind, &payload.to_wire())
        };
        Self { mime_type, payload }
    }

    /// Entry from a persisted `data` value
    #[must_use]
    pub fn from_wire(mime_type: impl Into<String>, value: &Value) -> Self {
        let mime_type = mime_type.into();
        let payload = MimePayload::from_wire(PayloadKind::of(&mime_type), value);
        Self { mime_type, payload }
    }

    /// Mime type, e.g. `text/plain` or `image/png`
    #[inline]
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The payload
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &MimePayload {
        &self.payload
    }

    /// Take the payload
    #[inline]
    #[must_use]
    pub fn into_payload(self) -> MimePayload {
        self.payload
    }

    /// `text/plain` entry
    #[inline]
    #[must_use]
    pub fn plain(text: &str) -> Self {
        Self::new("text/plain", MimePayload::text(text))
    }
}

/// Ordered collection of mime entries, unique by mime type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MimeBundle {
    entries: Vec<MimeEntry>,
}

impl MimeBundle {
    /// Empty bundle
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry
    ///
    /// An existing entry with the same mime type is replaced in place so its
    /// position is kept.
    pub fn insert(&mut self, entry: MimeEntry) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.mime_type == entry.mime_type)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Builder form of [`insert`](Self::insert)
    #[inline]
    #[must_use]
    pub fn with(mut self, entry: MimeEntry) -> Self {
        self.insert(entry);
        self
    }

    /// Entry for a mime type
    #[must_use]
    pub fn get(&self, mime_type: &str) -> Option<&MimeEntry> {
        self.entries.iter().find(|e| e.mime_type == mime_type)
    }

    /// Entries in insertion order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, MimeEntry> {
        self.entries.iter()
    }

    /// Mime types in insertion order
    pub fn mime_types(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.mime_type.as_str())
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if bundle has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `text/plain` content, if present
    #[must_use]
    pub fn plain_text(&self) -> Option<String> {
        self.get("text/plain").and_then(|e| e.payload.as_text())
    }
}

impl FromIterator<MimeEntry> for MimeBundle {
    fn from_iter<I: IntoIterator<Item = MimeEntry>>(iter: I) -> Self {
        let mut bundle = Self::new();
        for entry in iter {
            bundle.insert(entry);
        }
        bundle
    }
}

impl<'a> IntoIterator for &'a MimeBundle {
    type Item = &'a MimeEntry;
    type IntoIter = std::slice::Iter<'a, MimeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for MimeBundle {
    type Item = MimeEntry;
    type IntoIter = std::vec::IntoIter<MimeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_kind_classification() {
        assert_eq!(PayloadKind::of("image/png"), PayloadKind::Binary);
        assert_eq!(PayloadKind::of("image/jpeg"), PayloadKind::Binary);
        assert_eq!(PayloadKind::of("image/svg+xml"), PayloadKind::Text);
        assert_eq!(PayloadKind::of("text/html"), PayloadKind::Text);
        assert_eq!(PayloadKind::of("application/json"), PayloadKind::Json);
        assert_eq!(
            PayloadKind::of("application/vnd.vegalite.v5+json"),
            PayloadKind::Json
        );
        assert_eq!(PayloadKind::of("Image/PNG"), PayloadKind::Binary);
    }

    #[test]
    fn bundle_preserves_insertion_order() {
        let bundle = MimeBundle::new()
            .with(MimeEntry::plain("x"))
            .with(MimeEntry::new("text/html", MimePayload::text("<b>x</b>")))
            .with(MimeEntry::new("image/png", MimePayload::Binary(vec![1, 2])));

        let order: Vec<_> = bundle.mime_types().collect();
        assert_eq!(order, vec!["text/plain", "text/html", "image/png"]);
    }

    #[test]
    fn bundle_insert_replaces_in_place() {
        let mut bundle = MimeBundle::new()
            .with(MimeEntry::plain("old"))
            .with(MimeEntry::new("text/html", MimePayload::text("<i/>")));
        bundle.insert(MimeEntry::plain("new"));

        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.mime_types().next(), Some("text/plain"));
        assert_eq!(bundle.plain_text().as_deref(), Some("new"));
    }

    #[test]
    fn payload_accessors() {
        assert_eq!(MimePayload::text("a\nb").as_text().as_deref(), Some("a\nb"));
        assert_eq!(MimePayload::Binary(vec![7]).as_bytes(), Some(&[7u8][..]));
        assert!(MimePayload::Json(serde_json::json!({})).as_text().is_none());
    }

    #[test]
    fn mismatched_payloads_take_persisted_shape() {
        let plain = MimeEntry::new("text/plain", MimePayload::Binary(vec![1, 2, 3]));
        assert_eq!(plain.payload(), &MimePayload::Text(vec!["AQID".to_string()]));

        let png = MimeEntry::new("image/png", MimePayload::text("AAAA"));
        assert_eq!(png.payload(), &MimePayload::Binary(vec![0, 0, 0]));

        let json = MimeEntry::new("application/json", MimePayload::text("a\nb"));
        assert_eq!(json.payload(), &MimePayload::Json(json!(["a\n", "b"])));
    }

    #[test]
    fn undecodable_image_text_stays_text() {
        let entry = MimeEntry::new("image/png", MimePayload::text("not base64!"));
        assert_eq!(entry.payload(), &MimePayload::text("not base64!"));
        assert_eq!(
            MimeEntry::from_wire("image/png", &entry.payload().to_wire()),
            entry
        );
    }

    #[test]
    fn wire_form_reads_back_for_every_kind() {
        let entries = [
            MimeEntry::new("text/html", MimePayload::text("<b>x</b>\n")),
            MimeEntry::new("image/gif", MimePayload::Binary(vec![0xff, 0x00])),
            MimeEntry::new("application/vnd.x+json", MimePayload::Json(json!({"k": [1]}))),
            MimeEntry::new("text/plain", MimePayload::Json(json!(7))),
        ];
        for entry in entries {
            let back = MimeEntry::from_wire(entry.mime_type(), &entry.payload().to_wire());
            assert_eq!(back, entry);
        }
    }
}
