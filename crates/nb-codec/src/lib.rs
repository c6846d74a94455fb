//! Notebook Codec
//!
//! Bidirectional mapping between [`NotebookDocument`] and the nbformat v4
//! JSON interchange form.
//!
//! # Decode
//!
//! Sources and stream text are accepted as a string or an array of strings.
//! Image payloads are base64-decoded. A malformed cell or output is skipped
//! and recorded in the [`DecodeReport`] when
//! [`CodecOptions::recover_malformed_cells`] is set; a malformed top level
//! always fails with [`CodecError::MalformedDocument`].
//!
//! # Encode
//!
//! Multiline strings are always written as arrays, binary payloads as base64
//! and `metadata` objects are always present. Encoding a decoded document
//! and decoding it again gives an equal document.
//!
//! # Example
//!
//! ```rust
//! use nb_codec::NotebookCodec;
//!
//! let json = r#"{"nbformat":4,"nbformat_minor":2,"cells":[
//!     {"cell_type":"code","execution_count":1,"source":["x=1"],"outputs":[]}]}"#;
//! let codec = NotebookCodec::new();
//! let decoded = codec.decode(json).unwrap();
//! assert_eq!(decoded.document.cells()[0].execution_count(), Some(1));
//! let again = codec.decode(&codec.encode(&decoded.document).unwrap()).unwrap();
//! assert_eq!(again.document, decoded.document);
//! ```

#![warn(unreachable_pub)]

mod decode;
mod encode;
mod error;
mod options;

pub use decode::{DecodeReport, Decoded, Recovered};
pub use encode::document_value;
pub use error::{CodecError, Result};
pub use options::CodecOptions;

use nb_model::NotebookDocument;
use std::path::Path;

/// Codec with fixed options
#[derive(Debug, Clone, Default)]
pub struct NotebookCodec {
    options: CodecOptions,
}

impl NotebookCodec {
    /// Codec with default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec with the given options
    #[inline]
    #[must_use]
    pub fn with_options(options: CodecOptions) -> Self {
        Self { options }
    }

    /// Options in use
    #[inline]
    #[must_use]
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Decode JSON text
    ///
    /// # Errors
    /// - [`CodecError::Json`] if the text is not JSON
    /// - [`CodecError::MalformedDocument`] on a schema violation that
    ///   recovery does not cover
    pub fn decode(&self, json: &str) -> Result<Decoded> {
        decode::decode_document(json, &self.options)
    }

    /// Encode a document to JSON text
    ///
    /// # Errors
    /// Returns [`CodecError::Json`] or [`CodecError::Encode`] if serialization fails
    pub fn encode(&self, document: &NotebookDocument) -> Result<String> {
        encode::encode_document(document, &self.options)
    }

    /// Read and decode a notebook file
    ///
    /// # Errors
    /// Returns [`CodecError::Io`] if the file cannot be read, otherwise as
    /// [`decode`](Self::decode)
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Decoded> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| CodecError::io_error(path, e))?;
        let decoded = self.decode(&json)?;
        tracing::info!(
            path = %path.display(),
            cells = decoded.document.len(),
            recovered = decoded.report.recovered_count(),
            "Loaded notebook"
        );
        Ok(decoded)
    }

    /// Encode and write a notebook file
    ///
    /// # Errors
    /// Returns [`CodecError::Io`] if the file cannot be written
    pub fn write(&self, path: impl AsRef<Path>, document: &NotebookDocument) -> Result<()> {
        let path = path.as_ref();
        let json = self.encode(document)?;
        std::fs::write(path, json).map_err(|e| CodecError::io_error(path, e))?;
        tracing::info!(path = %path.display(), cells = document.len(), "Saved notebook");
        Ok(())
    }
}

/// Decode with default options, discarding the recovery report
///
/// # Errors
/// See [`NotebookCodec::decode`]
pub fn decode(json: &str) -> Result<NotebookDocument> {
    NotebookCodec::new().decode(json).map(|d| d.document)
}

/// Encode with default options
///
/// # Errors
/// See [`NotebookCodec::encode`]
pub fn encode(document: &NotebookDocument) -> Result<String> {
    NotebookCodec::new().encode(document)
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
