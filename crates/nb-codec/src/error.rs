//! Error types for the notebook codec
//!
//! - Decode errors (JSON text → document)
//! - Encode errors (document → JSON text)
//! - File I/O at load/save boundaries

use std::path::PathBuf;

/// Codec errors
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Structural or schema violation in the JSON form
    #[error("malformed document at {path}: {reason}")]
    MalformedDocument {
        /// Location inside the document, e.g. `cells[2].outputs[0]`
        path: String,
        /// What was wrong
        reason: String,
    },

    /// Input is not valid JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Encoder produced unusable output
    #[error("encode failed: {0}")]
    Encode(String),

    /// IO error reading or writing a notebook file
    #[error("io error on {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl CodecError {
    /// Create malformed-document error
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this is a schema violation (as opposed to I/O or syntax)
    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedDocument { .. })
    }
}

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;
