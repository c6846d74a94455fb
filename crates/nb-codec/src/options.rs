//! Codec options

use serde::{Deserialize, Serialize};

/// Options controlling decode recovery and encode formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Spaces per indentation level when encoding
    pub indent: usize,
    /// Skip malformed cells and outputs instead of failing the whole decode
    pub recover_malformed_cells: bool,
    /// End encoded files with a newline
    pub trailing_newline: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            indent: 1,
            recover_malformed_cells: true,
            trailing_newline: true,
        }
    }
}

impl CodecOptions {
    /// Strict decoding: any malformed cell fails the document
    #[must_use]
    pub fn strict() -> Self {
        Self::default().with_recovery(false)
    }

    /// Set indent width
    #[inline]
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Enable or disable per-cell recovery
    #[inline]
    #[must_use]
    pub fn with_recovery(mut self, recover: bool) -> Self {
        self.recover_malformed_cells = recover;
        self
    }

    /// Enable or disable the trailing newline
    #[inline]
    #[must_use]
    pub fn with_trailing_newline(mut self, trailing_newline: bool) -> Self {
        self.trailing_newline = trailing_newline;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_nbformat_writer() {
        let options = CodecOptions::default();
        assert_eq!(options.indent, 1);
        assert!(options.recover_malformed_cells);
        assert!(options.trailing_newline);
    }

    #[test]
    fn strict_disables_recovery() {
        assert!(!CodecOptions::strict().recover_malformed_cells);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let options: CodecOptions = serde_json::from_str(r#"{"indent": 2}"#).unwrap();
        assert_eq!(options, CodecOptions::default().with_indent(2));
    }
}
