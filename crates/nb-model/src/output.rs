//! Cell output variants
//!
//! [`OutputVariant`] is the closed set of things a code cell can produce.
//! Each variant owns exactly the fields of its nbformat `output_type`, so a
//! tag/field mismatch is unrepresentable.

use crate::mime::{MimeBundle, OutputMetadata};
use crate::text::{join_lines, split_lines};
use serde::{Deserialize, Serialize};

/// Name of an output stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamName {
    /// Standard output
    #[default]
    Stdout,
    /// Standard error
    Stderr,
}

impl StreamName {
    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl std::fmt::Display for StreamName {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StreamName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            _ => Err(format!("Unknown stream name '{s}'. Expected: stdout, stderr")),
        }
    }
}

/// Discriminator of an [`OutputVariant`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// Stream output (stdout/stderr)
    Stream,
    /// Result of the cell's final expression
    ExecuteResult,
    /// Rich display data (images, HTML, etc.)
    DisplayData,
    /// Error traceback
    Error,
}

impl OutputKind {
    /// All kinds, in nbformat schema order
    pub const ALL: [Self; 4] = [
        Self::Stream,
        Self::ExecuteResult,
        Self::DisplayData,
        Self::Error,
    ];

    /// nbformat `output_type` tag
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stream => "stream",
            Self::ExecuteResult => "execute_result",
            Self::DisplayData => "display_data",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for OutputKind {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown output type '{s}'. Expected: stream, execute_result, display_data, error"
                )
            })
    }
}

/// One output of a code cell
#[derive(Debug, Clone, PartialEq)]
pub enum OutputVariant {
    /// Text written to stdout or stderr
    Stream {
        /// Stream the text was written to
        name: StreamName,
        /// Text lines (one logical string)
        text: Vec<String>,
    },

    /// Value of the cell's final expression
    ExecuteResult {
        /// Execution count at the time of capture
        execution_count: Option<u32>,
        /// Alternative representations
        data: MimeBundle,
        /// Per-mime metadata
        metadata: OutputMetadata,
    },

    /// Explicitly displayed rich data
    DisplayData {
        /// Alternative representations
        data: MimeBundle,
        /// Per-mime metadata (e.g. image width/height)
        metadata: OutputMetadata,
    },

    /// Error raised while running the cell
    Error {
        /// Error name, e.g. `ZeroDivisionError`
        ename: String,
        /// Error message
        evalue: String,
        /// Traceback lines
        traceback: Vec<String>,
    },
}

impl OutputVariant {
    /// Stream output from a single string
    #[must_use]
    pub fn stream(name: StreamName, text: &str) -> Self {
        Self::Stream {
            name,
            text: split_lines(text),
        }
    }

    /// Display data without metadata
    #[inline]
    #[must_use]
    pub fn display(data: MimeBundle) -> Self {
        Self::DisplayData {
            data,
            metadata: OutputMetadata::new(),
        }
    }

    /// Execute result without metadata
    #[inline]
    #[must_use]
    pub fn result(execution_count: Option<u32>, data: MimeBundle) -> Self {
        Self::ExecuteResult {
            execution_count,
            data,
            metadata: OutputMetadata::new(),
        }
    }

    /// Error output
    #[must_use]
    pub fn error(
        ename: impl Into<String>,
        evalue: impl Into<String>,
        traceback: Vec<String>,
    ) -> Self {
        Self::Error {
            ename: ename.into(),
            evalue: evalue.into(),
            traceback,
        }
    }

    /// Discriminator
    #[inline]
    #[must_use]
    pub fn kind(&self) -> OutputKind {
        match self {
            Self::Stream { .. } => OutputKind::Stream,
            Self::ExecuteResult { .. } => OutputKind::ExecuteResult,
            Self::DisplayData { .. } => OutputKind::DisplayData,
            Self::Error { .. } => OutputKind::Error,
        }
    }

    /// Mime bundle for rich variants
    #[inline]
    #[must_use]
    pub fn data(&self) -> Option<&MimeBundle> {
        match self {
            Self::ExecuteResult { data, .. } | Self::DisplayData { data, .. } => Some(data),
            Self::Stream { .. } | Self::Error { .. } => None,
        }
    }

    /// Best-effort plain text summary
    ///
    /// Streams give their text, rich outputs their `text/plain` entry and
    /// errors `ename: evalue`.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        match self {
            Self::Stream { text, .. } => Some(join_lines(text)),
            Self::ExecuteResult { data, .. } | Self::DisplayData { data, .. } => data.plain_text(),
            Self::Error { ename, evalue, .. } => Some(format!("{ename}: {evalue}")),
        }
    }

    /// Check if this is an error output
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime::MimeEntry;

    #[test]
    fn output_kind_display() {
        assert_eq!(format!("{}", OutputKind::Stream), "stream");
        assert_eq!(format!("{}", OutputKind::DisplayData), "display_data");
        assert_eq!(format!("{}", OutputKind::ExecuteResult), "execute_result");
        assert_eq!(format!("{}", OutputKind::Error), "error");
    }

    #[test]
    fn output_kind_roundtrip() {
        for kind in OutputKind::ALL {
            let parsed: OutputKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("pyout".parse::<OutputKind>().is_err());
    }

    #[test]
    fn stream_name_parse() {
        assert_eq!("stdout".parse::<StreamName>().unwrap(), StreamName::Stdout);
        assert_eq!("stderr".parse::<StreamName>().unwrap(), StreamName::Stderr);
        assert!("stdin".parse::<StreamName>().is_err());
    }

    #[test]
    fn stream_splits_lines() {
        let out = OutputVariant::stream(StreamName::Stdout, "1\n2\n");
        assert_eq!(
            out,
            OutputVariant::Stream {
                name: StreamName::Stdout,
                text: vec!["1\n".to_string(), "2\n".to_string()],
            }
        );
        assert_eq!(out.kind(), OutputKind::Stream);
        assert_eq!(out.summary().as_deref(), Some("1\n2\n"));
    }

    #[test]
    fn summary_of_rich_and_error_outputs() {
        let display = OutputVariant::display(MimeBundle::new().with(MimeEntry::plain("42")));
        assert_eq!(display.summary().as_deref(), Some("42"));
        assert!(display.data().is_some());

        let err = OutputVariant::error("ValueError", "bad", vec![]);
        assert!(err.is_error());
        assert_eq!(err.summary().as_deref(), Some("ValueError: bad"));
        assert!(err.data().is_none());
    }
}
