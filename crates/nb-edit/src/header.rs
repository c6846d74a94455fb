//! Markdown header prefix rewriting

use regex::Regex;
use std::sync::LazyLock;

/// Deepest header level, also the longest prefix that is stripped
pub const MAX_HEADER_LEVEL: u8 = 5;

static HEADER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,5}[\t ]*").expect("valid header prefix regex"));

/// Replace the header prefix of the first line of `text`
///
/// An existing run of one to five `#` plus trailing spaces or tabs is
/// stripped, then `level` hashes and a single space are prepended. The rest
/// of the text is untouched.
#[must_use]
pub fn with_header_level(text: &str, level: u8) -> String {
    let (first, rest) = match text.find('\n') {
        Some(end) => text.split_at(end),
        None => (text, ""),
    };
    let stripped = HEADER_PREFIX.replace(first, "");
    format!("{} {stripped}{rest}", "#".repeat(usize::from(level)))
}
