//! Multiline text helpers
//!
//! nbformat stores multiline strings as arrays of lines where every line but
//! the last keeps its trailing `\n`. Joining the array gives back the
//! original string.

/// Split text into nbformat lines, keeping line terminators
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_owned).collect()
}

/// Concatenate nbformat lines back into one string
#[inline]
#[must_use]
pub fn join_lines(lines: &[String]) -> String {
    lines.concat()
}
