//! Editor text normalization
//!
//! The editor shows `explanation` and `equations` as one multi-line text
//! area each. This module is the only place where such text is turned into
//! the ordered sequences the model stores, and back.
//!
//! `from_lines`/`to_lines` are a lossless pair used while the user is typing.
//! Blank-line filtering happens later, in [`collapse`], when a draft is
//! validated for saving.

use serde::{Deserialize, Serialize};

/// Line separator used by the editor text areas
pub const LINE_SEPARATOR: &str = "\n";

/// Join a sequence into editor text, preserving order
pub fn to_lines(lines: &[String]) -> String {
    lines.join(LINE_SEPARATOR)
}

/// Split editor text into a sequence without trimming or filtering
///
/// An empty buffer yields a single empty line, so the editor always has one
/// row to type into.
pub fn from_lines(text: &str) -> Vec<String> {
    text.split(LINE_SEPARATOR).map(str::to_string).collect()
}

/// Drop blank entries, keeping at least one (possibly empty) element
pub fn collapse(lines: Vec<String>) -> Vec<String> {
    let kept: Vec<String> = lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect();

    if kept.is_empty() {
        vec![String::new()]
    } else {
        kept
    }
}

/// Raw value of a list-shaped editor field
///
/// A field arrives either as the untouched text-area buffer or as lines the
/// editor already split. Both shapes end up as the same sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldInput {
    /// Single buffer with embedded line breaks
    Text(String),
    /// Already split into lines
    Lines(Vec<String>),
}

impl FieldInput {
    /// Ordered lines, unfiltered
    pub fn into_lines(self) -> Vec<String> {
        match self {
            FieldInput::Text(text) => from_lines(&text),
            FieldInput::Lines(lines) => lines,
        }
    }

    /// Lines ready for storage: blanks removed, never empty
    pub fn normalize(self) -> Vec<String> {
        collapse(self.into_lines())
    }

    /// Text-area representation of the field
    pub fn to_text(&self) -> String {
        match self {
            FieldInput::Text(text) => text.clone(),
            FieldInput::Lines(lines) => to_lines(lines),
        }
    }
}

impl Default for FieldInput {
    fn default() -> Self {
        FieldInput::Lines(vec![String::new()])
    }
}

impl From<&str> for FieldInput {
    fn from(text: &str) -> Self {
        FieldInput::Text(text.to_string())
    }
}

impl From<String> for FieldInput {
    fn from(text: String) -> Self {
        FieldInput::Text(text)
    }
}

impl From<Vec<String>> for FieldInput {
    fn from(lines: Vec<String>) -> Self {
        FieldInput::Lines(lines)
    }
}
