//! Line extraction and tokenization.
//!
//! Turns raw document text (embedded text layer or OCR output) into ordered
//! [`TextLine`]s. Tokenization splits on whitespace but keeps Norwegian
//! grouped amounts ("1 234,56") together as a single token.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // A grouped amount must win over plain whitespace splitting, so it is
    // the first alternative.
    static ref TOKEN: Regex = Regex::new(
        r"(?:\d{1,3}(?:[ \u{00a0}]\d{3})+(?:[,.]\d+)?)|\S+"
    )
    .unwrap();
}

/// One physical line of the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    /// Page the line came from (1-indexed).
    pub page: u32,
    /// Running line index across the whole document (0-indexed).
    pub index: usize,
    /// Raw line content, trimmed.
    pub raw: String,
    /// Whitespace tokens, grouped amounts kept intact.
    pub tokens: Vec<String>,
}

impl TextLine {
    /// Tokenize one raw line.
    pub fn new(page: u32, index: usize, raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let tokens = TOKEN
            .find_iter(&raw)
            .map(|m| m.as_str().to_string())
            .collect();
        Self {
            page,
            index,
            raw,
            tokens,
        }
    }
}

/// Split a single page of text into non-empty [`TextLine`]s.
pub fn lines_from_text(text: &str) -> Vec<TextLine> {
    lines_from_pages(std::iter::once(text))
}

/// Split page texts into non-empty [`TextLine`]s with a running index.
///
/// Restartable: the same input always yields the same sequence.
pub fn lines_from_pages<'a>(pages: impl IntoIterator<Item = &'a str>) -> Vec<TextLine> {
    let mut lines = Vec::new();
    let mut index = 0usize;

    for (page_idx, page) in pages.into_iter().enumerate() {
        for raw in page.lines() {
            if raw.trim().is_empty() {
                index += 1;
                continue;
            }
            lines.push(TextLine::new(page_idx as u32 + 1, index, raw));
            index += 1;
        }
    }

    lines
}
