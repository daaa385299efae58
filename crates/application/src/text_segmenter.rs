//! Text segmentation for long-form synthesis
//!
//! Splits arbitrary text into ordered fragments small enough for one speech
//! synthesis request, preferring paragraph boundaries and falling back to
//! sentence boundaries for oversized paragraphs.

use domain::{DomainError, TextFragment};
use tracing::debug;

/// Default maximum fragment length in characters
pub const DEFAULT_FRAGMENT_CHAR_LIMIT: usize = 1000;

const PARAGRAPH_SEPARATOR: &str = "\n\n";
const PARAGRAPH_SEPARATOR_CHARS: usize = 2;

/// Splits text into `TextFragment`s of bounded character length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegmenter {
    limit: usize,
}

impl Default for TextSegmenter {
    fn default() -> Self {
        Self {
            limit: DEFAULT_FRAGMENT_CHAR_LIMIT,
        }
    }
}

impl TextSegmenter {
    /// Create a segmenter with a character limit per fragment
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFragmentLimit` if `limit` is zero.
    pub const fn new(limit: usize) -> Result<Self, DomainError> {
        if limit == 0 {
            return Err(DomainError::InvalidFragmentLimit(limit));
        }
        Ok(Self { limit })
    }

    /// Maximum fragment length in characters
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Split `text` into fragments
    ///
    /// Fragments are trimmed, non-empty and numbered from 1. A fragment only
    /// exceeds the limit when it is a single sentence that is already longer
    /// than the limit; such a sentence is kept whole.
    #[must_use]
    pub fn segment(&self, text: &str) -> Vec<TextFragment> {
        let normalized = normalize(text);
        let mut chunks = ChunkBuffer::new(self.limit);

        for paragraph in normalized.split(PARAGRAPH_SEPARATOR) {
            if paragraph.trim().is_empty() {
                continue;
            }

            if char_len(paragraph) > self.limit {
                chunks.flush();
                for unit in sentence_units(paragraph) {
                    chunks.push_unit(unit);
                }
            } else {
                chunks.push_paragraph(paragraph);
            }
        }

        let fragments: Vec<TextFragment> = chunks
            .finish()
            .into_iter()
            .enumerate()
            .filter_map(|(i, text)| TextFragment::new(i + 1, text).ok())
            .collect();

        debug!(
            input_chars = char_len(text),
            fragments = fragments.len(),
            limit = self.limit,
            "Segmented text"
        );

        fragments
    }
}

/// Greedy accumulator of paragraphs and sentence units
struct ChunkBuffer {
    limit: usize,
    current: String,
    current_chars: usize,
    chunks: Vec<String>,
}

impl ChunkBuffer {
    const fn new(limit: usize) -> Self {
        Self {
            limit,
            current: String::new(),
            current_chars: 0,
            chunks: Vec::new(),
        }
    }

    fn push_paragraph(&mut self, paragraph: &str) {
        let paragraph_chars = char_len(paragraph);
        if self.current.is_empty() {
            self.start(paragraph, paragraph_chars);
        } else if self.current_chars + PARAGRAPH_SEPARATOR_CHARS + paragraph_chars > self.limit {
            self.flush();
            self.start(paragraph, paragraph_chars);
        } else {
            self.current.push_str(PARAGRAPH_SEPARATOR);
            self.current.push_str(paragraph);
            self.current_chars += PARAGRAPH_SEPARATOR_CHARS + paragraph_chars;
        }
    }

    fn push_unit(&mut self, unit: &str) {
        let unit_chars = char_len(unit);
        if !self.current.is_empty() && self.current_chars + unit_chars > self.limit {
            self.flush();
        }
        self.current.push_str(unit);
        self.current_chars += unit_chars;
    }

    fn start(&mut self, text: &str, chars: usize) {
        self.current.push_str(text);
        self.current_chars = chars;
    }

    fn flush(&mut self) {
        let trimmed = self.current.trim();
        if !trimmed.is_empty() {
            self.chunks.push(trimmed.to_string());
        }
        self.current.clear();
        self.current_chars = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

/// Normalize line endings, cap blank-line runs at one and trim
fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(unified.len());
    let mut newlines = 0usize;
    for c in unified.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        out.push(c);
    }

    out.trim().to_string()
}

const fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\n')
}

/// Split a paragraph into sentence-like units
///
/// A unit is a run of text followed by its run of terminators. Units keep
/// their leading whitespace, so concatenating them yields the paragraph.
/// Terminators that open the paragraph belong to the first unit.
fn sentence_units(paragraph: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut start = 0;
    let mut seen_body = false;
    let mut in_tail = false;

    for (i, c) in paragraph.char_indices() {
        if is_terminator(c) {
            in_tail |= seen_body;
        } else {
            if in_tail {
                units.push(&paragraph[start..i]);
                start = i;
                in_tail = false;
            }
            seen_body = true;
        }
    }

    if start < paragraph.len() {
        units.push(&paragraph[start..]);
    }

    units
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
