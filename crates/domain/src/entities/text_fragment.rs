//! Text fragment entity

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A bounded slice of input text, synthesized in one service call
///
/// `index` is 1-based and identifies the fragment in progress reports and
/// error messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFragment {
    index: usize,
    text: String,
}

impl TextFragment {
    /// Create a fragment
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` if `index` is zero or the text
    /// is empty or whitespace-only.
    pub fn new(index: usize, text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if index == 0 {
            return Err(DomainError::ValidationError(
                "fragment index is 1-based".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(DomainError::ValidationError(format!(
                "fragment {index} has no text"
            )));
        }
        Ok(Self { index, text })
    }

    /// 1-based position in the run
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Fragment text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// First `max_chars` characters, with an ellipsis when truncated
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.text.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }

    /// Consume and return the text
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for TextFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
