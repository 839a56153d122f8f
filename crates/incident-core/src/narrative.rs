//! Narrative text shaping for the report's bounded text area

use serde::{Deserialize, Serialize};

/// Line and length budget for the narrative field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeLayout {
    pub words_per_line: usize,
    pub max_chars: usize,
}

impl Default for NarrativeLayout {
    fn default() -> Self {
        Self {
            words_per_line: 14,
            max_chars: 2400,
        }
    }
}

impl NarrativeLayout {
    pub fn new(words_per_line: usize, max_chars: usize) -> Self {
        Self {
            words_per_line,
            max_chars,
        }
    }

    /// Clean, wrap and truncate, in that order
    pub fn format(&self, narrative: &str) -> String {
        let wrapped = wrap_words(&collapse_whitespace(narrative), self.words_per_line);
        truncate_chars(&wrapped, self.max_chars).to_string()
    }
}

/// Collapse line breaks and runs of whitespace to single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Re-break text so no line holds more than `words_per_line` words
pub fn wrap_words(text: &str, words_per_line: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(words_per_line.max(1))
        .map(|line| line.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hard cut to at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
