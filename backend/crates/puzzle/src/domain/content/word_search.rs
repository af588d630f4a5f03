//! Word-search content: the list of words a player must find

use serde_json::{Value, json};
use thiserror::Error;

pub const MAX_WORD_LEN: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordSearchError {
    #[error("Word search data must be comma-separated string or array of words")]
    NotAWordList,

    #[error("Word search must have at least one word")]
    Empty,

    #[error("Words must be 15 characters or less for grid generation")]
    WordTooLong { word: String },

    #[error("Word \"{word}\" contains invalid characters. Use letters only.")]
    InvalidCharacters { word: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSearch {
    words: Vec<String>,
}

/// Trimmed, upper-cased comparison form of a word.
pub fn canonical_word(raw: &str) -> String {
    raw.trim().to_uppercase()
}

impl WordSearch {
    pub fn decode(raw: &Value) -> Result<Self, WordSearchError> {
        let words = word_list(raw).ok_or(WordSearchError::NotAWordList)?;
        Self::from_words(words)
    }

    fn from_words(words: Vec<String>) -> Result<Self, WordSearchError> {
        let words: Vec<String> = words
            .iter()
            .map(|w| canonical_word(w))
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(WordSearchError::Empty);
        }
        if let Some(word) = words.iter().find(|w| w.chars().count() > MAX_WORD_LEN) {
            return Err(WordSearchError::WordTooLong { word: word.clone() });
        }
        if let Some(word) = words
            .iter()
            .find(|w| !w.chars().all(|c| c.is_ascii_alphabetic()))
        {
            return Err(WordSearchError::InvalidCharacters { word: word.clone() });
        }
        Ok(Self { words })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn to_json(&self) -> Value {
        json!({ "words": self.words })
    }
}

/// Extracts the raw word list from a comma-separated string, an array of
/// strings, or `{ "words": [...] }`.
pub(crate) fn word_list(raw: &Value) -> Option<Vec<String>> {
    match raw {
        Value::String(text) => Some(text.split(',').map(str::to_string).collect()),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        Value::Object(map) => match map.get("words") {
            Some(words @ Value::Array(_)) => word_list(words),
            _ => None,
        },
        _ => None,
    }
}
