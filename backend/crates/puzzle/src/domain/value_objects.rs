//! Domain Value Objects
//!
//! Immutable value types for the puzzle domain.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Puzzle kind. Closed set, matched exhaustively everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleType {
    /// 9x9 grid-logic puzzle
    #[display("sudoku")]
    #[serde(alias = "grid_logic", alias = "grid-logic")]
    Sudoku,
    #[display("crossword")]
    Crossword,
    #[display("word_search")]
    #[serde(alias = "word-search")]
    WordSearch,
}

impl PuzzleType {
    pub const ALL: [PuzzleType; 3] = [
        PuzzleType::Sudoku,
        PuzzleType::Crossword,
        PuzzleType::WordSearch,
    ];

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            PuzzleType::Sudoku => "sudoku",
            PuzzleType::Crossword => "crossword",
            PuzzleType::WordSearch => "word_search",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[display("easy")]
    Easy,
    #[default]
    #[display("medium")]
    Medium,
    #[display("hard")]
    Hard,
}

impl Difficulty {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
            .into_iter()
            .find(|d| d.code() == code)
    }
}

/// Puzzle title, trimmed, 1..=255 characters
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub struct Title(String);

impl Title {
    pub const MAX_LEN: usize = 255;

    pub fn new(raw: impl AsRef<str>) -> Result<Self, String> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err("Title cannot be empty".to_string());
        }
        if trimmed.chars().count() > Self::MAX_LEN {
            return Err(format!("Title must be {} characters or less", Self::MAX_LEN));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Upper bound for counters persisted in `INTEGER` columns
pub const MAX_STORED_COUNT: u32 = i32::MAX as u32;

/// Time a player spent on one attempt, in whole seconds (at least 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize)]
#[serde(transparent)]
pub struct SolveTime(u32);

impl SolveTime {
    pub fn from_secs(secs: i64) -> Option<Self> {
        u32::try_from(secs)
            .ok()
            .filter(|&s| (1..=MAX_STORED_COUNT).contains(&s))
            .map(Self)
    }

    #[inline]
    pub fn as_secs(&self) -> u32 {
        self.0
    }
}

impl From<SolveTime> for f64 {
    fn from(t: SolveTime) -> Self {
        f64::from(t.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_puzzle_type_codes() {
        for t in PuzzleType::ALL {
            assert_eq!(PuzzleType::from_code(t.code()), Some(t));
            assert_eq!(t.to_string(), t.code());
        }
        assert_eq!(PuzzleType::from_code("jigsaw"), None);
    }

    #[test]
    fn test_puzzle_type_serde_aliases() {
        let t: PuzzleType = serde_json::from_str("\"grid-logic\"").unwrap();
        assert_eq!(t, PuzzleType::Sudoku);
        let t: PuzzleType = serde_json::from_str("\"word-search\"").unwrap();
        assert_eq!(t, PuzzleType::WordSearch);
        assert_eq!(
            serde_json::to_string(&PuzzleType::WordSearch).unwrap(),
            "\"word_search\""
        );
    }

    #[test]
    fn test_difficulty_default_and_codes() {
        assert_eq!(Difficulty::default(), Difficulty::Medium);
        assert_eq!(Difficulty::from_code("hard"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_code("brutal"), None);
    }

    #[test]
    fn test_title_validation() {
        assert_eq!(Title::new("  Morning grid ").unwrap().as_str(), "Morning grid");
        assert!(Title::new("   ").is_err());
        assert!(Title::new("x".repeat(256)).is_err());
        assert!(Title::new("x".repeat(255)).is_ok());
    }

    #[test]
    fn test_solve_time_bounds() {
        assert!(SolveTime::from_secs(0).is_none());
        assert!(SolveTime::from_secs(-5).is_none());
        assert!(SolveTime::from_secs(3_000_000_000).is_none());
        assert!(SolveTime::from_secs(i64::from(i32::MAX)).is_some());
        assert_eq!(SolveTime::from_secs(42).unwrap().as_secs(), 42);
    }
}
