//! Content Schema Validator
//!
//! Turns raw authored content into a typed [`PuzzleContent`]. Failures are
//! values carrying a client-facing reason, never panics.

pub mod crossword;
pub mod grid;
pub mod word_search;

use crate::domain::value_objects::PuzzleType;
use serde_json::{Value, json};
use std::borrow::Cow;
use thiserror::Error;

pub use crossword::{Clue, Crossword, CrosswordError, Direction};
pub use grid::{CandidateGrid, Grid, GridError, SolvedGrid, SudokuPuzzle};
pub use word_search::{WordSearch, WordSearchError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Crossword(#[from] CrosswordError),

    #[error(transparent)]
    WordSearch(#[from] WordSearchError),
}

impl ContentError {
    /// Client-facing reason string
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// Normalized puzzle content, one variant per puzzle type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleContent {
    Sudoku(SudokuPuzzle),
    Crossword(Crossword),
    WordSearch(WordSearch),
}

impl PuzzleContent {
    pub fn puzzle_type(&self) -> PuzzleType {
        match self {
            PuzzleContent::Sudoku(_) => PuzzleType::Sudoku,
            PuzzleContent::Crossword(_) => PuzzleType::Crossword,
            PuzzleContent::WordSearch(_) => PuzzleType::WordSearch,
        }
    }

    /// Normalized content as stored. Re-validates to an equal value.
    pub fn to_json(&self) -> Value {
        match self {
            PuzzleContent::Sudoku(s) => json!({ "grid": s.givens.to_json() }),
            PuzzleContent::Crossword(c) => c.to_json(),
            PuzzleContent::WordSearch(w) => w.to_json(),
        }
    }

    /// Stored grid solution, if any. Other types carry their answers in
    /// the content itself.
    pub fn solution_json(&self) -> Option<Value> {
        match self {
            PuzzleContent::Sudoku(s) => s.solution.as_ref().map(SolvedGrid::to_json),
            PuzzleContent::Crossword(_) | PuzzleContent::WordSearch(_) => None,
        }
    }

    /// Content as shown to players: no crossword answers.
    pub fn public_json(&self) -> Value {
        match self {
            PuzzleContent::Crossword(c) => c.public_json(),
            PuzzleContent::Sudoku(_) | PuzzleContent::WordSearch(_) => self.to_json(),
        }
    }

    pub fn has_stored_solution(&self) -> bool {
        match self {
            PuzzleContent::Sudoku(s) => s.solution.is_some(),
            PuzzleContent::Crossword(_) | PuzzleContent::WordSearch(_) => true,
        }
    }
}

/// A JSON string whose text is itself a JSON array or object is decoded to
/// that structure. Any other value is returned as is.
pub fn decode_raw(raw: &Value) -> Cow<'_, Value> {
    if let Value::String(text) = raw {
        let trimmed = text.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            if let Ok(parsed @ (Value::Array(_) | Value::Object(_))) =
                serde_json::from_str::<Value>(text)
            {
                return Cow::Owned(parsed);
            }
        }
    }
    Cow::Borrowed(raw)
}

/// Validates raw content for `puzzle_type`.
///
/// `raw_solution` is only meaningful for grid puzzles; when present it must
/// be a complete valid grid that agrees with every given.
pub fn validate_content(
    puzzle_type: PuzzleType,
    raw_content: &Value,
    raw_solution: Option<&Value>,
) -> Result<PuzzleContent, ContentError> {
    let content = decode_raw(raw_content);
    let solution = raw_solution
        .filter(|s| !s.is_null())
        .map(|s| decode_raw(s));

    let validated = match puzzle_type {
        PuzzleType::Sudoku => {
            let givens = Grid::decode(&content)?;
            let solution = solution.map(|s| SolvedGrid::decode(&s)).transpose()?;
            PuzzleContent::Sudoku(SudokuPuzzle::new(givens, solution)?)
        }
        PuzzleType::Crossword => {
            if solution.is_some() {
                tracing::debug!("ignoring separate solution for crossword content");
            }
            PuzzleContent::Crossword(Crossword::decode(&content)?)
        }
        PuzzleType::WordSearch => {
            if solution.is_some() {
                tracing::debug!("ignoring separate solution for word search content");
            }
            PuzzleContent::WordSearch(WordSearch::decode(&content)?)
        }
    };
    Ok(validated)
}
