//! Domain Services - Solution verification
//!
//! Pure functions: the same content and candidate always give the same
//! verdict.

use crate::domain::content::crossword::canonical_answer;
use crate::domain::content::grid::GRID_SIZE;
use crate::domain::content::word_search::{canonical_word, word_list};
use crate::domain::content::{
    CandidateGrid, Crossword, Direction, PuzzleContent, SolvedGrid, SudokuPuzzle, WordSearch,
    decode_raw,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Zero-based grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// Cell-by-cell against the stored grid solution
    StoredSolution,
    /// Row, column and box rules only
    GridRules,
    CrosswordAnswers,
    WordList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub correct: bool,
    pub method: VerificationMethod,
    /// Every mismatched cell, only populated for stored-solution checks
    pub mismatches: Vec<CellRef>,
}

impl Verdict {
    fn simple(correct: bool, method: VerificationMethod) -> Self {
        Self {
            correct,
            method,
            mismatches: Vec::new(),
        }
    }

    /// First `limit` mismatches, as surfaced to callers
    pub fn reported_mismatches(&self, limit: usize) -> &[CellRef] {
        &self.mismatches[..self.mismatches.len().min(limit)]
    }
}

/// Verify a candidate against normalized content.
///
/// Malformed candidates are incorrect, not errors.
pub fn verify(content: &PuzzleContent, candidate: &Value) -> Verdict {
    let candidate = decode_raw(candidate);
    match content {
        PuzzleContent::Sudoku(puzzle) => verify_grid(puzzle, &candidate),
        PuzzleContent::Crossword(crossword) => verify_crossword(crossword, &candidate),
        PuzzleContent::WordSearch(word_search) => verify_word_search(word_search, &candidate),
    }
}

fn verify_grid(puzzle: &SudokuPuzzle, candidate: &Value) -> Verdict {
    let Some(grid) = CandidateGrid::decode(candidate) else {
        let method = match puzzle.solution {
            Some(_) => VerificationMethod::StoredSolution,
            None => VerificationMethod::GridRules,
        };
        return Verdict::simple(false, method);
    };
    match &puzzle.solution {
        Some(solution) => compare_with_solution(solution, &grid),
        None => Verdict::simple(grid.solves(&puzzle.givens), VerificationMethod::GridRules),
    }
}

/// Cell-by-cell comparison, collecting every mismatched coordinate.
pub fn compare_with_solution(solution: &SolvedGrid, candidate: &CandidateGrid) -> Verdict {
    let mismatches: Vec<CellRef> = (0..GRID_SIZE)
        .flat_map(|row| (0..GRID_SIZE).map(move |col| CellRef { row, col }))
        .filter(|cell| candidate.get(cell.row, cell.col) != Some(solution.get(cell.row, cell.col)))
        .collect();
    Verdict {
        correct: mismatches.is_empty(),
        method: VerificationMethod::StoredSolution,
        mismatches,
    }
}

fn verify_crossword(crossword: &Crossword, candidate: &Value) -> Verdict {
    let Value::Object(answers) = candidate else {
        return Verdict::simple(false, VerificationMethod::CrosswordAnswers);
    };
    let correct = Direction::BOTH.into_iter().all(|direction| {
        crossword.clues(direction).iter().all(|clue| {
            Crossword::submitted_answer(answers, direction, clue.number)
                .is_some_and(|given| canonical_answer(given) == canonical_answer(&clue.answer))
        })
    });
    Verdict::simple(correct, VerificationMethod::CrosswordAnswers)
}

fn verify_word_search(word_search: &WordSearch, candidate: &Value) -> Verdict {
    let Some(found) = word_list(candidate) else {
        return Verdict::simple(false, VerificationMethod::WordList);
    };
    let found: HashSet<String> = found.iter().map(|w| canonical_word(w)).collect();
    let correct = word_search
        .words()
        .iter()
        .all(|required| found.contains(&canonical_word(required)));
    Verdict::simple(correct, VerificationMethod::WordList)
}
