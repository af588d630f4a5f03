//! 9x9 grid-logic (sudoku) content
//!
//! Accepts either a nested 9x9 array of cells or nine lines of digits
//! where `0` marks an empty cell. Normalized output is always the nested
//! form with `""` for empty cells.

use serde_json::Value;
use thiserror::Error;

pub const GRID_SIZE: usize = 9;
const BOX_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("Sudoku data must be a 9x9 array or multi-line string")]
    NotAGrid,

    #[error("Sudoku must have exactly 9 rows. Found {found} rows.")]
    RowCount { found: usize },

    #[error("Row {row} must have exactly 9 cells")]
    RowCells { row: usize },

    #[error("Row {row} must have exactly 9 digits. Found {found}.")]
    RowDigits { row: usize, found: usize },

    #[error("Invalid digit '{ch}' in row {row}. Use 0-9 only.")]
    InvalidDigit { row: usize, ch: char },

    #[error("Invalid value at row {row}, col {col}. Must be 1-9 or empty.")]
    InvalidCell { row: usize, col: usize },

    #[error("Solution must be a complete 9x9 grid of digits 1-9")]
    IncompleteSolution,

    #[error("Solution breaks the row, column or box rule")]
    SolutionBreaksRules,

    #[error("Value at row {row}, col {col} repeats a digit in its row, column or box")]
    GivensRepeat { row: usize, col: usize },

    #[error("Puzzle content conflicts with provided solution")]
    ConflictsWithSolution { row: usize, col: usize },
}

/// Raw cell decoding shared by givens, solutions and candidates.
///
/// `Ok(None)` is an empty cell, `Err(())` is anything that is neither
/// empty nor a digit 1-9.
fn parse_cell(cell: &Value) -> Result<Option<u8>, ()> {
    match cell {
        Value::Null => Ok(None),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Ok(None),
            Some(d @ 1..=9) => Ok(Some(d as u8)),
            _ => Err(()),
        },
        Value::String(s) => match s.trim() {
            "" | "0" => Ok(None),
            t => match t.parse::<u8>() {
                Ok(d @ 1..=9) if t.len() == 1 => Ok(Some(d)),
                _ => Err(()),
            },
        },
        _ => Err(()),
    }
}

/// Unwraps `{ "grid": [...] }` into its grid.
fn unwrap_grid(raw: &Value) -> &Value {
    match raw {
        Value::Object(map) => map.get("grid").unwrap_or(raw),
        _ => raw,
    }
}

type Cells = [[Option<u8>; GRID_SIZE]; GRID_SIZE];

fn cells_from_rows(rows: &[Value]) -> Result<Cells, GridError> {
    if rows.len() != GRID_SIZE {
        return Err(GridError::RowCount { found: rows.len() });
    }
    let mut cells = [[None; GRID_SIZE]; GRID_SIZE];
    for (r, row) in rows.iter().enumerate() {
        let row_cells = match row {
            Value::Array(items) if items.len() == GRID_SIZE => items,
            _ => return Err(GridError::RowCells { row: r + 1 }),
        };
        for (c, cell) in row_cells.iter().enumerate() {
            cells[r][c] = parse_cell(cell).map_err(|_| GridError::InvalidCell {
                row: r + 1,
                col: c + 1,
            })?;
        }
    }
    Ok(cells)
}

fn cells_from_lines(text: &str) -> Result<Cells, GridError> {
    let lines: Vec<String> = text
        .lines()
        .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() != GRID_SIZE {
        return Err(GridError::RowCount { found: lines.len() });
    }

    let mut cells = [[None; GRID_SIZE]; GRID_SIZE];
    for (r, line) in lines.iter().enumerate() {
        let found = line.chars().count();
        if found != GRID_SIZE {
            return Err(GridError::RowDigits { row: r + 1, found });
        }
        for (c, ch) in line.chars().enumerate() {
            cells[r][c] = match ch.to_digit(10) {
                Some(0) => None,
                Some(d) => Some(d as u8),
                None => return Err(GridError::InvalidDigit { row: r + 1, ch }),
            };
        }
    }
    Ok(cells)
}

fn decode_cells(raw: &Value) -> Result<Cells, GridError> {
    match unwrap_grid(raw) {
        Value::Array(rows) => cells_from_rows(rows),
        Value::String(text) => cells_from_lines(text),
        _ => Err(GridError::NotAGrid),
    }
}

/// Bitmask check of every row, column and 3x3 box.
///
/// Empty cells are ignored, so a partially filled grid passes as long as
/// no digit repeats within a unit.
fn units_are_consistent(cells: &Cells) -> bool {
    first_repeat(cells).is_none()
}

/// Zero-based coordinates of the first cell whose digit already appears
/// earlier in its row, column or box.
fn first_repeat(cells: &Cells) -> Option<(usize, usize)> {
    let mut rows = [0u16; GRID_SIZE];
    let mut cols = [0u16; GRID_SIZE];
    let mut boxes = [0u16; GRID_SIZE];

    for (r, row) in cells.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let Some(d) = cell else { continue };
            let bit = 1u16 << d;
            let b = (r / BOX_SIZE) * BOX_SIZE + c / BOX_SIZE;
            if rows[r] & bit != 0 || cols[c] & bit != 0 || boxes[b] & bit != 0 {
                return Some((r, c));
            }
            rows[r] |= bit;
            cols[c] |= bit;
            boxes[b] |= bit;
        }
    }
    None
}

/// Puzzle givens: a 9x9 grid where each cell is empty or a digit 1-9
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    cells: Cells,
}

impl Grid {
    pub fn decode(raw: &Value) -> Result<Self, GridError> {
        decode_cells(raw).map(|cells| Self { cells })
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        self.cells[row][col]
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    pub fn to_json(&self) -> Value {
        Value::Array(
            self.cells
                .iter()
                .map(|row| {
                    Value::Array(
                        row.iter()
                            .map(|cell| match cell {
                                Some(d) => Value::String(d.to_string()),
                                None => Value::String(String::new()),
                            })
                            .collect(),
                    )
                })
                .collect(),
        )
    }
}

/// A completely filled grid that satisfies every sudoku rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolvedGrid {
    digits: [[u8; GRID_SIZE]; GRID_SIZE],
}

impl SolvedGrid {
    pub fn decode(raw: &Value) -> Result<Self, GridError> {
        let cells = decode_cells(raw)?;
        Self::from_cells(&cells).ok_or(GridError::IncompleteSolution)?.checked()
    }

    fn from_cells(cells: &Cells) -> Option<Self> {
        let mut digits = [[0u8; GRID_SIZE]; GRID_SIZE];
        for (r, row) in cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                digits[r][c] = (*cell)?;
            }
        }
        Some(Self { digits })
    }

    fn checked(self) -> Result<Self, GridError> {
        if units_are_consistent(&self.as_cells()) {
            Ok(self)
        } else {
            Err(GridError::SolutionBreaksRules)
        }
    }

    fn as_cells(&self) -> Cells {
        self.digits.map(|row| row.map(Some))
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.digits[row][col]
    }

    /// Fails on the first given that disagrees with this solution.
    pub fn check_givens(&self, givens: &Grid) -> Result<(), GridError> {
        for r in 0..GRID_SIZE {
            for c in 0..GRID_SIZE {
                if givens.get(r, c).is_some_and(|d| d != self.get(r, c)) {
                    return Err(GridError::ConflictsWithSolution {
                        row: r + 1,
                        col: c + 1,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Value {
        Value::Array(
            self.digits
                .iter()
                .map(|row| Value::Array(row.iter().map(|d| Value::from(*d)).collect()))
                .collect(),
        )
    }
}

/// Grid-logic puzzle: givens plus an optional stored solution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SudokuPuzzle {
    pub givens: Grid,
    pub solution: Option<SolvedGrid>,
}

impl SudokuPuzzle {
    pub fn new(givens: Grid, solution: Option<SolvedGrid>) -> Result<Self, GridError> {
        if let Some((r, c)) = first_repeat(&givens.cells) {
            return Err(GridError::GivensRepeat { row: r + 1, col: c + 1 });
        }
        if let Some(solution) = &solution {
            solution.check_givens(&givens)?;
        }
        Ok(Self { givens, solution })
    }
}

/// Candidate grid as submitted by a player.
///
/// Decoding is lenient: the shape must be 9x9 but any cell that is not a
/// digit 1-9 is read as empty. Returns `None` when the shape is wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateGrid {
    cells: Cells,
}

impl CandidateGrid {
    pub fn decode(raw: &Value) -> Option<Self> {
        let rows = match unwrap_grid(raw) {
            Value::Array(rows) if rows.len() == GRID_SIZE => rows,
            Value::String(text) => {
                return cells_from_lines(text).ok().map(|cells| Self { cells });
            }
            _ => return None,
        };
        let mut cells = [[None; GRID_SIZE]; GRID_SIZE];
        for (r, row) in rows.iter().enumerate() {
            let Value::Array(items) = row else { return None };
            if items.len() != GRID_SIZE {
                return None;
            }
            for (c, cell) in items.iter().enumerate() {
                cells[r][c] = parse_cell(cell).ok().flatten();
            }
        }
        Some(Self { cells })
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        self.cells[row][col]
    }

    /// Complete and free of repeats in every row, column and box.
    pub fn satisfies_rules(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some) && units_are_consistent(&self.cells)
    }

    /// Complete, rule-satisfying and agreeing with every given.
    pub fn solves(&self, givens: &Grid) -> bool {
        self.satisfies_rules()
            && (0..GRID_SIZE).all(|r| {
                (0..GRID_SIZE).all(|c| givens.get(r, c).is_none_or(|d| self.get(r, c) == Some(d)))
            })
    }
}
