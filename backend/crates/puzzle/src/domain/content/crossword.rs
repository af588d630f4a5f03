//! Crossword content: numbered across and down clues with answers

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[display("across")]
    Across,
    #[display("down")]
    Down,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Across, Direction::Down];

    pub const fn key(&self) -> &'static str {
        match self {
            Direction::Across => "across",
            Direction::Down => "down",
        }
    }

    const fn label(&self) -> &'static str {
        match self {
            Direction::Across => "Across",
            Direction::Down => "Down",
        }
    }

    const fn article(&self) -> &'static str {
        match self {
            Direction::Across => "an",
            Direction::Down => "a",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrosswordError {
    #[error("Crossword data must be a valid object")]
    NotAnObject,

    #[error("Crossword must have {} \"{}\" array", .0.article(), .0.key())]
    MissingDirection(Direction),

    #[error("Each {} clue must have: number, clue, and answer", .direction.key())]
    IncompleteClue { direction: Direction, position: usize },

    #[error("{} clue {number} must have a valid answer", .direction.label())]
    InvalidAnswer { direction: Direction, number: u32 },

    #[error("{} clue {number} is listed more than once", .direction.label())]
    DuplicateNumber { direction: Direction, number: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub number: u32,
    pub clue: String,
    pub answer: String,
}

/// Comparison form of an answer: trimmed and upper-cased.
pub fn canonical_answer(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossword {
    across: Vec<Clue>,
    down: Vec<Clue>,
}

impl Crossword {
    pub fn decode(raw: &Value) -> Result<Self, CrosswordError> {
        let Value::Object(map) = raw else {
            return Err(CrosswordError::NotAnObject);
        };
        Ok(Self {
            across: decode_clues(map, Direction::Across)?,
            down: decode_clues(map, Direction::Down)?,
        })
    }

    pub fn clues(&self, direction: Direction) -> &[Clue] {
        match direction {
            Direction::Across => &self.across,
            Direction::Down => &self.down,
        }
    }

    pub fn clue_count(&self) -> usize {
        self.across.len() + self.down.len()
    }

    /// Looks up a submitted answer under `across_3` or `3_across`.
    pub fn submitted_answer<'a>(
        candidate: &'a Map<String, Value>,
        direction: Direction,
        number: u32,
    ) -> Option<&'a str> {
        [
            format!("{}_{}", direction.key(), number),
            format!("{}_{}", number, direction.key()),
        ]
        .iter()
        .filter_map(|key| candidate.get(key).and_then(Value::as_str))
        .find(|answer| !answer.trim().is_empty())
    }

    pub fn to_json(&self) -> Value {
        json!({ "across": self.across, "down": self.down })
    }

    /// Clues without answers, with each answer's length instead.
    pub fn public_json(&self) -> Value {
        let strip = |clues: &[Clue]| -> Vec<Value> {
            clues
                .iter()
                .map(|c| {
                    json!({
                        "number": c.number,
                        "clue": c.clue,
                        "length": c.answer.trim().chars().count(),
                    })
                })
                .collect()
        };
        json!({ "across": strip(&self.across), "down": strip(&self.down) })
    }
}

fn decode_clues(map: &Map<String, Value>, direction: Direction) -> Result<Vec<Clue>, CrosswordError> {
    let Some(Value::Array(entries)) = map.get(direction.key()) else {
        return Err(CrosswordError::MissingDirection(direction));
    };

    let mut seen = HashSet::new();
    let mut clues = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        let incomplete = CrosswordError::IncompleteClue {
            direction,
            position: position + 1,
        };
        let number = entry
            .get("number")
            .and_then(clue_number)
            .ok_or(incomplete.clone())?;
        let clue = entry
            .get("clue")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(incomplete)?;
        let answer = match entry.get("answer") {
            Some(Value::String(a)) if !a.trim().is_empty() => a.trim(),
            _ => return Err(CrosswordError::InvalidAnswer { direction, number }),
        };
        if !seen.insert(number) {
            return Err(CrosswordError::DuplicateNumber { direction, number });
        }
        clues.push(Clue {
            number,
            clue: clue.to_string(),
            answer: answer.to_string(),
        });
    }
    Ok(clues)
}

/// Positive integer, either as a JSON number or a numeric string.
fn clue_number(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(n).ok().filter(|&n| n > 0)
}
