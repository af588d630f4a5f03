//! Puzzle authoring use cases: validate, create, update, publish/retire

use crate::domain::content::{PuzzleContent, validate_content};
use crate::domain::entities::{DEFAULT_XP_REWARD, Puzzle, PuzzleDetails};
use crate::domain::repository::PuzzleRepository;
use crate::domain::value_objects::{Difficulty, MAX_STORED_COUNT, PuzzleType, Title};
use crate::error::{PuzzleError, PuzzleResult};
use kernel::id::{PlayerId, PuzzleId};
use serde_json::Value;
use std::sync::Arc;

/// Metadata fields as supplied by the author. `None` keeps the current (or
/// default) value.
#[derive(Debug, Clone, Default)]
pub struct DetailsInput {
    pub title: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub xp_reward: Option<i64>,
    /// `0` clears the limit
    pub time_limit_minutes: Option<i64>,
}

fn bounded(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|&v| v <= MAX_STORED_COUNT)
}

impl DetailsInput {
    fn apply(self, base: Option<&PuzzleDetails>) -> PuzzleResult<PuzzleDetails> {
        let title = match (self.title, base) {
            (Some(raw), _) => Title::new(raw).map_err(PuzzleError::InvalidMetadata)?,
            (None, Some(base)) => base.title.clone(),
            (None, None) => {
                return Err(PuzzleError::InvalidMetadata("Title is required".to_string()));
            }
        };

        let xp_reward = match self.xp_reward {
            Some(xp) => bounded(xp).ok_or_else(|| {
                PuzzleError::InvalidMetadata(format!(
                    "XP reward must be an integer between 0 and {MAX_STORED_COUNT}"
                ))
            })?,
            None => base.map_or(DEFAULT_XP_REWARD, |b| b.xp_reward),
        };

        let time_limit_minutes = match self.time_limit_minutes {
            Some(0) => None,
            Some(minutes) => Some(bounded(minutes).ok_or_else(|| {
                PuzzleError::InvalidMetadata(format!(
                    "Time limit must be between 1 and {MAX_STORED_COUNT} minutes"
                ))
            })?),
            None => base.and_then(|b| b.time_limit_minutes),
        };

        Ok(PuzzleDetails {
            title,
            difficulty: self
                .difficulty
                .or(base.map(|b| b.difficulty))
                .unwrap_or_default(),
            xp_reward,
            time_limit_minutes,
        })
    }
}

/// Dry-run content validation, nothing is stored
pub fn validate_puzzle_content(
    puzzle_type: PuzzleType,
    content: &Value,
    solution: Option<&Value>,
) -> PuzzleResult<PuzzleContent> {
    validate_content(puzzle_type, content, solution).map_err(|err| {
        tracing::debug!(puzzle_type = %puzzle_type, reason = %err, "Content rejected");
        PuzzleError::InvalidContent(err)
    })
}

/// Input DTO for create puzzle
#[derive(Debug, Clone)]
pub struct CreatePuzzleInput {
    pub puzzle_type: PuzzleType,
    pub content: Value,
    pub solution: Option<Value>,
    pub details: DetailsInput,
    pub is_active: Option<bool>,
}

/// Create Puzzle Use Case
pub struct CreatePuzzleUseCase<P>
where
    P: PuzzleRepository,
{
    puzzle_repo: Arc<P>,
}

impl<P> CreatePuzzleUseCase<P>
where
    P: PuzzleRepository,
{
    pub fn new(puzzle_repo: Arc<P>) -> Self {
        Self { puzzle_repo }
    }

    pub async fn execute(&self, input: CreatePuzzleInput, author: PlayerId) -> PuzzleResult<Puzzle> {
        let details = input.details.apply(None)?;
        let content =
            validate_puzzle_content(input.puzzle_type, &input.content, input.solution.as_ref())?;

        let mut puzzle = Puzzle::new(details, content, author);
        if let Some(is_active) = input.is_active {
            puzzle.is_active = is_active;
        }
        self.puzzle_repo.create_puzzle(&puzzle).await?;

        tracing::info!(
            puzzle_id = %puzzle.id,
            puzzle_type = %puzzle.puzzle_type(),
            author = %author,
            "Puzzle created"
        );

        Ok(puzzle)
    }
}

/// Input DTO for update puzzle
#[derive(Debug, Clone, Default)]
pub struct UpdatePuzzleInput {
    pub puzzle_type: Option<PuzzleType>,
    pub content: Option<Value>,
    pub solution: Option<Value>,
    pub details: DetailsInput,
    pub is_active: Option<bool>,
}

/// Update Puzzle Use Case
///
/// Content and solution are replaced wholesale and re-validated together.
pub struct UpdatePuzzleUseCase<P>
where
    P: PuzzleRepository,
{
    puzzle_repo: Arc<P>,
}

impl<P> UpdatePuzzleUseCase<P>
where
    P: PuzzleRepository,
{
    pub fn new(puzzle_repo: Arc<P>) -> Self {
        Self { puzzle_repo }
    }

    pub async fn execute(
        &self,
        puzzle_id: PuzzleId,
        input: UpdatePuzzleInput,
        editor: PlayerId,
    ) -> PuzzleResult<Puzzle> {
        let mut puzzle = self
            .puzzle_repo
            .find_puzzle(puzzle_id)
            .await?
            .ok_or(PuzzleError::PuzzleNotFound)?;

        let current_type = puzzle.puzzle_type();
        let new_type = input.puzzle_type.unwrap_or(current_type);

        let replacement = match (&input.content, &input.solution) {
            (None, _) if new_type != current_type => {
                return Err(PuzzleError::InvalidMetadata(
                    "Changing the puzzle type requires new content".to_string(),
                ));
            }
            (None, None) => None,
            (Some(content), solution) => {
                // A new grid without a new solution keeps the stored one
                let kept = match solution {
                    Some(s) => Some(s.clone()),
                    None if new_type == current_type => puzzle.content.solution_json(),
                    None => None,
                };
                Some(validate_puzzle_content(new_type, content, kept.as_ref())?)
            }
            (None, Some(solution)) => Some(validate_puzzle_content(
                current_type,
                &puzzle.content.to_json(),
                Some(solution),
            )?),
        };

        let details = input.details.apply(Some(&puzzle.details))?;
        if details != puzzle.details {
            puzzle.set_details(details);
        }
        if let Some(content) = replacement {
            puzzle.replace_content(content);
        }
        if let Some(is_active) = input.is_active {
            puzzle.set_active(is_active);
        }

        self.puzzle_repo.update_puzzle(&puzzle).await?;

        tracing::info!(
            puzzle_id = %puzzle.id,
            puzzle_type = %puzzle.puzzle_type(),
            editor = %editor,
            "Puzzle updated"
        );

        Ok(puzzle)
    }
}

/// What to do with the active flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveChange {
    Retire,
    Toggle,
}

/// Publish/Retire Use Case. Puzzles are never physically removed.
pub struct SetPuzzleActiveUseCase<P>
where
    P: PuzzleRepository,
{
    puzzle_repo: Arc<P>,
}

impl<P> SetPuzzleActiveUseCase<P>
where
    P: PuzzleRepository,
{
    pub fn new(puzzle_repo: Arc<P>) -> Self {
        Self { puzzle_repo }
    }

    pub async fn execute(
        &self,
        puzzle_id: PuzzleId,
        change: ActiveChange,
        editor: PlayerId,
    ) -> PuzzleResult<Puzzle> {
        let mut puzzle = self
            .puzzle_repo
            .find_puzzle(puzzle_id)
            .await?
            .ok_or(PuzzleError::PuzzleNotFound)?;

        let is_active = match change {
            ActiveChange::Retire => false,
            ActiveChange::Toggle => !puzzle.is_active,
        };
        puzzle.set_active(is_active);
        self.puzzle_repo.update_puzzle(&puzzle).await?;

        tracing::info!(
            puzzle_id = %puzzle.id,
            is_active,
            editor = %editor,
            "Puzzle active flag changed"
        );

        Ok(puzzle)
    }
}
