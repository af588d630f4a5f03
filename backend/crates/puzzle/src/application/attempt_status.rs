//! Attempt Status Use Case
//!
//! Read-only view of a (puzzle, player) pair.

use crate::application::config::PuzzleConfig;
use crate::domain::attempt_state::AttemptState;
use crate::domain::entities::Attempt;
use crate::domain::repository::{AttemptRepository, PuzzleRepository};
use crate::error::{PuzzleError, PuzzleResult};
use kernel::id::{PlayerId, PuzzleId};
use std::sync::Arc;

/// Output DTO for attempt status
#[derive(Debug, Clone)]
pub struct AttemptStatusOutput {
    pub state: AttemptState,
    pub attempt_number: u32,
    pub attempts_remaining: u32,
    pub max_attempts: u32,
    /// Newest first
    pub attempts: Vec<Attempt>,
}

impl AttemptStatusOutput {
    pub fn completed(&self) -> bool {
        self.state.is_completed()
    }

    pub fn max_attempts_reached(&self) -> bool {
        self.attempt_number >= self.max_attempts
    }

    pub fn can_attempt(&self) -> bool {
        self.state.can_attempt()
    }
}

/// Attempt Status Use Case
pub struct AttemptStatusUseCase<P, A>
where
    P: PuzzleRepository,
    A: AttemptRepository,
{
    puzzle_repo: Arc<P>,
    attempt_repo: Arc<A>,
    config: Arc<PuzzleConfig>,
}

impl<P, A> AttemptStatusUseCase<P, A>
where
    P: PuzzleRepository,
    A: AttemptRepository,
{
    pub fn new(puzzle_repo: Arc<P>, attempt_repo: Arc<A>, config: Arc<PuzzleConfig>) -> Self {
        Self {
            puzzle_repo,
            attempt_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        puzzle_id: PuzzleId,
        player_id: PlayerId,
    ) -> PuzzleResult<AttemptStatusOutput> {
        if self.puzzle_repo.find_puzzle(puzzle_id).await?.is_none() {
            return Err(PuzzleError::PuzzleNotFound);
        }

        let attempts = self
            .attempt_repo
            .list_pair_attempts(puzzle_id, player_id)
            .await?;

        let policy = self.config.attempt_policy();
        let count = u32::try_from(attempts.len()).unwrap_or(u32::MAX);
        let state = AttemptState::from_log(count, attempts.iter().any(|a| a.is_correct), policy);

        Ok(AttemptStatusOutput {
            state,
            attempt_number: state.attempts_used(),
            attempts_remaining: state.attempts_remaining(policy),
            max_attempts: policy.max_attempts(),
            attempts,
        })
    }
}
