//! Read-side use cases: browsing puzzles, puzzle statistics and a player's
//! own attempt history

use crate::application::config::PuzzleConfig;
use crate::domain::entities::{Attempt, CompletionSummary, PlayerSummary, Puzzle};
use crate::domain::repository::{AttemptFilter, AttemptRepository, PuzzleFilter, PuzzleRepository};
use crate::domain::statistics::PuzzleStats;
use crate::error::{PuzzleError, PuzzleResult};
use kernel::id::{PlayerId, PuzzleId};
use std::sync::Arc;

/// One page of results plus the total number of matches
#[derive(Debug, Clone)]
pub struct PageOutput<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

/// Get / List Puzzles Use Case
pub struct BrowsePuzzlesUseCase<P>
where
    P: PuzzleRepository,
{
    puzzle_repo: Arc<P>,
}

impl<P> BrowsePuzzlesUseCase<P>
where
    P: PuzzleRepository,
{
    pub fn new(puzzle_repo: Arc<P>) -> Self {
        Self { puzzle_repo }
    }

    pub async fn get(&self, puzzle_id: PuzzleId) -> PuzzleResult<Puzzle> {
        self.puzzle_repo
            .find_puzzle(puzzle_id)
            .await?
            .ok_or(PuzzleError::PuzzleNotFound)
    }

    pub async fn list(&self, filter: PuzzleFilter) -> PuzzleResult<PageOutput<Puzzle>> {
        let (items, total) = self.puzzle_repo.list_puzzles(&filter).await?;
        Ok(PageOutput {
            items,
            total,
            limit: filter.page.limit,
            offset: filter.page.offset,
        })
    }
}

/// Output DTO for puzzle statistics
#[derive(Debug, Clone)]
pub struct PuzzleStatsOutput {
    pub puzzle: Puzzle,
    pub stats: PuzzleStats,
    pub completions: CompletionSummary,
}

/// Puzzle Statistics Use Case
pub struct PuzzleStatsUseCase<P>
where
    P: PuzzleRepository,
{
    puzzle_repo: Arc<P>,
    config: Arc<PuzzleConfig>,
}

impl<P> PuzzleStatsUseCase<P>
where
    P: PuzzleRepository,
{
    pub fn new(puzzle_repo: Arc<P>, config: Arc<PuzzleConfig>) -> Self {
        Self {
            puzzle_repo,
            config,
        }
    }

    pub async fn execute(&self, puzzle_id: PuzzleId) -> PuzzleResult<PuzzleStatsOutput> {
        let puzzle = self
            .puzzle_repo
            .find_puzzle(puzzle_id)
            .await?
            .ok_or(PuzzleError::PuzzleNotFound)?;

        let completions = self
            .puzzle_repo
            .completion_summary(puzzle_id, self.config.recent_completions)
            .await?;

        Ok(PuzzleStatsOutput {
            stats: puzzle.stats,
            puzzle,
            completions,
        })
    }
}

/// Output DTO for a player's attempt history
#[derive(Debug, Clone)]
pub struct PlayerAttemptsOutput {
    pub page: PageOutput<Attempt>,
    pub summary: PlayerSummary,
}

/// Player Attempts Use Case
pub struct PlayerAttemptsUseCase<A>
where
    A: AttemptRepository,
{
    attempt_repo: Arc<A>,
}

impl<A> PlayerAttemptsUseCase<A>
where
    A: AttemptRepository,
{
    pub fn new(attempt_repo: Arc<A>) -> Self {
        Self { attempt_repo }
    }

    pub async fn execute(
        &self,
        player_id: PlayerId,
        filter: AttemptFilter,
    ) -> PuzzleResult<PlayerAttemptsOutput> {
        let (items, total) = self
            .attempt_repo
            .list_player_attempts(player_id, &filter)
            .await?;
        let summary = self.attempt_repo.player_summary(player_id).await?;

        Ok(PlayerAttemptsOutput {
            page: PageOutput {
                items,
                total,
                limit: filter.page.limit,
                offset: filter.page.offset,
            },
            summary,
        })
    }
}
