//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.

use crate::domain::attempt_state::{AttemptPolicy, AttemptRejection, AttemptState};
use crate::domain::entities::{Attempt, CompletionSummary, PlayerSummary, Puzzle};
use crate::domain::statistics::PuzzleStats;
use crate::domain::value_objects::{Difficulty, PuzzleType};
use crate::error::PuzzleResult;
use kernel::id::{PlayerId, PuzzleId};

pub const DEFAULT_PAGE_LIMIT: u32 = 50;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Limit/offset window, limit clamped to `1..=MAX_PAGE_LIMIT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PuzzleFilter {
    pub puzzle_type: Option<PuzzleType>,
    pub difficulty: Option<Difficulty>,
    pub is_active: Option<bool>,
    pub page: Page,
}

impl PuzzleFilter {
    pub fn matches(&self, puzzle: &Puzzle) -> bool {
        self.puzzle_type.is_none_or(|t| t == puzzle.puzzle_type())
            && self.difficulty.is_none_or(|d| d == puzzle.details.difficulty)
            && self.is_active.is_none_or(|a| a == puzzle.is_active)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptFilter {
    pub is_correct: Option<bool>,
    pub page: Page,
}

/// Outcome of the atomic submit unit
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptRecord {
    /// Turned away by the state machine, nothing written
    Rejected {
        rejection: AttemptRejection,
        state: AttemptState,
    },
    /// Attempt written. `stats` is set when it completed the pair.
    Recorded {
        state: AttemptState,
        stats: Option<PuzzleStats>,
    },
}

/// Puzzle repository trait
#[trait_variant::make(PuzzleRepository: Send)]
pub trait LocalPuzzleRepository {
    /// Persist a new puzzle
    async fn create_puzzle(&self, puzzle: &Puzzle) -> PuzzleResult<()>;

    async fn find_puzzle(&self, id: PuzzleId) -> PuzzleResult<Option<Puzzle>>;

    /// Write details, content and active flag. Aggregate counters are left
    /// untouched; only `record_attempt` changes them.
    async fn update_puzzle(&self, puzzle: &Puzzle) -> PuzzleResult<()>;

    /// One page of matching puzzles (newest first) and the total match count
    async fn list_puzzles(&self, filter: &PuzzleFilter) -> PuzzleResult<(Vec<Puzzle>, u64)>;

    /// Fastest, slowest and most recent correct attempts
    async fn completion_summary(
        &self,
        puzzle_id: PuzzleId,
        recent_limit: usize,
    ) -> PuzzleResult<CompletionSummary>;
}

/// Attempt repository trait
#[trait_variant::make(AttemptRepository: Send)]
pub trait LocalAttemptRepository {
    /// Attempt log of one pair, newest first
    async fn list_pair_attempts(
        &self,
        puzzle_id: PuzzleId,
        player_id: PlayerId,
    ) -> PuzzleResult<Vec<Attempt>>;

    /// Atomically re-derive the pair state, write the attempt if admitted
    /// and apply the statistics update when it completes the pair.
    ///
    /// Fails with `PuzzleNotFound` or `PuzzleInactive` without writing.
    async fn record_attempt(
        &self,
        attempt: &Attempt,
        policy: AttemptPolicy,
    ) -> PuzzleResult<AttemptRecord>;

    /// One page of a player's attempts across puzzles, newest first, and
    /// the total match count
    async fn list_player_attempts(
        &self,
        player_id: PlayerId,
        filter: &AttemptFilter,
    ) -> PuzzleResult<(Vec<Attempt>, u64)>;

    async fn player_summary(&self, player_id: PlayerId) -> PuzzleResult<PlayerSummary>;
}
