//! In-memory Repository Implementation
//!
//! Every operation runs under one mutex, which makes `record_attempt`
//! atomic in the same way the PostgreSQL transaction is.

use crate::domain::attempt_state::{AttemptPolicy, AttemptState};
use crate::domain::entities::{Attempt, CompletionSummary, PlayerSummary, Puzzle};
use crate::domain::repository::{
    AttemptFilter, AttemptRecord, AttemptRepository, Page, PuzzleFilter, PuzzleRepository,
};
use crate::error::{PuzzleError, PuzzleResult};
use kernel::id::{PlayerId, PuzzleId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Store {
    puzzles: HashMap<PuzzleId, Puzzle>,
    /// Append-only, oldest first
    attempts: Vec<Attempt>,
}

/// Process-local repository for tests and local development
#[derive(Debug, Clone, Default)]
pub struct InMemoryPuzzleRepository {
    store: Arc<Mutex<Store>>,
}

impl InMemoryPuzzleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T: Clone>(items: &[T], page: Page) -> Vec<T> {
    items
        .iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .cloned()
        .collect()
}

impl PuzzleRepository for InMemoryPuzzleRepository {
    async fn create_puzzle(&self, puzzle: &Puzzle) -> PuzzleResult<()> {
        let mut store = self.store.lock().await;
        if store.puzzles.contains_key(&puzzle.id) {
            return Err(PuzzleError::Internal(format!("duplicate puzzle id {}", puzzle.id)));
        }
        store.puzzles.insert(puzzle.id, puzzle.clone());
        Ok(())
    }

    async fn find_puzzle(&self, id: PuzzleId) -> PuzzleResult<Option<Puzzle>> {
        Ok(self.store.lock().await.puzzles.get(&id).cloned())
    }

    async fn update_puzzle(&self, puzzle: &Puzzle) -> PuzzleResult<()> {
        let mut store = self.store.lock().await;
        let stored = store
            .puzzles
            .get_mut(&puzzle.id)
            .ok_or(PuzzleError::PuzzleNotFound)?;
        let stats = stored.stats;
        *stored = puzzle.clone();
        stored.stats = stats;
        Ok(())
    }

    async fn list_puzzles(&self, filter: &PuzzleFilter) -> PuzzleResult<(Vec<Puzzle>, u64)> {
        let store = self.store.lock().await;
        let mut matching: Vec<&Puzzle> = store.puzzles.values().filter(|p| filter.matches(p)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.as_uuid().cmp(b.id.as_uuid())));
        let total = matching.len() as u64;
        let items = paginate(&matching, filter.page).into_iter().cloned().collect();
        Ok((items, total))
    }

    async fn completion_summary(
        &self,
        puzzle_id: PuzzleId,
        recent_limit: usize,
    ) -> PuzzleResult<CompletionSummary> {
        let store = self.store.lock().await;
        Ok(CompletionSummary::from_correct_attempts(
            store.attempts.iter().rev().filter(|a| a.puzzle_id == puzzle_id),
            recent_limit,
        ))
    }
}

impl AttemptRepository for InMemoryPuzzleRepository {
    async fn list_pair_attempts(
        &self,
        puzzle_id: PuzzleId,
        player_id: PlayerId,
    ) -> PuzzleResult<Vec<Attempt>> {
        let store = self.store.lock().await;
        Ok(store
            .attempts
            .iter()
            .rev()
            .filter(|a| a.puzzle_id == puzzle_id && a.player_id == player_id)
            .cloned()
            .collect())
    }

    async fn record_attempt(
        &self,
        attempt: &Attempt,
        policy: AttemptPolicy,
    ) -> PuzzleResult<AttemptRecord> {
        let mut store = self.store.lock().await;
        let Store { puzzles, attempts } = &mut *store;

        let puzzle = puzzles
            .get_mut(&attempt.puzzle_id)
            .ok_or(PuzzleError::PuzzleNotFound)?;
        if !puzzle.is_active {
            return Err(PuzzleError::PuzzleInactive);
        }

        let (count, has_correct) = attempts
            .iter()
            .filter(|a| a.puzzle_id == attempt.puzzle_id && a.player_id == attempt.player_id)
            .fold((0u32, false), |(n, correct), a| (n + 1, correct || a.is_correct));
        let state = AttemptState::from_log(count, has_correct, policy);

        if let Err(rejection) = state.admit() {
            return Ok(AttemptRecord::Rejected { rejection, state });
        }

        attempts.push(attempt.clone());
        let stats = if attempt.is_correct {
            puzzle.stats = puzzle.stats.record_completion(attempt.duration);
            Some(puzzle.stats)
        } else {
            None
        };

        Ok(AttemptRecord::Recorded {
            state: state.record(attempt.is_correct, policy),
            stats,
        })
    }

    async fn list_player_attempts(
        &self,
        player_id: PlayerId,
        filter: &AttemptFilter,
    ) -> PuzzleResult<(Vec<Attempt>, u64)> {
        let store = self.store.lock().await;
        let matching: Vec<&Attempt> = store
            .attempts
            .iter()
            .rev()
            .filter(|a| a.player_id == player_id)
            .filter(|a| filter.is_correct.is_none_or(|c| c == a.is_correct))
            .collect();
        let total = matching.len() as u64;
        let items = paginate(&matching, filter.page).into_iter().cloned().collect();
        Ok((items, total))
    }

    async fn player_summary(&self, player_id: PlayerId) -> PuzzleResult<PlayerSummary> {
        let store = self.store.lock().await;
        Ok(PlayerSummary::from_attempts(
            store.attempts.iter().filter(|a| a.player_id == player_id),
        ))
    }
}
