//! Check Solution Use Case
//!
//! Non-committing "check my work": verifies a candidate without recording
//! an attempt.

use crate::application::config::PuzzleConfig;
use crate::domain::entities::Puzzle;
use crate::domain::repository::PuzzleRepository;
use crate::domain::services::{CellRef, Verdict, verify};
use crate::error::{PuzzleError, PuzzleResult};
use kernel::id::PuzzleId;
use serde_json::Value;
use std::sync::Arc;

/// Output DTO for check solution
#[derive(Debug, Clone)]
pub struct CheckSolutionOutput {
    pub correct: bool,
    /// First mismatches only, per `mismatch_report_limit`
    pub mismatches: Vec<CellRef>,
    pub mismatch_count: usize,
}

impl CheckSolutionOutput {
    pub(crate) fn from_verdict(verdict: &Verdict, limit: usize) -> Self {
        Self {
            correct: verdict.correct,
            mismatches: verdict.reported_mismatches(limit).to_vec(),
            mismatch_count: verdict.mismatches.len(),
        }
    }
}

/// Verify against a playable puzzle, honouring the rule-fallback setting.
pub(crate) fn verify_playable(puzzle: &Puzzle, candidate: &Value, config: &PuzzleConfig) -> PuzzleResult<Verdict> {
    if !puzzle.is_active {
        return Err(PuzzleError::PuzzleInactive);
    }
    if !puzzle.content.has_stored_solution() && !config.allow_constraint_fallback {
        tracing::error!(puzzle_id = %puzzle.id, "Grid puzzle has no stored solution");
        return Err(PuzzleError::SolutionMissing);
    }
    Ok(verify(&puzzle.content, candidate))
}

/// Check Solution Use Case
pub struct CheckSolutionUseCase<P>
where
    P: PuzzleRepository,
{
    puzzle_repo: Arc<P>,
    config: Arc<PuzzleConfig>,
}

impl<P> CheckSolutionUseCase<P>
where
    P: PuzzleRepository,
{
    pub fn new(puzzle_repo: Arc<P>, config: Arc<PuzzleConfig>) -> Self {
        Self {
            puzzle_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        puzzle_id: PuzzleId,
        candidate: &Value,
    ) -> PuzzleResult<CheckSolutionOutput> {
        let puzzle = self
            .puzzle_repo
            .find_puzzle(puzzle_id)
            .await?
            .ok_or(PuzzleError::PuzzleNotFound)?;

        let verdict = verify_playable(&puzzle, candidate, &self.config)?;

        tracing::debug!(
            puzzle_id = %puzzle_id,
            correct = verdict.correct,
            method = ?verdict.method,
            "Solution checked"
        );

        Ok(CheckSolutionOutput::from_verdict(
            &verdict,
            self.config.mismatch_report_limit,
        ))
    }
}
