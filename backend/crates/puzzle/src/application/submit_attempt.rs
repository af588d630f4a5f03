//! Submit Attempt Use Case

use crate::application::check_solution::verify_playable;
use crate::application::config::PuzzleConfig;
use crate::domain::attempt_state::{AttemptRejection, AttemptState};
use crate::domain::entities::Attempt;
use crate::domain::repository::{AttemptRecord, AttemptRepository, PuzzleRepository};
use crate::domain::services::CellRef;
use crate::domain::statistics::PuzzleStats;
use crate::domain::value_objects::SolveTime;
use crate::error::{PuzzleError, PuzzleResult};
use kernel::id::{PlayerId, PuzzleId};
use platform::retry::retry_when;
use serde_json::Value;
use std::net::IpAddr;
use std::sync::Arc;

/// Input DTO for submit attempt
#[derive(Debug, Clone)]
pub struct SubmitAttemptInput {
    pub puzzle_id: PuzzleId,
    pub player_id: PlayerId,
    pub solution: Value,
    /// Seconds, must be at least 1
    pub duration_secs: i64,
    /// Logged only
    pub client_ip: Option<IpAddr>,
}

/// Output DTO for submit attempt
#[derive(Debug, Clone)]
pub struct SubmitAttemptOutput {
    /// `Some` when the submission was turned away and nothing was written
    pub rejection: Option<AttemptRejection>,
    pub correct: bool,
    /// Attempts on record for the pair after this submission
    pub attempt_number: u32,
    pub attempts_remaining: u32,
    pub state: AttemptState,
    pub xp_earned: u32,
    pub mismatches: Vec<CellRef>,
    pub mismatch_count: usize,
    /// New aggregates when this attempt completed the pair
    pub stats: Option<PuzzleStats>,
}

impl SubmitAttemptOutput {
    pub fn accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Submit Attempt Use Case
///
/// Verification is pure and runs first; the state check, the attempt write
/// and the statistics update then run as one atomic unit in the store.
pub struct SubmitAttemptUseCase<P, A>
where
    P: PuzzleRepository,
    A: AttemptRepository,
{
    puzzle_repo: Arc<P>,
    attempt_repo: Arc<A>,
    config: Arc<PuzzleConfig>,
}

impl<P, A> SubmitAttemptUseCase<P, A>
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

    pub async fn execute(&self, input: SubmitAttemptInput) -> PuzzleResult<SubmitAttemptOutput> {
        let duration = SolveTime::from_secs(input.duration_secs).ok_or_else(|| {
            PuzzleError::InvalidSubmission("Duration must be a positive number of seconds".to_string())
        })?;

        let puzzle = self
            .puzzle_repo
            .find_puzzle(input.puzzle_id)
            .await?
            .ok_or(PuzzleError::PuzzleNotFound)?;

        let verdict = verify_playable(&puzzle, &input.solution, &self.config)?;
        let attempt = Attempt::new(
            &puzzle,
            input.player_id,
            input.solution,
            duration,
            verdict.correct,
        );
        let policy = self.config.attempt_policy();

        let record = retry_when(&self.config.retry, PuzzleError::is_transient, || {
            self.attempt_repo.record_attempt(&attempt, policy)
        })
        .await
        .map_err(|err| {
            if err.is_transient() {
                tracing::warn!(puzzle_id = %input.puzzle_id, error = %err, "Submit retries exhausted");
                PuzzleError::Transient
            } else {
                err
            }
        })?;

        let limit = self.config.mismatch_report_limit;
        let output = match record {
            AttemptRecord::Rejected { rejection, state } => {
                tracing::warn!(
                    puzzle_id = %input.puzzle_id,
                    player_id = %input.player_id,
                    client_ip = ?input.client_ip,
                    reason = rejection.code(),
                    "Submission rejected"
                );
                SubmitAttemptOutput {
                    rejection: Some(rejection),
                    correct: false,
                    attempt_number: state.attempts_used(),
                    attempts_remaining: 0,
                    state,
                    xp_earned: 0,
                    mismatches: Vec::new(),
                    mismatch_count: 0,
                    stats: None,
                }
            }
            AttemptRecord::Recorded { state, stats } => {
                tracing::info!(
                    puzzle_id = %input.puzzle_id,
                    player_id = %input.player_id,
                    attempt_id = %attempt.id,
                    client_ip = ?input.client_ip,
                    correct = attempt.is_correct,
                    attempt_number = state.attempts_used(),
                    "Attempt recorded"
                );
                if let Some(stats) = &stats {
                    tracing::info!(
                        puzzle_id = %input.puzzle_id,
                        completions = stats.completions_count,
                        average_time = ?stats.average_time,
                        "Puzzle completed"
                    );
                }
                SubmitAttemptOutput {
                    rejection: None,
                    correct: attempt.is_correct,
                    attempt_number: state.attempts_used(),
                    attempts_remaining: state.attempts_remaining(policy),
                    state,
                    xp_earned: attempt.xp_earned,
                    mismatches: verdict.reported_mismatches(limit).to_vec(),
                    mismatch_count: verdict.mismatches.len(),
                    stats,
                }
            }
        };

        Ok(output)
    }
}
