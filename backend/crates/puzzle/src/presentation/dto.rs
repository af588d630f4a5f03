//! API DTOs (Data Transfer Objects)

use crate::application::attempt_status::AttemptStatusOutput;
use crate::application::authoring::{CreatePuzzleInput, DetailsInput, UpdatePuzzleInput};
use crate::application::check_solution::CheckSolutionOutput;
use crate::application::queries::{PageOutput, PlayerAttemptsOutput, PuzzleStatsOutput};
use crate::application::submit_attempt::SubmitAttemptOutput;
use crate::domain::attempt_state::AttemptPolicy;
use crate::domain::entities::{Attempt, CompletionRecord, Puzzle};
use crate::domain::repository::{AttemptFilter, Page, PuzzleFilter};
use crate::domain::services::CellRef;
use crate::domain::statistics::PuzzleStats;
use crate::domain::value_objects::{Difficulty, PuzzleType};
use chrono::{DateTime, Utc};
use kernel::id::{AttemptId, PlayerId, PuzzleId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request for POST /api/puzzles/validate
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateContentRequest {
    #[serde(rename = "type", alias = "puzzleType")]
    pub puzzle_type: PuzzleType,
    pub content: Value,
    #[serde(default)]
    pub solution: Option<Value>,
}

/// Response for POST /api/puzzles/validate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateContentResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Request for POST /api/puzzles
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePuzzleRequest {
    pub title: String,
    #[serde(rename = "type", alias = "puzzleType")]
    pub puzzle_type: PuzzleType,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub xp_reward: Option<i64>,
    #[serde(default, alias = "timeLimit")]
    pub time_limit_minutes: Option<i64>,
    pub content: Value,
    #[serde(default)]
    pub solution: Option<Value>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl From<CreatePuzzleRequest> for CreatePuzzleInput {
    fn from(req: CreatePuzzleRequest) -> Self {
        Self {
            puzzle_type: req.puzzle_type,
            content: req.content,
            solution: req.solution,
            details: DetailsInput {
                title: Some(req.title),
                difficulty: req.difficulty,
                xp_reward: req.xp_reward,
                time_limit_minutes: req.time_limit_minutes,
            },
            is_active: req.is_active,
        }
    }
}

/// Request for PUT /api/puzzles/{id}
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePuzzleRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type", alias = "puzzleType")]
    pub puzzle_type: Option<PuzzleType>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub xp_reward: Option<i64>,
    #[serde(default, alias = "timeLimit")]
    pub time_limit_minutes: Option<i64>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub solution: Option<Value>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl From<UpdatePuzzleRequest> for UpdatePuzzleInput {
    fn from(req: UpdatePuzzleRequest) -> Self {
        Self {
            puzzle_type: req.puzzle_type,
            content: req.content,
            solution: req.solution,
            details: DetailsInput {
                title: req.title,
                difficulty: req.difficulty,
                xp_reward: req.xp_reward,
                time_limit_minutes: req.time_limit_minutes,
            },
            is_active: req.is_active,
        }
    }
}

/// Query for GET /api/puzzles
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPuzzlesQuery {
    #[serde(default, rename = "type")]
    pub puzzle_type: Option<PuzzleType>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

impl From<ListPuzzlesQuery> for PuzzleFilter {
    fn from(q: ListPuzzlesQuery) -> Self {
        Self {
            puzzle_type: q.puzzle_type,
            difficulty: q.difficulty,
            is_active: q.is_active,
            page: Page::new(q.limit, q.offset),
        }
    }
}

/// Query for GET /api/puzzles/me/attempts
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAttemptsQuery {
    #[serde(default)]
    pub is_correct: Option<bool>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

impl From<PlayerAttemptsQuery> for AttemptFilter {
    fn from(q: PlayerAttemptsQuery) -> Self {
        Self {
            is_correct: q.is_correct,
            page: Page::new(q.limit, q.offset),
        }
    }
}

/// Request for POST /api/puzzles/{id}/check
#[derive(Debug, Clone, Deserialize)]
pub struct CheckSolutionRequest {
    pub solution: Value,
}

/// Response for POST /api/puzzles/{id}/check
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSolutionResponse {
    pub correct: bool,
    pub mismatches: Vec<CellRef>,
    pub mismatch_count: usize,
}

impl From<CheckSolutionOutput> for CheckSolutionResponse {
    fn from(out: CheckSolutionOutput) -> Self {
        Self {
            correct: out.correct,
            mismatches: out.mismatches,
            mismatch_count: out.mismatch_count,
        }
    }
}

/// Request for POST /api/puzzles/{id}/attempts
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttemptRequest {
    pub solution: Value,
    /// Seconds spent on the attempt
    #[serde(alias = "timeTaken", alias = "durationSecs")]
    pub duration: i64,
}

/// Response for POST /api/puzzles/{id}/attempts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttemptResponse {
    pub accepted: bool,
    pub correct: bool,
    /// `already_completed` or `max_attempts_reached` when not accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    pub message: String,
    pub attempt_number: u32,
    pub attempts_remaining: u32,
    pub completed: bool,
    pub max_attempts_reached: bool,
    pub xp_earned: u32,
    pub mismatches: Vec<CellRef>,
    pub mismatch_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PuzzleStats>,
}

impl SubmitAttemptResponse {
    pub fn from_output(out: SubmitAttemptOutput, policy: AttemptPolicy) -> Self {
        let message = match (&out.rejection, out.correct) {
            (Some(rejection), _) => rejection.message(policy),
            (None, true) => format!("Correct! You earned {} XP.", out.xp_earned),
            (None, false) => format!("Incorrect. {} attempt(s) left.", out.attempts_remaining),
        };
        Self {
            accepted: out.accepted(),
            correct: out.correct,
            reason: out.rejection.map(|r| r.code()),
            message,
            attempt_number: out.attempt_number,
            attempts_remaining: out.attempts_remaining,
            completed: out.state.is_completed(),
            max_attempts_reached: out.state.is_exhausted(),
            xp_earned: out.xp_earned,
            mismatches: out.mismatches,
            mismatch_count: out.mismatch_count,
            stats: out.stats,
        }
    }
}

/// One attempt as listed back to its player
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResponse {
    pub id: AttemptId,
    pub puzzle_id: PuzzleId,
    pub duration: u32,
    pub is_correct: bool,
    pub xp_earned: u32,
    pub created_at: DateTime<Utc>,
}

impl From<Attempt> for AttemptResponse {
    fn from(a: Attempt) -> Self {
        Self {
            id: a.id,
            puzzle_id: a.puzzle_id,
            duration: a.duration.as_secs(),
            is_correct: a.is_correct,
            xp_earned: a.xp_earned,
            created_at: a.created_at,
        }
    }
}

/// Response for GET /api/puzzles/{id}/attempts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptStatusResponse {
    pub state: &'static str,
    pub attempt_number: u32,
    pub attempts_remaining: u32,
    pub max_attempts: u32,
    pub completed: bool,
    pub max_attempts_reached: bool,
    pub can_attempt: bool,
    pub attempts: Vec<AttemptResponse>,
}

impl From<AttemptStatusOutput> for AttemptStatusResponse {
    fn from(out: AttemptStatusOutput) -> Self {
        Self {
            state: out.state.code(),
            attempt_number: out.attempt_number,
            attempts_remaining: out.attempts_remaining,
            max_attempts: out.max_attempts,
            completed: out.completed(),
            max_attempts_reached: out.max_attempts_reached(),
            can_attempt: out.can_attempt(),
            attempts: out.attempts.into_iter().map(Into::into).collect(),
        }
    }
}

/// Full puzzle as returned to its author, including any stored solution
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleResponse {
    pub id: PuzzleId,
    pub title: String,
    #[serde(rename = "type")]
    pub puzzle_type: PuzzleType,
    pub difficulty: Difficulty,
    pub xp_reward: u32,
    pub time_limit_minutes: Option<u32>,
    pub content: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<Value>,
    pub is_active: bool,
    pub completions_count: u32,
    pub average_time: Option<f64>,
    pub created_by: PlayerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PuzzleResponse {
    /// Author view: normalized content and stored solution
    pub fn authoring(puzzle: &Puzzle) -> Self {
        Self {
            content: puzzle.content.to_json(),
            solution: puzzle.content.solution_json(),
            ..Self::player(puzzle)
        }
    }

    /// Player view: no grid solution and no crossword answers
    pub fn player(puzzle: &Puzzle) -> Self {
        Self {
            id: puzzle.id,
            title: puzzle.details.title.as_str().to_string(),
            puzzle_type: puzzle.puzzle_type(),
            difficulty: puzzle.details.difficulty,
            xp_reward: puzzle.details.xp_reward,
            time_limit_minutes: puzzle.details.time_limit_minutes,
            content: puzzle.content.public_json(),
            solution: None,
            is_active: puzzle.is_active,
            completions_count: puzzle.stats.completions_count,
            average_time: puzzle.stats.average_time,
            created_by: puzzle.created_by,
            created_at: puzzle.created_at,
            updated_at: puzzle.updated_at,
        }
    }
}

/// Listing entry, without content
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleSummaryResponse {
    pub id: PuzzleId,
    pub title: String,
    #[serde(rename = "type")]
    pub puzzle_type: PuzzleType,
    pub difficulty: Difficulty,
    pub xp_reward: u32,
    pub time_limit_minutes: Option<u32>,
    pub is_active: bool,
    pub completions_count: u32,
    pub average_time: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<Puzzle> for PuzzleSummaryResponse {
    fn from(p: Puzzle) -> Self {
        Self {
            id: p.id,
            puzzle_type: p.puzzle_type(),
            title: p.details.title.as_str().to_string(),
            difficulty: p.details.difficulty,
            xp_reward: p.details.xp_reward,
            time_limit_minutes: p.details.time_limit_minutes,
            is_active: p.is_active,
            completions_count: p.stats.completions_count,
            average_time: p.stats.average_time,
            created_at: p.created_at,
        }
    }
}

/// Paginated list envelope
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

impl<T, U: Into<T>> From<PageOutput<U>> for PageResponse<T> {
    fn from(page: PageOutput<U>) -> Self {
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummaryResponse {
    pub total_attempts: u64,
    pub correct_attempts: u64,
    pub incorrect_attempts: u64,
    pub total_xp: u64,
    pub average_time: Option<f64>,
}

/// Response for GET /api/puzzles/me/attempts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAttemptsResponse {
    pub attempts: PageResponse<AttemptResponse>,
    pub summary: PlayerSummaryResponse,
}

impl From<PlayerAttemptsOutput> for PlayerAttemptsResponse {
    fn from(out: PlayerAttemptsOutput) -> Self {
        let s = out.summary;
        Self {
            attempts: out.page.into(),
            summary: PlayerSummaryResponse {
                total_attempts: s.total_attempts,
                correct_attempts: s.correct_attempts,
                incorrect_attempts: s.incorrect_attempts(),
                total_xp: s.total_xp,
                average_time: s.average_time,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub player_id: PlayerId,
    pub duration: u32,
    pub completed_at: DateTime<Utc>,
}

impl From<CompletionRecord> for CompletionResponse {
    fn from(c: CompletionRecord) -> Self {
        Self {
            player_id: c.player_id,
            duration: c.duration.as_secs(),
            completed_at: c.completed_at,
        }
    }
}

/// Response for GET /api/puzzles/{id}/stats
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleStatsResponse {
    pub puzzle_id: PuzzleId,
    pub title: String,
    #[serde(rename = "type")]
    pub puzzle_type: PuzzleType,
    pub completions_count: u32,
    pub average_time: Option<f64>,
    pub fastest_time: Option<u32>,
    pub slowest_time: Option<u32>,
    pub recent_completions: Vec<CompletionResponse>,
}

impl From<PuzzleStatsOutput> for PuzzleStatsResponse {
    fn from(out: PuzzleStatsOutput) -> Self {
        Self {
            puzzle_id: out.puzzle.id,
            title: out.puzzle.details.title.as_str().to_string(),
            puzzle_type: out.puzzle.puzzle_type(),
            completions_count: out.stats.completions_count,
            average_time: out.stats.average_time,
            fastest_time: out.completions.fastest.map(|d| d.as_secs()),
            slowest_time: out.completions.slowest.map(|d| d.as_secs()),
            recent_completions: out.completions.recent.into_iter().map(Into::into).collect(),
        }
    }
}
