//! Domain Entities
//!
//! Core business entities for the puzzle domain.

use crate::domain::content::PuzzleContent;
use crate::domain::statistics::PuzzleStats;
use crate::domain::value_objects::{Difficulty, PuzzleType, SolveTime, Title};
use chrono::{DateTime, Utc};
use kernel::id::{AttemptId, PlayerId, PuzzleId};
use serde_json::Value;

pub const DEFAULT_XP_REWARD: u32 = 100;

/// Authoring metadata of a puzzle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleDetails {
    pub title: Title,
    pub difficulty: Difficulty,
    pub xp_reward: u32,
    pub time_limit_minutes: Option<u32>,
}

/// Puzzle entity
#[derive(Debug, Clone)]
pub struct Puzzle {
    pub id: PuzzleId,
    pub details: PuzzleDetails,
    pub content: PuzzleContent,
    pub is_active: bool,
    pub stats: PuzzleStats,
    pub created_by: PlayerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Puzzle {
    /// Create a new, active puzzle with no completions
    pub fn new(details: PuzzleDetails, content: PuzzleContent, created_by: PlayerId) -> Self {
        let now = Utc::now();
        Self {
            id: PuzzleId::new(),
            details,
            content,
            is_active: true,
            stats: PuzzleStats::default(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn puzzle_type(&self) -> PuzzleType {
        self.content.puzzle_type()
    }

    /// Wholesale replacement of content and solution
    pub fn replace_content(&mut self, content: PuzzleContent) {
        self.content = content;
        self.touch();
    }

    pub fn set_details(&mut self, details: PuzzleDetails) {
        self.details = details;
        self.touch();
    }

    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// One submission by a player. Never edited or deleted once written.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub id: AttemptId,
    pub puzzle_id: PuzzleId,
    pub player_id: PlayerId,
    pub solution: Value,
    pub duration: SolveTime,
    pub is_correct: bool,
    pub xp_earned: u32,
    pub created_at: DateTime<Utc>,
}

impl Attempt {
    /// Build the attempt for a verified submission. A correct attempt earns
    /// the puzzle's full XP reward.
    pub fn new(
        puzzle: &Puzzle,
        player_id: PlayerId,
        solution: Value,
        duration: SolveTime,
        is_correct: bool,
    ) -> Self {
        Self {
            id: AttemptId::new(),
            puzzle_id: puzzle.id,
            player_id,
            solution,
            duration,
            is_correct,
            xp_earned: if is_correct { puzzle.details.xp_reward } else { 0 },
            created_at: Utc::now(),
        }
    }
}

/// A correct attempt as listed in puzzle statistics
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRecord {
    pub player_id: PlayerId,
    pub duration: SolveTime,
    pub completed_at: DateTime<Utc>,
}

/// Extremes and most recent completions of one puzzle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionSummary {
    pub fastest: Option<SolveTime>,
    pub slowest: Option<SolveTime>,
    /// Newest first
    pub recent: Vec<CompletionRecord>,
}

impl CompletionSummary {
    /// Summary over correct attempts given newest first.
    pub fn from_correct_attempts<'a>(
        attempts: impl IntoIterator<Item = &'a Attempt>,
        recent_limit: usize,
    ) -> Self {
        let mut summary = Self::default();
        for attempt in attempts.into_iter().filter(|a| a.is_correct) {
            summary.fastest = Some(summary.fastest.map_or(attempt.duration, |f| f.min(attempt.duration)));
            summary.slowest = Some(summary.slowest.map_or(attempt.duration, |s| s.max(attempt.duration)));
            if summary.recent.len() < recent_limit {
                summary.recent.push(CompletionRecord {
                    player_id: attempt.player_id,
                    duration: attempt.duration,
                    completed_at: attempt.created_at,
                });
            }
        }
        summary
    }
}

/// Totals over all of a player's attempts
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerSummary {
    pub total_attempts: u64,
    pub correct_attempts: u64,
    pub total_xp: u64,
    /// Mean duration over all attempts, in seconds
    pub average_time: Option<f64>,
}

impl PlayerSummary {
    pub fn incorrect_attempts(&self) -> u64 {
        self.total_attempts.saturating_sub(self.correct_attempts)
    }

    pub fn from_attempts<'a>(attempts: impl IntoIterator<Item = &'a Attempt>) -> Self {
        let mut summary = Self::default();
        let mut total_secs = 0u64;
        for attempt in attempts {
            summary.total_attempts += 1;
            if attempt.is_correct {
                summary.correct_attempts += 1;
            }
            summary.total_xp += u64::from(attempt.xp_earned);
            total_secs += u64::from(attempt.duration.as_secs());
        }
        if summary.total_attempts > 0 {
            summary.average_time = Some(total_secs as f64 / summary.total_attempts as f64);
        }
        summary
    }
}
