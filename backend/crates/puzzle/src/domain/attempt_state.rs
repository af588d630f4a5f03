//! Attempt Tracker
//!
//! The state of a (puzzle, player) pair is derived from its attempt log,
//! never stored.

use serde::Serialize;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPolicy {
    max_attempts: u32,
}

impl AttemptPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Fresh,
    InProgress { attempts: u32 },
    Exhausted { attempts: u32 },
    /// Terminal: one attempt is correct
    Completed { attempts: u32 },
}

/// Why a submission was turned away. No attempt is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptRejection {
    AlreadyCompleted,
    MaxAttemptsReached,
}

impl AttemptRejection {
    pub const fn code(&self) -> &'static str {
        match self {
            AttemptRejection::AlreadyCompleted => "already_completed",
            AttemptRejection::MaxAttemptsReached => "max_attempts_reached",
        }
    }

    pub fn message(&self, policy: AttemptPolicy) -> String {
        match self {
            AttemptRejection::AlreadyCompleted => {
                "You have already successfully completed this puzzle!".to_string()
            }
            AttemptRejection::MaxAttemptsReached => format!(
                "Maximum attempts ({}) reached for this puzzle.",
                policy.max_attempts()
            ),
        }
    }
}

impl AttemptState {
    pub fn from_log(attempts: u32, has_correct: bool, policy: AttemptPolicy) -> Self {
        if has_correct {
            AttemptState::Completed { attempts }
        } else if attempts == 0 {
            AttemptState::Fresh
        } else if attempts >= policy.max_attempts() {
            AttemptState::Exhausted { attempts }
        } else {
            AttemptState::InProgress { attempts }
        }
    }

    /// Whether a new submission may be recorded. Completion is checked
    /// before exhaustion.
    pub fn admit(&self) -> Result<(), AttemptRejection> {
        match self {
            AttemptState::Completed { .. } => Err(AttemptRejection::AlreadyCompleted),
            AttemptState::Exhausted { .. } => Err(AttemptRejection::MaxAttemptsReached),
            AttemptState::Fresh | AttemptState::InProgress { .. } => Ok(()),
        }
    }

    /// State after recording one more attempt with the given verdict.
    pub fn record(&self, correct: bool, policy: AttemptPolicy) -> Self {
        Self::from_log(self.attempts_used() + 1, correct, policy)
    }

    pub fn attempts_used(&self) -> u32 {
        match self {
            AttemptState::Fresh => 0,
            AttemptState::InProgress { attempts }
            | AttemptState::Exhausted { attempts }
            | AttemptState::Completed { attempts } => *attempts,
        }
    }

    pub fn attempts_remaining(&self, policy: AttemptPolicy) -> u32 {
        policy.max_attempts().saturating_sub(self.attempts_used())
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, AttemptState::Completed { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, AttemptState::Exhausted { .. })
    }

    pub fn can_attempt(&self) -> bool {
        self.admit().is_ok()
    }

    pub const fn code(&self) -> &'static str {
        match self {
            AttemptState::Fresh => "fresh",
            AttemptState::InProgress { .. } => "in_progress",
            AttemptState::Exhausted { .. } => "exhausted",
            AttemptState::Completed { .. } => "completed",
        }
    }
}
