//! Application Configuration
//!
//! Configuration for the puzzle application layer.

use crate::domain::attempt_state::{AttemptPolicy, DEFAULT_MAX_ATTEMPTS};
use platform::client::PLAYER_ID_HEADER;
use platform::retry::RetryPolicy;
use std::str::FromStr;
use std::time::Duration;

/// Puzzle application configuration
#[derive(Debug, Clone)]
pub struct PuzzleConfig {
    /// Attempts allowed per (puzzle, player) pair
    pub max_attempts: u32,
    /// Mismatched cells surfaced to the player per check
    pub mismatch_report_limit: usize,
    /// Verify grid puzzles without a stored solution by the rules alone
    pub allow_constraint_fallback: bool,
    /// Retry policy for the submit transaction
    pub retry: RetryPolicy,
    /// Header carrying the authenticated player id
    pub player_id_header: String,
    /// Recent completions listed in puzzle statistics
    pub recent_completions: usize,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            mismatch_report_limit: 5,
            allow_constraint_fallback: true,
            retry: RetryPolicy::default(),
            player_id_header: PLAYER_ID_HEADER.to_string(),
            recent_completions: 10,
        }
    }
}

impl PuzzleConfig {
    /// Read overrides from the environment
    ///
    /// Unset variables keep their defaults; unparsable ones are logged and
    /// ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: env_or("PUZZLE_MAX_ATTEMPTS", defaults.max_attempts),
            mismatch_report_limit: env_or(
                "PUZZLE_MISMATCH_REPORT_LIMIT",
                defaults.mismatch_report_limit,
            ),
            allow_constraint_fallback: env_or(
                "PUZZLE_ALLOW_CONSTRAINT_FALLBACK",
                defaults.allow_constraint_fallback,
            ),
            retry: defaults
                .retry
                .with_max_attempts(env_or("PUZZLE_TX_RETRIES", RetryPolicy::default().max_attempts)),
            player_id_header: std::env::var("PUZZLE_PLAYER_ID_HEADER")
                .map(|h| h.trim().to_ascii_lowercase())
                .ok()
                .filter(|h| !h.is_empty())
                .unwrap_or(defaults.player_id_header),
            recent_completions: defaults.recent_completions,
        }
    }

    /// Config for tests: no backoff between retries
    pub fn without_retry_delay() -> Self {
        Self {
            retry: RetryPolicy {
                max_attempts: 3,
                base_backoff: Duration::ZERO,
                max_backoff: Duration::ZERO,
                jitter_max: None,
            },
            ..Default::default()
        }
    }

    pub fn attempt_policy(&self) -> AttemptPolicy {
        AttemptPolicy::new(self.max_attempts)
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Debug,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = ?default, "Invalid config value, using default");
            default
        }),
        Err(_) => default,
    }
}
