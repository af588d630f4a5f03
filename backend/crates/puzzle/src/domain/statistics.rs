//! Statistics Updater
//!
//! Puzzle-level aggregates, maintained with the streaming-mean recurrence.

use crate::domain::value_objects::SolveTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleStats {
    pub completions_count: u32,
    /// Mean duration of accepted completions, in seconds
    pub average_time: Option<f64>,
}

impl PuzzleStats {
    pub fn new(completions_count: u32, average_time: Option<f64>) -> Self {
        Self {
            completions_count,
            average_time,
        }
    }

    /// Aggregates after one more accepted completion taking `duration`.
    pub fn record_completion(&self, duration: SolveTime) -> Self {
        let d = f64::from(duration);
        let completions_count = self.completions_count.saturating_add(1);
        let average_time = match self.average_time {
            None => d,
            Some(avg) => {
                (avg * f64::from(self.completions_count) + d) / f64::from(completions_count)
            }
        };
        Self {
            completions_count,
            average_time: Some(average_time),
        }
    }
}
