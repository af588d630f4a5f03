//! Bounded async retry
//!
//! Re-runs a fallible async operation with exponential backoff, but only
//! while the caller-supplied predicate classifies the error as transient.

use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of runs, including the first one
    pub max_attempts: usize,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub jitter_max: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(20),
            max_backoff: Duration::from_millis(500),
            jitter_max: Some(Duration::from_millis(50)),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

/// Run `f` until it succeeds, fails with a non-transient error, or the
/// attempt budget is spent. The last error is returned unchanged.
pub async fn retry_when<F, Fut, T, E, P>(policy: &RetryPolicy, is_transient: P, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempts_left = policy.max_attempts.max(1);
    let mut backoff = policy.base_backoff;

    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                attempts_left = attempts_left.saturating_sub(1);
                if attempts_left == 0 || !is_transient(&e) {
                    return Err(e);
                }

                let jitter = match policy.jitter_max {
                    Some(max) if !max.is_zero() => {
                        let max_ms = max.as_millis() as u64;
                        Duration::from_millis(rand::random::<u64>() % (max_ms + 1))
                    }
                    _ => Duration::ZERO,
                };

                tracing::warn!(
                    attempts_left,
                    backoff_ms = (backoff + jitter).as_millis() as u64,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(backoff + jitter).await;

                backoff = std::cmp::min(backoff * 2, policy.max_backoff);
            }
        }
    }
}
