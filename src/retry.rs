use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Delay schedule between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    /// Retry immediately
    None,
    /// Wait the same number of milliseconds before every retry
    Fixed { delay_ms: u64 },
    /// Double the delay each retry, starting at `base_ms`, capped at `max_ms`
    Exponential { base_ms: u64, max_ms: u64 },
}

impl Backoff {
    /// Delay before retry number `retry` (1 for the first retry)
    pub fn delay(&self, retry: u32) -> Duration {
        match *self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            Backoff::Exponential { base_ms, max_ms } => {
                let factor = 2u64.saturating_pow(retry.saturating_sub(1));
                Duration::from_millis(base_ms.saturating_mul(factor).min(max_ms))
            }
        }
    }
}

/// How often a fallible operation is attempted and how long to wait between
/// attempts. The default makes a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first; values below 1 behave as 1
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff")]
    pub backoff: Backoff,
}

fn default_max_attempts() -> u32 {
    1
}

fn default_backoff() -> Backoff {
    Backoff::None
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::no_retry()
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff: default_backoff(),
        }
    }

    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Runs `op` until it succeeds or the attempts are used up, returning the
    /// last error.
    pub async fn run<T, E, F, Fut>(&self, what: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    let delay = self.backoff.delay(attempt);
                    ::log::warn!(
                        "Attempt {}/{} for {} failed: {}; retrying in {:?}",
                        attempt,
                        attempts,
                        what,
                        e,
                        delay
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
