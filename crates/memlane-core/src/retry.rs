//! Bounded retry with exponential backoff.
//!
//! One policy object, one helper. Transport sweeps, explorer page fetches and
//! directory reads all go through `with_retry` instead of hand-rolling loops.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use memlane_contracts::error::{MemlaneError, MemlaneResult};

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff_factor: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no waiting.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            backoff_factor: 1.0,
            max_delay: Duration::ZERO,
        }
    }

    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Self::default()
        }
    }

    /// Delay before attempt number `attempt` (0-based). Attempt 0 never waits.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let millis = self.base_delay.as_millis() as f64 * self.backoff_factor.powi(exponent);
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the policy's attempts run out. The closure receives the 0-based attempt.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, operation: F) -> MemlaneResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = MemlaneResult<T>>,
{
    retry_when(policy, label, MemlaneError::is_retryable, operation).await
}

/// Like `with_retry`, with a caller-supplied predicate deciding which errors
/// earn another attempt.
pub async fn retry_when<T, F, Fut, P>(
    policy: &RetryPolicy,
    label: &str,
    should_retry: P,
    mut operation: F,
) -> MemlaneResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = MemlaneResult<T>>,
    P: Fn(&MemlaneError) -> bool,
{
    let attempts = policy.attempts();
    let mut attempt = 0;
    loop {
        let delay = policy.delay_for_attempt(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt + 1 < attempts && should_retry(&err) => {
                debug!(operation = label, attempt, error = %err, "retrying");
                attempt += 1;
            }
            Err(err) => {
                if attempt > 0 {
                    warn!(operation = label, attempts = attempt + 1, error = %err, "giving up");
                }
                return Err(err);
            }
        }
    }
}
