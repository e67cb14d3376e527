//! Reusable retry policy with exponential backoff.
//!
//! Both clients go through the same policy instead of duplicating a retry
//! loop per call site. Only errors that report `is_retryable()` are retried;
//! parse and schema failures propagate on the first attempt.

use crate::error::{Result, ThreatContextError};
use std::time::{Duration, Instant};

/// Retry policy: attempt ceiling plus an exponential backoff schedule.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` counts the first try; it is clamped
    /// to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Policy derived from an engine configuration.
    #[must_use]
    pub fn from_config(config: &crate::config::EngineConfig) -> Self {
        Self::new(config.max_attempts, config.backoff_base, config.backoff_cap)
    }

    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Backoff delay before the given retry attempt (1-based).
    fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(1u32 << shift);
        delay.min(self.max_delay)
    }

    /// Run `op`, retrying transient failures with backoff.
    ///
    /// An optional `deadline` bounds the total time spent including backoff
    /// sleeps; when it would be exceeded, the last error is returned early
    /// rather than sleeping past it.
    pub fn run<T, F>(&self, what: &str, deadline: Option<Instant>, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut last_error: Option<ThreatContextError> = None;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                let delay = self.delay_for(attempt - 1);
                if let Some(deadline) = deadline {
                    if Instant::now() + delay >= deadline {
                        tracing::debug!(what, attempt, "deadline reached, giving up retries");
                        break;
                    }
                }
                tracing::debug!(what, attempt, ?delay, "retrying after backoff");
                std::thread::sleep(delay);
            }

            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    tracing::debug!(what, attempt, error = %err, "transient failure");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ThreatContextError::config(format!("retry of '{what}' produced no result"))
        }))
    }
}
