use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::SourceError;
use crate::source::{QuestionSource, RawQuestion};

/// How fetch failures are retried: an explicit loop with exponential
/// backoff, doubling from `initial_delay` up to `max_delay`. With
/// `max_attempts` unset the loop runs until the source recovers.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: Option<u32>,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay to sleep after the given failed attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self.initial_delay.saturating_mul(2u32.saturating_pow(exponent));
        delay.min(self.max_delay)
    }

    fn attempts_exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempt >= max)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: (config.max_attempts > 0).then_some(config.max_attempts),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

/// Fetches one round from the source, retrying failures per the policy.
/// Returns the last error once attempts are exhausted.
pub async fn fetch_round_with_retry(
    source: &dyn QuestionSource,
    policy: &RetryPolicy,
) -> Result<Vec<RawQuestion>, SourceError> {
    let mut attempt = 1u32;
    loop {
        match source.fetch_round().await {
            Ok(records) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Question fetch succeeded after retries");
                }
                return Ok(records);
            }
            Err(err) if policy.attempts_exhausted(attempt) => {
                tracing::error!(
                    attempt,
                    error = %err,
                    "Question fetch failed, no attempts left"
                );
                return Err(err);
            }
            Err(err) => {
                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    attempt,
                    delay.ms = delay.as_millis() as u64,
                    error = %err,
                    "Question fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
