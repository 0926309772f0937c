//! Retry policy with exponential backoff

use async_trait::async_trait;
use log::{debug, warn};
use std::future::Future;
use std::time::Duration;

/// Something that can pause the current task.
/// Production code sleeps on tokio; tests record the delays.
#[async_trait]
pub trait Sleeper: Send + Sync
{   async fn sleep(&self, delay: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper
{   async fn sleep(&self, delay: Duration)
    {   tokio::time::sleep(delay).await
    }
}

/// Retry policy for transient failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy
{   pub max_retries: usize
  , pub backoff_base: Duration
}

impl RetryPolicy
{   /// Create a new retry policy
    pub fn new(
      max_retries: usize
    , backoff_base_ms: u64
    ) -> Self
    {   RetryPolicy
        {   max_retries
          , backoff_base: Duration::from_millis(backoff_base_ms)
        }
    }

    /// Backoff before the attempt following failed attempt
    /// `attempt` (0-indexed): `base * 2^attempt`.
    pub fn backoff_for_attempt(
      &self
    , attempt: usize
    ) -> Duration
    {   exponential_backoff(self.backoff_base, attempt)
    }

    /// Number of attempts this policy allows; never zero.
    pub fn max_attempts(&self) -> usize
    {   self.max_retries.max(1)
    }

    /// Run `operation` until it succeeds, fails permanently,
    /// or the attempt budget is spent.
    pub async fn run<F, Fut, T>(
      &self
    , operation_name: &str
    , sleeper: &dyn Sleeper
    , mut operation: F
    ) -> Result<T, crate::error::Error>
    where
      F: FnMut() -> Fut
    , Fut: Future<Output = Result<T, crate::error::Error>>
    {   let mut state = RetryState::new(self);

        loop
        {   match operation().await
            {   Ok(value) => {
                  if state.attempt > 0
                  {   debug!(
                        "{}: succeeded on attempt {}",
                        operation_name, state.attempt + 1
                      );
                  }
                  return Ok(value);
                }
              , Err(e) if !e.is_transient() => {
                  debug!("{}: permanent error: {}", operation_name, e);
                  return Err(e);
                }
              , Err(e) => {
                  match state.next_delay()
                  {   Some(delay) => {
                        warn!(
                          "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                          operation_name,
                          state.attempt,
                          state.max_attempts,
                          e,
                          delay.as_millis()
                        );
                        sleeper.sleep(delay).await;
                      }
                    , None => {
                        warn!(
                          "{}: giving up after {} attempts: {}",
                          operation_name, state.attempt, e
                        );
                        return Err(
                          crate::error::Error::RetriesExhausted
                          {   attempts: state.attempt
                            , last: Box::new(e)
                          }
                        );
                      }
                  }
                }
            }
        }
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::new(3, 500)
    }
}

impl From<&crate::config::RetryConfig> for RetryPolicy
{   fn from(config: &crate::config::RetryConfig) -> Self
    {   RetryPolicy::new(config.max_retries, config.backoff_base_ms)
    }
}

/// Book-keeping for one retried call
#[derive(Debug, Clone)]
pub struct RetryState
{   /// Attempts made so far
    pub attempt: usize
  , pub max_attempts: usize
  , pub backoff_base: Duration
}

impl RetryState
{   pub fn new(policy: &RetryPolicy) -> Self
    {   RetryState
        {   attempt: 0
          , max_attempts: policy.max_attempts()
          , backoff_base: policy.backoff_base
        }
    }

    /// Record a failed attempt. Returns the delay before the
    /// next one, or `None` once the budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration>
    {   let failed = self.attempt;
        self.attempt += 1;
        if self.attempt >= self.max_attempts
        {   return None;
        }
        Some(exponential_backoff(self.backoff_base, failed))
    }
}

/// `base * 2^attempt`, saturating instead of overflowing
fn exponential_backoff(base: Duration, attempt: usize) -> Duration
{   let factor = u32::try_from(attempt)
      .ok()
      .and_then(|exp| 2u32.checked_pow(exp))
      .unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}
