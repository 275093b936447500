//! Retry with exponential backoff
//!
//! Used by the fallback executor for same-provider retries. `max_attempts`
//! counts every call, the first one included.

use crate::settings::FallbackSettings;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry behaviour for one provider
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, at least 1
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Delay ceiling
    pub max_delay: Duration,
    /// Growth factor per attempt
    pub backoff_multiplier: f64,
    /// Add up to 25% random jitter
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from_settings(&FallbackSettings::default())
    }
}

impl RetryConfig {
    /// Derive from fallback settings
    #[must_use]
    pub fn from_settings(settings: &FallbackSettings) -> Self {
        Self {
            max_attempts: settings.max_retries_per_provider.max(1),
            initial_delay: Duration::from_millis(settings.retry_initial_delay_ms),
            max_delay: Duration::from_millis(settings.retry_max_delay_ms),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Set total attempts (clamped to at least 1)
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the first delay
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the delay ceiling
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Enable or disable jitter
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay after the given failed attempt (1-based)
    pub(crate) fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let base_ms = self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let delay_ms = base_ms.min(self.max_delay.as_millis() as f64) as u64;

        if self.jitter {
            Duration::from_millis(delay_ms + jitter_up_to(delay_ms / 4))
        } else {
            Duration::from_millis(delay_ms)
        }
    }
}

// Sub-second clock noise; good enough to de-synchronise retries.
fn jitter_up_to(max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_nanos()) % max)
        .unwrap_or(0)
}

/// Last error plus how many attempts were made
#[derive(Debug)]
pub struct RetryError<E> {
    /// Error from the final attempt
    pub last_error: E,
    /// Attempts made
    pub attempts: u32,
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed after {} attempt(s): {}", self.attempts, self.last_error)
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryError<E> {}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` is reached
///
/// `operation` receives the 1-based attempt number.
pub async fn retry_with_backoff<T, E, F, Fut, R>(
    config: &RetryConfig,
    mut operation: F,
    is_retryable: R,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts && is_retryable(&e) => {
                let delay = config.delay_after(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Attempt failed, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(RetryError {
                    last_error: e,
                    attempts: attempt,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast(attempts: u32) -> RetryConfig {
        RetryConfig::default()
            .with_max_attempts(attempts)
            .with_initial_delay(Duration::from_millis(1))
            .with_jitter(false)
    }

    #[test]
    fn test_from_settings() {
        let settings = FallbackSettings {
            max_retries_per_provider: 0,
            retry_initial_delay_ms: 100,
            retry_max_delay_ms: 300,
            ..FallbackSettings::default()
        };
        let config = RetryConfig::from_settings(&settings).with_jitter(false);
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.delay_after(1), Duration::from_millis(100));
        assert_eq!(config.delay_after(2), Duration::from_millis(200));
        assert_eq!(config.delay_after(3), Duration::from_millis(300));
    }

    #[test]
    fn test_jitter_stays_within_quarter() {
        let config = RetryConfig::default()
            .with_initial_delay(Duration::from_millis(400))
            .with_max_delay(Duration::from_secs(1));
        let delay = config.delay_after(1);
        assert!(delay >= Duration::from_millis(400));
        assert!(delay < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<u32, RetryError<&str>> = retry_with_backoff(
            &fast(3),
            |attempt| {
                let c = counter.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    if attempt < 3 {
                        Err("transient")
                    } else {
                        Ok(attempt)
                    }
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stops_at_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let err = retry_with_backoff(
            &fast(2),
            |_| {
                let c = counter.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>("503 unavailable")
                }
            },
            |_| true,
        )
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 2);
        assert_eq!(err.last_error, "503 unavailable");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let err = retry_with_backoff(
            &fast(5),
            |_| {
                let c = counter.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>("401 unauthorized")
                }
            },
            |_| false,
        )
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
