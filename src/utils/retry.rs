//! Retry utilities with exponential backoff for resilient API calls.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Configuration for retry behavior
///
/// `max_attempts` counts the first call, so `max_attempts = 1` means a
/// failed call is never repeated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Single attempt, no retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set the maximum number of attempts (at least one)
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Backoff delay before attempt `attempt + 1`, where `attempt` is 1-based.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.initial_delay.as_secs_f64()
            * self.backoff_multiplier.powf(attempt.saturating_sub(1) as f64);
        Duration::from_secs_f64(exp.min(self.max_delay.as_secs_f64()))
    }
}

/// Transient errors that should trigger a retry
#[derive(Debug, Clone, PartialEq)]
pub enum TransientError {
    /// Network connectivity issues
    Network,
    /// Rate limit exceeded (with optional retry-after seconds)
    RateLimit(Option<u64>),
    /// Server error (5xx)
    ServerError,
    /// Request timeout
    Timeout,
}

impl TransientError {
    /// Delay the server asked for, if any
    pub fn requested_delay(&self) -> Option<Duration> {
        match self {
            TransientError::RateLimit(Some(seconds)) => Some(Duration::from_secs(*seconds)),
            _ => None,
        }
    }
}

/// Errors that know whether repeating the call could help.
pub trait Retryable {
    /// `Some` when the failure is worth retrying.
    fn transient(&self) -> Option<TransientError>;
}

/// Execute an async operation with retry logic
///
/// Transient failures are retried with exponential backoff until
/// `config.max_attempts` is reached; permanent failures return at once.
/// A rate-limit error carrying a retry-after hint waits that long instead,
/// capped at `config.max_delay`.
pub async fn with_retry<T, E, F, Fut>(config: RetryConfig, mut operation: F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempts = 0;

    loop {
        attempts += 1;

        match operation().await {
            Ok(result) => {
                if attempts > 1 {
                    tracing::info!(
                        "Operation succeeded on attempt {} after {} transient failures",
                        attempts,
                        attempts - 1
                    );
                }
                return Ok(result);
            }
            Err(error) => {
                let Some(transient) = error.transient() else {
                    return Err(error);
                };

                if attempts >= config.max_attempts {
                    tracing::warn!("Operation failed after {} attempts: {}", attempts, error);
                    return Err(error);
                }

                let delay = transient
                    .requested_delay()
                    .map(|d| d.min(config.max_delay))
                    .unwrap_or_else(|| config.delay_for(attempts));

                tracing::debug!(
                    "Transient error on attempt {}: {:?}, retrying in {:?}",
                    attempts,
                    transient,
                    delay
                );

                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    enum TestError {
        Flaky,
        Fatal,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    impl Retryable for TestError {
        fn transient(&self) -> Option<TransientError> {
            match self {
                TestError::Flaky => Some(TransientError::Network),
                TestError::Fatal => None,
            }
        }
    }

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_retry_success_first_try() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<&str, TestError> = with_retry(fast_config(3), || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("success")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = with_retry(fast_config(4), || {
            let calls = Arc::clone(&calls);
            async move {
                let count = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if count < 3 {
                    Err(TestError::Flaky)
                } else {
                    Ok("success")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), TestError> = with_retry(fast_config(3), || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Flaky)
            }
        })
        .await;

        assert!(matches!(result, Err(TestError::Flaky)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_returns_permanent_error() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), TestError> = with_retry(fast_config(5), || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Fatal)
            }
        })
        .await;

        assert!(matches!(result, Err(TestError::Fatal)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_retry_makes_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), TestError> = with_retry(RetryConfig::no_retry(), || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Flaky)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_delays() {
        let config = RetryConfig {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        };
        assert_eq!(config.delay_for(1), Duration::from_secs(1));
        assert_eq!(config.delay_for(2), Duration::from_secs(2));
        assert_eq!(config.delay_for(3), Duration::from_secs(4));
        assert_eq!(config.delay_for(4), Duration::from_secs(5));
    }

    #[test]
    fn test_max_attempts_floor() {
        assert_eq!(RetryConfig::default().max_attempts(0).max_attempts, 1);
    }

    #[test]
    fn test_requested_delay() {
        assert_eq!(
            TransientError::RateLimit(Some(30)).requested_delay(),
            Some(Duration::from_secs(30))
        );
        assert_eq!(TransientError::Network.requested_delay(), None);
    }
}
