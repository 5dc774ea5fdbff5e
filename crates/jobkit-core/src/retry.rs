//! Bounded retry for remote calls.

use std::time::Duration;

use tracing::warn;

use crate::{
    ClientError,
    ClientResult,
};

/// Retry policy configuration
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: usize,
    /// Initial delay between attempts
    pub initial_delay: Duration,
    /// Whether to double the delay after each failed attempt
    pub exponential_backoff: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            exponential_backoff: true,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, initial_delay: Duration, exponential_backoff: bool) -> Self {
        Self {
            max_attempts,
            initial_delay,
            exponential_backoff,
        }
    }

    /// Runs `operation`, retrying transport-level failures.
    ///
    /// Only `NetworkError` and `ApiError` are retried; everything else
    /// (bad configuration, missing jobs, auth failures) is returned on
    /// the first attempt.
    pub async fn retry<F, Fut, T>(&self, operation: F) -> ClientResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = ClientResult<T>>,
    {
        let mut delay = self.initial_delay;
        let mut last_error = None;

        for attempt in 0..self.max_attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < self.max_attempts - 1 => match &e {
                    ClientError::NetworkError(_) | ClientError::ApiError(_) => {
                        warn!(attempt = attempt + 1, error = %e, "retrying after error");
                        last_error = Some(e);
                        tokio::time::sleep(delay).await;
                        if self.exponential_backoff {
                            delay *= 2;
                        }
                        continue;
                    }
                    _ => return Err(e),
                },
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ClientError::NetworkError("Max retries exceeded".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_retry_success() {
        let policy = RetryPolicy::default();
        let result = policy.retry(|| async { Ok::<_, ClientError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retry_eventual_success() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), false);
        let attempts = std::cell::Cell::new(0);

        let result = policy
            .retry(|| async {
                let count = attempts.get() + 1;
                attempts.set(count);
                if count < 2 {
                    Err(ClientError::NetworkError("Temporary failure".to_string()))
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.get(), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_error_returned_immediately() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), false);
        let attempts = std::cell::Cell::new(0);

        let result: ClientResult<()> = policy
            .retry(|| async {
                attempts.set(attempts.get() + 1);
                Err(ClientError::InvalidConfig("bad server url".to_string()))
            })
            .await;

        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
        assert_eq!(attempts.get(), 1);
    }
}
