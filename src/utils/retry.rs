//! Retry utilities with exponential backoff for archive requests.
//!
//! Only the HTTP transport uses these. The configured default is a single
//! attempt, so callers of the data access layer see failures immediately
//! unless a retry policy was opted into.

use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::config::RetrySettings;
use crate::transport::ArchiveError;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum total time to spend on retries (including delays)
    pub max_total_time: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            max_total_time: Duration::from_secs(120),
        }
    }
}

impl RetryConfig {
    /// Set the maximum number of attempts
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Delay before the given (1-based) retry attempt
    fn delay_for(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return self.initial_delay;
        }
        let exp_delay = self.initial_delay.as_secs_f64()
            * self.backoff_multiplier.powf(attempt as f64 - 1.0);
        Duration::from_secs_f64(exp_delay.min(self.max_delay.as_secs_f64()))
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            backoff_multiplier: settings.backoff_multiplier,
            ..Self::default()
        }
    }
}

/// Transient errors that should trigger a retry
#[derive(Debug, Clone, PartialEq)]
pub enum TransientError {
    /// Network connectivity issues
    Network,
    /// Server error (5xx)
    ServerError(u16),
    /// Too many requests (429)
    TooManyRequests,
}

impl TransientError {
    /// Check if an ArchiveError represents a transient error
    pub fn from_archive_error(err: &ArchiveError) -> Option<Self> {
        match err {
            ArchiveError::Network(_) => Some(TransientError::Network),
            ArchiveError::NoSuchResource { status, .. } | ArchiveError::ApiServer { status, .. } => {
                match *status {
                    429 => Some(TransientError::TooManyRequests),
                    500..=599 => Some(TransientError::ServerError(*status)),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Execute an async operation with retry logic
///
/// Permanent errors (4xx, parse and validation failures) return immediately.
pub async fn with_retry<T, F, Fut>(config: RetryConfig, operation: F) -> Result<T, ArchiveError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, ArchiveError>>,
{
    let mut attempts = 0;
    let mut total_elapsed = Duration::ZERO;
    let mut operation = operation;

    loop {
        attempts += 1;

        match timeout(config.max_total_time, operation()).await {
            Ok(Ok(result)) => {
                if attempts > 1 {
                    tracing::info!(
                        "Request succeeded on attempt {} after {} transient failures",
                        attempts,
                        attempts - 1
                    );
                }
                return Ok(result);
            }
            Ok(Err(error)) => {
                let Some(transient) = TransientError::from_archive_error(&error) else {
                    return Err(error);
                };

                let delay = config.delay_for(attempts);
                total_elapsed += delay;

                if attempts >= config.max_attempts || total_elapsed >= config.max_total_time {
                    if config.max_attempts > 1 {
                        tracing::warn!(
                            "Request failed after {} attempts (total elapsed: {:?}): {}",
                            attempts,
                            total_elapsed,
                            error
                        );
                    }
                    return Err(error);
                }

                tracing::debug!(
                    "Transient error on attempt {}: {:?}, retrying in {:?}",
                    attempts,
                    transient,
                    delay
                );
                sleep(delay).await;
            }
            Err(_) => {
                let error = ArchiveError::Network("Operation timed out".to_string());
                if attempts >= config.max_attempts {
                    return Err(error);
                }
                total_elapsed += config.initial_delay;
                sleep(config.initial_delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn fast_config(attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts: attempts,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            backoff_multiplier: 2.0,
            max_total_time: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_single_attempt_by_default() {
        let call_count = Rc::new(RefCell::new(0));

        let result: Result<(), ArchiveError> = {
            let call_count = call_count.clone();
            with_retry(RetryConfig::default(), move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    Err(ArchiveError::Network("refused".to_string()))
                }
            })
        }
        .await;

        assert!(result.is_err());
        assert_eq!(*call_count.borrow(), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_server_errors() {
        let call_count = Rc::new(RefCell::new(0));

        let result = {
            let call_count = call_count.clone();
            with_retry(fast_config(4), move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    if *call_count.borrow() < 3 {
                        Err(ArchiveError::NoSuchResource {
                            endpoint: "record".to_string(),
                            detail: "search".to_string(),
                            status: 503,
                        })
                    } else {
                        Ok("page")
                    }
                }
            })
        }
        .await;

        assert_eq!(result.unwrap(), "page");
        assert_eq!(*call_count.borrow(), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_permanent() {
        let call_count = Rc::new(RefCell::new(0));

        let result: Result<(), ArchiveError> = {
            let call_count = call_count.clone();
            with_retry(fast_config(5), move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    Err(ArchiveError::NoSuchResource {
                        endpoint: "record".to_string(),
                        detail: "id 9".to_string(),
                        status: 404,
                    })
                }
            })
        }
        .await;

        assert!(matches!(
            result,
            Err(ArchiveError::NoSuchResource { status: 404, .. })
        ));
        assert_eq!(*call_count.borrow(), 1);
    }

    #[test]
    fn test_transient_error_detection() {
        let network = ArchiveError::Network("connection reset".to_string());
        assert_eq!(
            TransientError::from_archive_error(&network),
            Some(TransientError::Network)
        );

        let throttled = ArchiveError::ApiServer {
            target: "asset".to_string(),
            status: 429,
        };
        assert_eq!(
            TransientError::from_archive_error(&throttled),
            Some(TransientError::TooManyRequests)
        );

        let parse = ArchiveError::Parse("invalid json".to_string());
        assert!(TransientError::from_archive_error(&parse).is_none());
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = fast_config(10);
        assert_eq!(config.delay_for(1), Duration::from_millis(5));
        assert_eq!(config.delay_for(2), Duration::from_millis(10));
        assert_eq!(config.delay_for(8), Duration::from_millis(20));
    }
}
