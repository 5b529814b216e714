// src/error_recovery.rs
//! Retry with exponential backoff for API operations.
//!
//! This lives at the transport layer only: the crawl core never retries.
//! Errors that are not transient (not-found, auth, validation) surface
//! on the first attempt.

use crate::error::AppError;
use std::time::Duration;

/// Retries an async operation with exponential backoff.
///
/// Only errors reporting `is_retryable()` are retried; anything else is
/// returned immediately so callers can classify it.
pub async fn retry_with_backoff<F, T, Fut>(
    mut operation: F,
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, AppError>>,
{
    let mut delay = initial_delay;
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                last_error = Some(e);

                if attempt < max_attempts {
                    log::warn!("Attempt {} failed, retrying after {:?}", attempt, delay);
                    tokio::time::sleep(delay).await;

                    // Exponential backoff with cap
                    delay = std::cmp::min(delay * 2, max_delay);
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| AppError::InternalError {
        message: "Retry failed with no error".to_string(),
        source: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotionErrorCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn not_found() -> AppError {
        AppError::NotionService {
            code: NotionErrorCode::ObjectNotFound,
            message: "gone".to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        }
    }

    fn rate_limited() -> AppError {
        AppError::NotionService {
            code: NotionErrorCode::RateLimited,
            message: "slow down".to_string(),
            status: reqwest::StatusCode::TOO_MANY_REQUESTS,
        }
    }

    #[tokio::test]
    async fn non_retryable_errors_surface_immediately() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(not_found()) }
            },
            3,
            Duration::from_millis(1),
            Duration::from_millis(10),
        )
        .await;

        assert!(result.unwrap_err().is_not_found());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_errors_retry_until_success() {
        let attempts = AtomicU32::new(0);
        let result = retry_with_backoff(
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(rate_limited())
                    } else {
                        Ok(42)
                    }
                }
            },
            3,
            Duration::from_millis(1),
            Duration::from_millis(10),
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_attempts_return_last_error() {
        let result: Result<(), _> = retry_with_backoff(
            || async { Err(rate_limited()) },
            2,
            Duration::from_millis(1),
            Duration::from_millis(5),
        )
        .await;

        assert!(result.unwrap_err().is_retryable());
    }
}
