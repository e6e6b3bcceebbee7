use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing;

use crate::DatabaseError;

/// How many times to retry a failed write and how long to wait before the first retry.
/// The delay doubles after every failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    pub fn no_retry() -> Self {
        Self::new(0, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(50))
    }
}

pub type BoxedAttempt<T> = Pin<Box<dyn Future<Output = Result<T, DatabaseError>> + Send>>;

pub async fn retry_with_backoff<F, T>(
    what: &str,
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, DatabaseError>
where
    F: FnMut() -> BoxedAttempt<T>,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < policy.max_retries => {
                attempt += 1;
                tracing::warn!(
                    "{} attempt {} failed: {}. Retrying in {:?}...",
                    what,
                    attempt,
                    e,
                    delay
                );
                sleep(delay).await;
                delay *= 2;
            }
            Err(e) => {
                return Err(DatabaseError::RetryExhausted {
                    attempts: attempt + 1,
                    last_error: e.to_string(),
                })
            }
        }
    }
}
