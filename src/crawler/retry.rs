//! Bounded retry with exponential backoff around a page fetch

use crate::crawler::PageFetcher;
use crate::FetchError;
use std::time::Duration;

/// How many times a fetch is attempted and how long to wait in between
///
/// After failed attempt `n` (counted from 1) the wait is `base_delay * 2^n`,
/// so the defaults wait 2s and then 4s. There is no jitter and every failure
/// kind is retried the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is raised to at least one
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Backoff to sleep after failed attempt `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Fetches a URL, retrying failed attempts with exponential backoff
///
/// Attempts run sequentially. When the last attempt fails the result is
/// [`FetchError::RetriesExhausted`] carrying the URL, the attempt count and the
/// final underlying error.
pub async fn fetch_with_retry<F>(
    fetcher: &F,
    url: &str,
    policy: &RetryPolicy,
) -> Result<String, FetchError>
where
    F: PageFetcher,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        tracing::debug!("Attempting fetch {}/{} for: {}", attempt, max_attempts, url);

        match fetcher.fetch(url).await {
            Ok(body) => return Ok(body),
            Err(e) => {
                tracing::warn!(
                    "Fetch attempt {}/{} failed for {}: {}",
                    attempt,
                    max_attempts,
                    url,
                    e
                );

                if attempt >= max_attempts {
                    return Err(FetchError::RetriesExhausted {
                        url: url.to_string(),
                        attempts: max_attempts,
                        last: Box::new(e),
                    });
                }

                let wait = policy.backoff(attempt);
                tracing::debug!("Waiting {:?} before retrying {}", wait, url);
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
        }
    }
}
