//! Retrying upstream fetch.
//!
//! # Responsibilities
//! - Execute an outbound request up to `max_retries + 1` times
//! - Enforce a per-attempt timeout
//! - Classify outcomes as retriable (transport failure, retriable status)
//!   or definitive (success, non-retriable status)
//! - Surface the final retriable failure as a typed error

use std::time::Duration;

use thiserror::Error;

use crate::error::truncate_detail;
use crate::observability::metrics;
use crate::resilience::backoff::backoff_delay;

/// Cap on any single backoff delay between attempts.
pub const MAX_BACKOFF_DELAY: Duration = Duration::from_secs(10);

/// Statuses worth retrying: timeouts, throttling, and transient 5xx.
const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Bounded retry/backoff settings for one class of upstream call.
///
/// Configuration, not mutable state; cheap to clone per request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts is `max_retries + 1`.
    pub max_retries: u32,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Deadline applied to every individual attempt.
    pub timeout: Duration,
    /// Cap on a single backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(300),
            timeout: Duration::from_secs(10),
            max_delay: MAX_BACKOFF_DELAY,
        }
    }
}

/// Definitive failure after the fetch loop gave up.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every attempt exceeded the per-attempt timeout.
    #[error("upstream timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    /// Every attempt failed at the transport level (connect, DNS, TLS).
    #[error("upstream request failed after {attempts} attempt(s): {source}")]
    Network {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// The final attempt still answered with a retriable error status.
    #[error("upstream returned status {status} after {attempts} attempt(s): {detail}")]
    ExhaustedStatus {
        status: u16,
        attempts: u32,
        detail: String,
    },
}

/// Whether a response status should be retried.
pub fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    RETRYABLE_STATUSES.contains(&status.as_u16())
}

enum AttemptFailure {
    Transport(reqwest::Error),
    Status(reqwest::Response),
}

impl AttemptFailure {
    async fn into_error(self, attempts: u32) -> FetchError {
        match self {
            AttemptFailure::Transport(err) if err.is_timeout() => FetchError::Timeout { attempts },
            AttemptFailure::Transport(err) => FetchError::Network {
                attempts,
                source: err,
            },
            AttemptFailure::Status(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                FetchError::ExhaustedStatus {
                    status,
                    attempts,
                    detail: truncate_detail(&body),
                }
            }
        }
    }
}

/// Send `request` with bounded retries and exponential backoff.
///
/// A non-retriable status (success included) is returned as-is after the
/// attempt that produced it; the caller interprets status semantics. A
/// retriable outcome on the final attempt becomes a [`FetchError`].
///
/// Total wall-clock time is bounded by `(max_retries + 1) × timeout` plus
/// the sum of backoff delays.
pub async fn fetch_with_retry(
    mut request: reqwest::RequestBuilder,
    policy: &RetryPolicy,
) -> Result<reqwest::Response, FetchError> {
    let mut attempt: u32 = 0;

    loop {
        // Clone before sending; the builder is consumed by the attempt.
        let replay = request.try_clone();

        metrics::record_upstream_attempt();

        let failure = match request.timeout(policy.timeout).send().await {
            Ok(response) if !is_retryable_status(response.status()) => return Ok(response),
            Ok(response) => {
                tracing::warn!(
                    attempt = attempt + 1,
                    status = %response.status(),
                    "Upstream answered with retriable status"
                );
                AttemptFailure::Status(response)
            }
            Err(err) => {
                tracing::warn!(
                    attempt = attempt + 1,
                    error = %err,
                    "Upstream request failed"
                );
                AttemptFailure::Transport(err)
            }
        };

        // Requests with streaming bodies cannot be replayed; they get a
        // single attempt regardless of policy.
        let next = match replay {
            Some(builder) if attempt < policy.max_retries => builder,
            _ => return Err(failure.into_error(attempt + 1).await),
        };

        let delay = backoff_delay(
            attempt,
            policy.base_delay.as_millis() as u64,
            policy.max_delay.as_millis() as u64,
        );
        tracing::debug!(
            attempt = attempt + 1,
            delay_ms = delay.as_millis() as u64,
            "Backing off before retry"
        );
        tokio::time::sleep(delay).await;

        request = next;
        attempt += 1;
    }
}
