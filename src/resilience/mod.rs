//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound upstream call:
//!     → retry.rs (attempt loop, per-attempt timeout, retriable-status check)
//!     → On retriable failure: backoff.rs (exponential delay + jitter), retry
//!     → On exhaustion: definitive FetchError surfaced to the caller
//! ```
//!
//! # Design Decisions
//! - Every attempt has a deadline; total wall-clock is bounded by
//!   `(max_retries + 1) × timeout` plus the backoff delays
//! - Transport errors and a fixed status set {408, 429, 500, 502, 503, 504}
//!   are retriable; everything else is handed back to the caller untouched
//! - Jitter prevents concurrent instances from retrying in lock-step

pub mod backoff;
pub mod retry;

pub use backoff::backoff_delay;
pub use retry::{fetch_with_retry, is_retryable_status, FetchError, RetryPolicy, MAX_BACKOFF_DELAY};
