//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

/// Upper bound on the random jitter added to every backoff delay, in ms.
pub const JITTER_MAX_MS: u64 = 200;

/// Calculate the delay before retry attempt `attempt_index` (0-based).
///
/// The base delay doubles per attempt and is capped at `max_ms` before a
/// bounded random jitter is added, so concurrent instances spread out
/// instead of retrying in lock-step.
pub fn backoff_delay(attempt_index: u32, base_ms: u64, max_ms: u64) -> Duration {
    let exponential = 2u64.saturating_pow(attempt_index);
    let delay_ms = base_ms.saturating_mul(exponential).min(max_ms);

    let jitter = rand::thread_rng().gen_range(0..=JITTER_MAX_MS);

    Duration::from_millis(delay_ms + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_growth() {
        let b0 = backoff_delay(0, 100, 10_000);
        assert!(b0.as_millis() >= 100);
        assert!(b0.as_millis() <= 100 + JITTER_MAX_MS as u128);

        let b2 = backoff_delay(2, 100, 10_000);
        assert!(b2.as_millis() >= 400);
        assert!(b2.as_millis() <= 400 + JITTER_MAX_MS as u128);
    }

    #[test]
    fn test_backoff_cap() {
        let capped = backoff_delay(10, 100, 1_000);
        assert!(capped.as_millis() >= 1_000);
        assert!(capped.as_millis() <= 1_000 + JITTER_MAX_MS as u128);
    }

    #[test]
    fn test_backoff_no_overflow() {
        // Huge attempt counts must saturate, not panic.
        let delay = backoff_delay(u32::MAX, u64::MAX, 2_000);
        assert!(delay.as_millis() <= 2_000 + JITTER_MAX_MS as u128);
    }
}
