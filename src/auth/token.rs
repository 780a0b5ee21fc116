//! Bearer token cache entries.
//!
//! A token fetched from the upstream OAuth endpoint is cached together
//! with its computed expiry deadline. The deadline is shortened by a
//! safety factor so the proxy refreshes before the upstream would start
//! rejecting the token mid-flight.

use std::time::{Duration, Instant};

use serde::Deserialize;

/// Fraction of the advertised token lifetime the cache honors.
///
/// Must stay below 1.0: a token is treated as expired while the
/// upstream still accepts it, never the other way around.
pub const TOKEN_TTL_SAFETY: f64 = 0.9;

/// Lifetime assumed when the token response carries no `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 300;

/// Wire shape of the upstream token endpoint response.
///
/// Only the fields the proxy consumes. Unknown fields are ignored and
/// missing fields fall back to defaults so a slightly nonstandard
/// identity server does not turn into a parse failure.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// A cached access token and the instant it stops being trusted.
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    /// Builds a cache entry from a freshly fetched token.
    ///
    /// The expiry deadline is `now + expires_in * TOKEN_TTL_SAFETY`,
    /// with [`DEFAULT_TOKEN_LIFETIME_SECS`] standing in when the
    /// upstream omitted `expires_in`.
    pub fn issue(access_token: String, expires_in_secs: Option<u64>, now: Instant) -> Self {
        let lifetime = expires_in_secs.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let usable = Duration::from_secs_f64(lifetime as f64 * TOKEN_TTL_SAFETY);
        Self {
            access_token,
            expires_at: now + usable,
        }
    }

    /// True once the safety-adjusted deadline has passed.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Seconds until this entry expires, zero if already expired.
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        self.expires_at.saturating_duration_since(now).as_secs()
    }
}
