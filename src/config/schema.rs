//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files;
//! every field has a default so a minimal (or absent) file still yields a
//! runnable configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resilience::{RetryPolicy, MAX_BACKOFF_DELAY};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Upstream endpoint URLs.
    pub upstream: UpstreamConfig,

    /// Upstream credential material.
    pub credentials: CredentialsConfig,

    /// Shared-secret gate and CORS allow-list.
    pub security: SecurityConfig,

    /// Retry/timeout tuning for token-endpoint fetches.
    pub token_fetch: TokenFetchConfig,

    /// Retry/timeout/cache tuning for flight-state fetches.
    pub states_fetch: StatesFetchConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind host.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Whole-request deadline applied by the server, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 60,
        }
    }
}

/// Upstream endpoint URLs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// OAuth token endpoint (client_credentials grant).
    pub token_url: String,

    /// Flight-state snapshot endpoint; inbound query strings are
    /// forwarded to it verbatim.
    pub states_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            token_url:
                "https://auth.opensky-network.org/auth/realms/opensky-network/protocol/openid-connect/token"
                    .to_string(),
            states_url: "https://opensky-network.org/api/states/all".to_string(),
        }
    }
}

/// Upstream credential material.
///
/// Both pairs are optional; which scheme is active is resolved at
/// startup (Basic wins when both are complete). Empty strings count
/// as absent.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CredentialsConfig {
    /// HTTP Basic username.
    pub username: Option<String>,

    /// HTTP Basic password.
    pub password: Option<String>,

    /// OAuth client id.
    pub client_id: Option<String>,

    /// OAuth client secret.
    pub client_secret: Option<String>,
}

/// Shared-secret gate and CORS allow-list.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// Shared secret required on protected routes via `x-proxy-secret`.
    /// When unset, protected routes answer 503 rather than opening up.
    pub proxy_secret: Option<String>,

    /// Allowed CORS origins. Empty means allow any origin.
    pub allow_origin: Vec<String>,
}

/// Retry/timeout tuning for token-endpoint fetches.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenFetchConfig {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,

    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Base backoff delay in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for TokenFetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 8_000,
            max_retries: 2,
            retry_delay_ms: 300,
        }
    }
}

impl TokenFetchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_delay_ms),
            timeout: Duration::from_millis(self.timeout_ms),
            max_delay: MAX_BACKOFF_DELAY,
        }
    }
}

/// Retry/timeout/cache tuning for flight-state fetches.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatesFetchConfig {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,

    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Base backoff delay in milliseconds.
    pub retry_delay_ms: u64,

    /// Freshness window for the cached snapshot, in milliseconds.
    pub cache_ms: u64,
}

impl Default for StatesFetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: 2,
            retry_delay_ms: 500,
            cache_ms: 15_000,
        }
    }
}

impl StatesFetchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_delay_ms),
            timeout: Duration::from_millis(self.timeout_ms),
            max_delay: MAX_BACKOFF_DELAY,
        }
    }

    pub fn cache_window(&self) -> Duration {
        Duration::from_millis(self.cache_ms)
    }
}

/// Logging and metrics settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Tracing filter used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Whether to run the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Bind address for the Prometheus scrape endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "opensky_proxy=info,tower_http=warn".to_string(),
            metrics_enabled: true,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
