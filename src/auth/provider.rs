//! Credential provider and token cache.
//!
//! # Responsibilities
//! - Resolve the configured authentication scheme once at startup
//! - Produce the `Authorization` header value for upstream calls
//! - Cache OAuth access tokens across requests and refresh them before
//!   the upstream stops accepting them
//! - Coalesce concurrent refreshes onto a single upstream fetch
//!
//! # Design Decisions
//! - The token slot is a `tokio::sync::Mutex` held across the refresh
//!   await. Callers that arrive while a refresh is in flight park on the
//!   lock and reuse the entry it stores, so an expired token never fans
//!   out into a thundering herd against the identity server.
//! - A failed refresh stores nothing. The next caller retries from
//!   scratch instead of trusting a poisoned entry.

use std::time::Instant;

use tokio::sync::Mutex;

use crate::auth::credentials::{basic_header, CredentialMode};
use crate::auth::token::{CachedToken, TokenResponse};
use crate::config::ProxyConfig;
use crate::error::{truncate_detail, ProxyError, ProxyResult};
use crate::observability::metrics;
use crate::resilience::{fetch_with_retry, RetryPolicy};

/// Supplies upstream credentials in whichever scheme is configured.
pub struct CredentialProvider {
    mode: CredentialMode,
    token_url: String,
    policy: RetryPolicy,
    client: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl CredentialProvider {
    pub fn new(config: &ProxyConfig, client: reqwest::Client) -> Self {
        let mode = CredentialMode::resolve(&config.credentials);
        tracing::info!(mode = %mode, "Credential provider initialized");
        Self {
            mode,
            token_url: config.upstream.token_url.clone(),
            policy: config.token_fetch.retry_policy(),
            client,
            token: Mutex::new(None),
        }
    }

    /// The authentication scheme resolved from configuration.
    pub fn mode(&self) -> &CredentialMode {
        &self.mode
    }

    /// `Authorization` header value for an upstream data request.
    ///
    /// Basic mode derives the header locally; OAuth mode may hit the
    /// token endpoint when the cached token is missing or expired.
    pub async fn authorization_header(&self) -> ProxyResult<String> {
        match &self.mode {
            CredentialMode::Basic { username, password } => Ok(basic_header(username, password)),
            CredentialMode::OAuth { .. } => {
                let token = self.current_token().await?;
                Ok(format!("Bearer {}", token.access_token))
            }
            CredentialMode::Unconfigured => Err(unconfigured_error()),
        }
    }

    /// Returns a valid cached token, refreshing it first when needed.
    ///
    /// Only meaningful in OAuth mode; Basic and unconfigured modes fail
    /// with a configuration error. Repeated calls while the cached token
    /// is fresh return the same token without touching the network.
    pub async fn current_token(&self) -> ProxyResult<CachedToken> {
        let (client_id, client_secret) = match &self.mode {
            CredentialMode::OAuth {
                client_id,
                client_secret,
            } => (client_id.clone(), client_secret.clone()),
            CredentialMode::Basic { .. } => {
                return Err(ProxyError::Configuration(
                    "bearer tokens are not used with basic credentials".to_string(),
                ))
            }
            CredentialMode::Unconfigured => return Err(unconfigured_error()),
        };

        // Held across the refresh await: concurrent callers coalesce.
        let mut slot = self.token.lock().await;

        if let Some(token) = slot.as_ref() {
            if !token.is_expired(Instant::now()) {
                return Ok(token.clone());
            }
        }

        match self.fetch_token(&client_id, &client_secret).await {
            Ok(token) => {
                metrics::record_token_refresh("success");
                tracing::info!(
                    remaining_secs = token.remaining_secs(Instant::now()),
                    "Access token refreshed"
                );
                *slot = Some(token.clone());
                Ok(token)
            }
            Err(e) => {
                metrics::record_token_refresh("failure");
                tracing::warn!(error = %e, "Access token refresh failed");
                Err(e)
            }
        }
    }

    async fn fetch_token(&self, client_id: &str, client_secret: &str) -> ProxyResult<CachedToken> {
        tracing::debug!(token_url = %self.token_url, "Requesting access token");

        let request = self.client.post(&self.token_url).form(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ]);

        let response = fetch_with_retry(request, &self.policy)
            .await
            .map_err(ProxyError::auth_from_fetch)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProxyError::Auth {
                status: Some(status.as_u16()),
                detail: truncate_detail(&body),
            });
        }

        let parsed: TokenResponse = response.json().await.map_err(|e| ProxyError::Auth {
            status: None,
            detail: format!("malformed token response: {}", e),
        })?;

        if parsed.access_token.is_empty() {
            return Err(ProxyError::Auth {
                status: None,
                detail: "token response carried no access_token".to_string(),
            });
        }

        Ok(CachedToken::issue(
            parsed.access_token,
            parsed.expires_in,
            Instant::now(),
        ))
    }
}

/// Error returned by any credentialed operation while no usable pair
/// is configured.
pub fn unconfigured_error() -> ProxyError {
    ProxyError::Configuration(
        "no upstream credentials configured; set OPENSKY_USERNAME/OPENSKY_PASSWORD \
         or OPENSKY_CLIENT_ID/OPENSKY_CLIENT_SECRET"
            .to_string(),
    )
}
