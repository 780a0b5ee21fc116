//! Route handlers.
//!
//! # Responsibilities
//! - Answer liveness probes
//! - Expose the credential mode and current bearer token
//! - Serve flight-state snapshots through the read-through cache
//!
//! # Data Flow
//! ```text
//! GET /opensky/states
//!     → fresh cache entry? serve it (fromCache=true)
//!     → else fetch upstream (auth header + retries)
//!         → success: store, serve (fromCache=false)
//!         → failure + prior entry: serve stale (stale=true, error=...)
//!         → failure + empty cache: propagate the error
//! ```

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::extract::{RawQuery, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::auth::provider::unconfigured_error;
use crate::auth::{CachedToken, CredentialMode};
use crate::cache::CachedResponse;
use crate::error::{truncate_detail, ProxyError, ProxyResult};
use crate::http::request::X_REQUEST_ID;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::resilience::fetch_with_retry;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub ok: bool,
    /// Current wall-clock time in epoch milliseconds.
    pub ts: u64,
}

/// Body of `GET /opensky/token`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBody {
    pub ok: bool,
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_secs: Option<u64>,
}

impl TokenBody {
    fn basic() -> Self {
        Self {
            ok: true,
            mode: "basic",
            msg: Some("basic credentials are sent inline, no bearer token is issued"),
            access_token: None,
            expires_in_secs: None,
        }
    }

    fn oauth(token: &CachedToken) -> Self {
        Self {
            ok: true,
            mode: "oauth",
            msg: None,
            access_token: Some(token.access_token.clone()),
            expires_in_secs: Some(token.remaining_secs(Instant::now())),
        }
    }
}

/// Body of `GET /opensky/states`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatesBody<'a> {
    from_cache: bool,
    data: &'a Value,
    /// When the served snapshot was stored, epoch milliseconds.
    cached_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    stale: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// `GET /health`: liveness probe, no authentication.
pub async fn health() -> Json<HealthBody> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    Json(HealthBody { ok: true, ts })
}

/// `GET /opensky/token`: credential mode introspection.
///
/// Basic mode answers informationally without touching the network.
/// OAuth mode returns the cached token, refreshing it when needed.
pub async fn token(State(state): State<AppState>) -> Result<Response, ProxyError> {
    match state.credentials.mode() {
        CredentialMode::Basic { .. } => Ok(Json(TokenBody::basic()).into_response()),
        CredentialMode::OAuth { .. } => {
            let token = state.credentials.current_token().await?;
            Ok(Json(TokenBody::oauth(&token)).into_response())
        }
        CredentialMode::Unconfigured => Err(unconfigured_error()),
    }
}

/// `GET /opensky/states`: flight-state snapshot behind the shared secret.
///
/// Read-through over the single-slot cache. After a failed fetch any
/// prior snapshot is served as degraded fallback; only an empty cache
/// propagates the failure.
pub async fn states(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response, ProxyError> {
    let request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let window = state.config.states_fetch.cache_window();
    if let Some(entry) = state.states_cache.fresh(Instant::now(), window) {
        metrics::record_cache_outcome("fresh");
        tracing::debug!(
            request_id = %request_id,
            age_ms = entry.age(Instant::now()).as_millis() as u64,
            "Serving fresh cached snapshot"
        );
        return Ok(states_response(&entry, true, None));
    }

    match fetch_states(&state, query.as_deref()).await {
        Ok(entry) => {
            metrics::record_cache_outcome("miss");
            Ok(states_response(&entry, false, None))
        }
        // Nothing was fetched; a stale serve would only mask the
        // misconfiguration.
        Err(err @ ProxyError::Configuration(_)) => Err(err),
        Err(err) => match state.states_cache.any() {
            Some(entry) => {
                metrics::record_cache_outcome("stale");
                tracing::warn!(
                    request_id = %request_id,
                    error = %err,
                    age_ms = entry.age(Instant::now()).as_millis() as u64,
                    "Upstream fetch failed, serving stale snapshot"
                );
                Ok(states_response(&entry, true, Some(err.to_string())))
            }
            None => {
                tracing::error!(
                    request_id = %request_id,
                    error = %err,
                    "Upstream fetch failed with an empty cache"
                );
                Err(err)
            }
        },
    }
}

fn states_response(entry: &CachedResponse, from_cache: bool, failure: Option<String>) -> Response {
    let stale = failure.is_some();
    Json(StatesBody {
        from_cache,
        data: &entry.payload,
        cached_at: entry.cached_at_ms,
        stale: stale.then_some(true),
        error: failure,
    })
    .into_response()
}

/// One authenticated upstream fetch; stores the payload on success.
async fn fetch_states(state: &AppState, query: Option<&str>) -> ProxyResult<CachedResponse> {
    let auth_header = state.credentials.authorization_header().await?;

    // Query string forwarded verbatim; the upstream sees exactly what
    // the client sent.
    let mut url = state.config.upstream.states_url.clone();
    if let Some(query) = query {
        url.push('?');
        url.push_str(query);
    }

    let request = state
        .client
        .get(&url)
        .header(header::AUTHORIZATION, auth_header);

    let policy = state.config.states_fetch.retry_policy();
    let response = fetch_with_retry(request, &policy).await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProxyError::UpstreamStatus {
            status: status.as_u16(),
            detail: truncate_detail(&body),
        });
    }

    let payload: Value = response
        .json()
        .await
        .map_err(|e| ProxyError::UpstreamStatus {
            status: status.as_u16(),
            detail: format!("unparseable upstream body: {}", e),
        })?;

    Ok(state.states_cache.store(payload))
}
