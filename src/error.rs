//! Proxy-wide error definitions.
//!
//! One closed set of error kinds covers every failure a request can hit:
//! missing configuration, exhausted upstream retries, upstream error
//! statuses, token-endpoint failures, and shared-secret rejections.
//! Handlers rely on the [`IntoResponse`] impl so protected routes always
//! answer with a JSON body carrying an `error` field.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::resilience::FetchError;

/// Maximum length of an upstream body excerpt carried in error details.
pub const DETAIL_MAX_LEN: usize = 300;

/// Errors surfaced by proxy operations.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The operation cannot run with the current configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Upstream was unreachable or timed out after all retries.
    #[error("upstream unreachable after {attempts} attempt(s): {reason}")]
    UpstreamTimeout { attempts: u32, reason: String },

    /// Upstream answered with an error status.
    #[error("upstream returned status {status}: {detail}")]
    UpstreamStatus { status: u16, detail: String },

    /// The token endpoint failed to issue a usable access token.
    #[error("token request failed{}: {detail}", fmt_status(.status))]
    Auth { status: Option<u16>, detail: String },

    /// The caller's shared secret did not match.
    #[error("unauthorized")]
    Unauthorized,
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}

/// Result type for proxy operations.
pub type ProxyResult<T> = Result<T, ProxyError>;

impl ProxyError {
    /// Short machine-stable label for the `error` field of JSON bodies.
    pub fn label(&self) -> &'static str {
        match self {
            ProxyError::Configuration(_) => "Service not configured",
            ProxyError::UpstreamTimeout { .. } => "Upstream unavailable",
            ProxyError::UpstreamStatus { .. } => "Upstream error",
            ProxyError::Auth { .. } => "Token acquisition failed",
            ProxyError::Unauthorized => "Unauthorized",
        }
    }

    /// HTTP status this error maps to on the proxy surface.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::UpstreamTimeout { .. } | ProxyError::UpstreamStatus { .. } => {
                StatusCode::GATEWAY_TIMEOUT
            }
            ProxyError::Auth { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::Unauthorized => StatusCode::FORBIDDEN,
        }
    }

    /// Wrap a fetcher failure from the token endpoint into the auth kind.
    pub fn auth_from_fetch(err: FetchError) -> Self {
        match err {
            FetchError::ExhaustedStatus { status, detail, .. } => ProxyError::Auth {
                status: Some(status),
                detail,
            },
            other => ProxyError::Auth {
                status: None,
                detail: other.to_string(),
            },
        }
    }
}

impl From<FetchError> for ProxyError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Timeout { attempts } => ProxyError::UpstreamTimeout {
                attempts,
                reason: "timed out".to_string(),
            },
            FetchError::Network { attempts, source } => ProxyError::UpstreamTimeout {
                attempts,
                reason: source.to_string(),
            },
            FetchError::ExhaustedStatus { status, detail, .. } => {
                ProxyError::UpstreamStatus { status, detail }
            }
        }
    }
}

/// JSON body emitted for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let detail = match self {
            ProxyError::Unauthorized => None,
            ref other => Some(other.to_string()),
        };
        let body = ErrorBody {
            error: self.label(),
            detail,
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Truncate an upstream body for inclusion in error details.
///
/// Cuts on a char boundary so multibyte upstream payloads cannot panic the
/// error path.
pub fn truncate_detail(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= DETAIL_MAX_LEN {
        return trimmed.to_string();
    }
    let mut cut = DETAIL_MAX_LEN;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}... [truncated, {} bytes total]", &trimmed[..cut], trimmed.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProxyError::UpstreamStatus {
            status: 502,
            detail: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "upstream returned status 502: bad gateway");

        let err = ProxyError::Auth {
            status: Some(401),
            detail: "invalid_client".to_string(),
        };
        assert!(err.to_string().contains("status 401"));

        let err = ProxyError::Auth {
            status: None,
            detail: "connection refused".to_string(),
        };
        assert!(!err.to_string().contains("status"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ProxyError::Unauthorized.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ProxyError::Configuration("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ProxyError::UpstreamTimeout {
                attempts: 3,
                reason: "timed out".into()
            }
            .status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ProxyError::Auth {
                status: Some(500),
                detail: "x".into()
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_unauthorized_body_shape() {
        let response = ProxyError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Unauthorized");
        assert!(body.get("detail").is_none());
    }

    #[test]
    fn test_truncate_detail() {
        assert_eq!(truncate_detail("  short  "), "short");

        let long = "x".repeat(1000);
        let truncated = truncate_detail(&long);
        assert!(truncated.len() < 400);
        assert!(truncated.contains("[truncated, 1000 bytes total]"));

        // Multibyte content must cut on a char boundary, not panic.
        let multibyte = "é".repeat(400);
        let truncated = truncate_detail(&multibyte);
        assert!(truncated.contains("truncated"));
    }
}
