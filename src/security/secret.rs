//! Shared-secret gate for protected routes.
//!
//! # Responsibilities
//! - Require the `x-proxy-secret` header on protected routes
//! - Reject mismatches before any upstream work happens
//!
//! # Design Decisions
//! - A missing `PROXY_SECRET` fails closed: protected routes answer
//!   with a configuration error instead of opening up
//! - Rejections are counted but the presented value is never logged

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ProxyError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Header clients must present on protected routes.
pub const SHARED_SECRET_HEADER: &str = "x-proxy-secret";

/// Middleware enforcing the shared secret on protected routes.
pub async fn require_shared_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ProxyError> {
    let Some(expected) = state.config.security.proxy_secret.as_deref() else {
        tracing::error!("PROXY_SECRET is not configured, refusing protected route");
        return Err(ProxyError::Configuration(
            "PROXY_SECRET is not set".to_string(),
        ));
    };

    let presented = request
        .headers()
        .get(SHARED_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());

    if presented != Some(expected) {
        metrics::record_secret_rejection();
        tracing::warn!(
            path = %request.uri().path(),
            header_present = presented.is_some(),
            "Rejected request with missing or wrong shared secret"
        );
        return Err(ProxyError::Unauthorized);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::routing::get;
    use axum::{middleware, Router};
    use tower::ServiceExt;

    use crate::config::ProxyConfig;

    fn guarded_app(secret: Option<&str>) -> Router {
        let mut config = ProxyConfig::default();
        config.security.proxy_secret = secret.map(String::from);
        let state = AppState::new(config).unwrap();
        Router::new()
            .route("/guarded", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_shared_secret,
            ))
            .with_state(state)
    }

    async fn status_for(app: Router, header: Option<&str>) -> StatusCode {
        let mut builder = HttpRequest::builder().uri("/guarded");
        if let Some(value) = header {
            builder = builder.header(SHARED_SECRET_HEADER, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let status = status_for(guarded_app(Some("s3cret")), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let status = status_for(guarded_app(Some("s3cret")), Some("nope")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_matching_secret_passes() {
        let status = status_for(guarded_app(Some("s3cret")), Some("s3cret")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unset_secret_fails_closed() {
        let status = status_for(guarded_app(None), Some("anything")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
