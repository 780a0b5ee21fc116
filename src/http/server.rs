//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, timeout, metrics)
//! - Gate the protected route behind the shared secret
//! - Serve until the shutdown signal fires
//!
//! # Design Decisions
//! - One `AppState` built at startup and cloned into handlers; the
//!   credential provider and cache it carries are process-wide
//! - The shared-secret check is a route layer on the protected router
//!   only, so `/health` and `/opensky/token` stay open

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::CredentialProvider;
use crate::cache::ResponseCache;
use crate::config::ProxyConfig;
use crate::error::ErrorBody;
use crate::http::handlers;
use crate::http::request::MakeRequestUuid;
use crate::observability::metrics;
use crate::security::{build_cors_layer, require_shared_secret};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub credentials: Arc<CredentialProvider>,
    pub states_cache: ResponseCache,
    pub client: reqwest::Client,
}

impl AppState {
    /// Build the shared state: outbound client, credential provider,
    /// response cache.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("opensky-proxy/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(config, client))
    }

    /// Build the shared state around a caller-supplied outbound client.
    ///
    /// Tests use this to pin client behavior (no system proxy, no
    /// connection reuse) without touching production defaults.
    pub fn with_client(config: ProxyConfig, client: reqwest::Client) -> Self {
        let config = Arc::new(config);
        let credentials = Arc::new(CredentialProvider::new(&config, client.clone()));
        Self {
            config,
            credentials,
            states_cache: ResponseCache::new(),
            client,
        }
    }
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around the shared state.
    pub fn new(state: AppState) -> Self {
        Self {
            router: build_router(state),
        }
    }

    /// Run the server until `shutdown` fires, draining in-flight
    /// requests before returning.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
fn build_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.listener.request_timeout_secs);
    let cors = build_cors_layer(&state.config.security);

    let protected = Router::new()
        .route("/opensky/states", get(handlers::states))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_shared_secret,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/opensky/token", get(handlers::token))
        .merge(protected)
        .route_layer(middleware::from_fn(metrics::track_requests))
        .fallback(not_found)
        .with_state(state)
        .layer(
            // Top entry is outermost: the request ID exists before the
            // trace span opens, and propagation happens on the way out.
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors)
                .layer(TimeoutLayer::new(request_timeout)),
        )
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not found",
            detail: None,
        }),
    )
        .into_response()
}
