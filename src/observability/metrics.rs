//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define proxy metrics (requests, latency, cache, upstream, tokens)
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, route, status
//! - `proxy_request_duration_seconds` (histogram): latency by route
//! - `proxy_upstream_attempts_total` (counter): outbound attempts,
//!   retries included
//! - `proxy_cache_outcomes_total` (counter): fresh / miss / stale serves
//! - `proxy_token_refresh_total` (counter): refreshes by outcome
//! - `proxy_secret_rejections_total` (counter): shared-secret mismatches
//!
//! # Design Decisions
//! - Route label uses the matched route template, never the raw path,
//!   to keep label cardinality bounded
//! - The exporter runs its own listener so scrapes never compete with
//!   proxied traffic

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Failure to install is logged and otherwise ignored; the proxy works
/// without metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_metrics();
            tracing::info!(address = %addr, "Prometheus exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus exporter");
        }
    }
}

fn describe_metrics() {
    describe_counter!(
        "proxy_requests_total",
        "Requests handled, labeled by method, route, and status"
    );
    describe_histogram!(
        "proxy_request_duration_seconds",
        "Request latency in seconds, labeled by route"
    );
    describe_counter!(
        "proxy_upstream_attempts_total",
        "Outbound upstream attempts, retries included"
    );
    describe_counter!(
        "proxy_cache_outcomes_total",
        "Cache decisions per states request: fresh, miss, stale"
    );
    describe_counter!(
        "proxy_token_refresh_total",
        "Token refresh attempts, labeled by outcome"
    );
    describe_counter!(
        "proxy_secret_rejections_total",
        "Requests rejected for a missing or wrong shared secret"
    );
}

/// Record one handled request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record one outbound attempt against an upstream endpoint.
pub fn record_upstream_attempt() {
    counter!("proxy_upstream_attempts_total").increment(1);
}

/// Record how a states request was answered: "fresh", "miss", "stale".
pub fn record_cache_outcome(outcome: &'static str) {
    counter!("proxy_cache_outcomes_total", "outcome" => outcome).increment(1);
}

/// Record a token refresh attempt: "success" or "failure".
pub fn record_token_refresh(outcome: &'static str) {
    counter!("proxy_token_refresh_total", "outcome" => outcome).increment(1);
}

/// Record a shared-secret rejection.
pub fn record_secret_rejection() {
    counter!("proxy_secret_rejections_total").increment(1);
}

/// Per-request metrics middleware.
///
/// Added with `route_layer` so it runs after routing and can read the
/// matched route template.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    record_request(&method, &route, response.status().as_u16(), start);
    response
}
