//! CORS allow-list.

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::SecurityConfig;

/// Build the CORS layer from the configured allow-list.
///
/// An empty list (or a `*` entry) allows any origin, matching the
/// `ALLOW_ORIGIN` environment contract. Entries that do not form valid
/// header values are dropped.
pub fn build_cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if security.allow_origin.is_empty() || security.allow_origin.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .allow_origin
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
