//! Credential-brokering reverse proxy for the OpenSky flight-state API.

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::ProxyConfig;
pub use error::{ProxyError, ProxyResult};
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
