//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check upstream URLs actually parse
//! - Validate value ranges (timeouts nonzero)
//! - Check CORS origins are well-formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: ProxyConfig -> Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// One semantic problem with the configuration.
#[derive(Debug, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

fn problem(field: &'static str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field,
        message: message.into(),
    }
}

/// Validate the full configuration, collecting every violation.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = Url::parse(&config.upstream.token_url) {
        errors.push(problem("upstream.token_url", format!("not a valid URL: {}", e)));
    }
    if let Err(e) = Url::parse(&config.upstream.states_url) {
        errors.push(problem(
            "upstream.states_url",
            format!("not a valid URL: {}", e),
        ));
    }

    if config.token_fetch.timeout_ms == 0 {
        errors.push(problem("token_fetch.timeout_ms", "must be nonzero"));
    }
    if config.states_fetch.timeout_ms == 0 {
        errors.push(problem("states_fetch.timeout_ms", "must be nonzero"));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(problem("listener.request_timeout_secs", "must be nonzero"));
    }

    for origin in &config.security.allow_origin {
        if Url::parse(origin).is_err() {
            errors.push(problem(
                "security.allow_origin",
                format!("{:?} is not a valid origin", origin),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
