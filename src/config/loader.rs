//! Configuration loading and layering.
//!
//! Three layers, later wins: built-in defaults, an optional TOML file,
//! environment variables. Environment parsing goes through a lookup
//! callback so tests can exercise the overlay without mutating process
//! state.

use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {detail}")]
    Env { var: String, detail: String },

    #[error("configuration invalid: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Load, layer, and validate the full configuration.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Overlay recognized environment variables onto `config`.
///
/// Empty values are treated as unset, so `PROXY_SECRET=""` does not
/// count as a configured secret.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(v) = get("OPENSKY_USERNAME") {
        config.credentials.username = Some(v);
    }
    if let Some(v) = get("OPENSKY_PASSWORD") {
        config.credentials.password = Some(v);
    }
    if let Some(v) = get("OPENSKY_CLIENT_ID") {
        config.credentials.client_id = Some(v);
    }
    if let Some(v) = get("OPENSKY_CLIENT_SECRET") {
        config.credentials.client_secret = Some(v);
    }
    if let Some(v) = get("OPENSKY_TOKEN_URL") {
        config.upstream.token_url = v;
    }
    if let Some(v) = get("OPENSKY_STATES_URL") {
        config.upstream.states_url = v;
    }
    if let Some(v) = get("PROXY_SECRET") {
        config.security.proxy_secret = Some(v);
    }
    if let Some(v) = get("ALLOW_ORIGIN") {
        config.security.allow_origin = v
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();
    }

    if let Some(v) = get("TOKEN_TIMEOUT_MS") {
        config.token_fetch.timeout_ms = parse_var("TOKEN_TIMEOUT_MS", &v)?;
    }
    if let Some(v) = get("TOKEN_MAX_RETRIES") {
        config.token_fetch.max_retries = parse_var("TOKEN_MAX_RETRIES", &v)?;
    }
    if let Some(v) = get("TOKEN_RETRY_DELAY_MS") {
        config.token_fetch.retry_delay_ms = parse_var("TOKEN_RETRY_DELAY_MS", &v)?;
    }
    if let Some(v) = get("STATES_TIMEOUT_MS") {
        config.states_fetch.timeout_ms = parse_var("STATES_TIMEOUT_MS", &v)?;
    }
    if let Some(v) = get("STATES_MAX_RETRIES") {
        config.states_fetch.max_retries = parse_var("STATES_MAX_RETRIES", &v)?;
    }
    if let Some(v) = get("STATES_RETRY_DELAY_MS") {
        config.states_fetch.retry_delay_ms = parse_var("STATES_RETRY_DELAY_MS", &v)?;
    }
    if let Some(v) = get("STATES_CACHE_MS") {
        config.states_fetch.cache_ms = parse_var("STATES_CACHE_MS", &v)?;
    }
    if let Some(v) = get("PORT") {
        config.listener.port = parse_var("PORT", &v)?;
    }

    Ok(())
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Env {
        var: var.to_string(),
        detail: format!("{:?} ({})", value, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overlay(vars: &[(&str, &str)]) -> ProxyConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = ProxyConfig::default();
        apply_env_overrides(&mut config, |name| map.get(name).cloned()).unwrap();
        config
    }

    #[test]
    fn test_env_overrides_credentials_and_tuning() {
        let config = overlay(&[
            ("OPENSKY_CLIENT_ID", "id"),
            ("OPENSKY_CLIENT_SECRET", "secret"),
            ("PROXY_SECRET", "hunter2"),
            ("STATES_CACHE_MS", "30000"),
            ("TOKEN_MAX_RETRIES", "5"),
            ("PORT", "3000"),
        ]);

        assert_eq!(config.credentials.client_id.as_deref(), Some("id"));
        assert_eq!(config.security.proxy_secret.as_deref(), Some("hunter2"));
        assert_eq!(config.states_fetch.cache_ms, 30_000);
        assert_eq!(config.token_fetch.max_retries, 5);
        assert_eq!(config.listener.port, 3000);
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let config = overlay(&[("PROXY_SECRET", ""), ("OPENSKY_USERNAME", "")]);
        assert!(config.security.proxy_secret.is_none());
        assert!(config.credentials.username.is_none());
    }

    #[test]
    fn test_allow_origin_splits_on_commas() {
        let config = overlay(&[(
            "ALLOW_ORIGIN",
            "https://a.example.com, https://b.example.com,,",
        )]);
        assert_eq!(
            config.security.allow_origin,
            vec![
                "https://a.example.com".to_string(),
                "https://b.example.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_malformed_number_is_rejected() {
        let map: HashMap<String, String> =
            [("PORT".to_string(), "not-a-port".to_string())].into();
        let mut config = ProxyConfig::default();
        let err = apply_env_overrides(&mut config, |name| map.get(name).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Env { ref var, .. } if var == "PORT"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/proxy.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
