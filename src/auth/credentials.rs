//! Credential material and scheme selection.
//!
//! The proxy supports two upstream authentication schemes. Basic
//! credentials (username + password) are sent inline on every request.
//! OAuth client credentials are exchanged for a bearer token at the
//! upstream token endpoint. When both pairs are configured, Basic wins.

use base64::prelude::*;

use crate::config::CredentialsConfig;

/// Which authentication scheme the proxy uses against the upstream.
///
/// Resolved once at startup from configuration. A pair only counts as
/// configured when both of its parts are present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialMode {
    /// HTTP Basic: username and password attached to each upstream call.
    Basic { username: String, password: String },
    /// OAuth2 client_credentials: client id and secret exchanged for a
    /// short-lived bearer token.
    OAuth {
        client_id: String,
        client_secret: String,
    },
    /// Neither pair fully configured. Credentialed operations fail with
    /// a configuration error until the environment is fixed.
    Unconfigured,
}

impl CredentialMode {
    /// Resolves the active scheme from configuration.
    ///
    /// Basic takes priority over OAuth when both pairs are complete.
    /// Empty strings are treated as absent, so `OPENSKY_USERNAME=""`
    /// does not count as half a pair.
    pub fn resolve(credentials: &CredentialsConfig) -> Self {
        if let (Some(username), Some(password)) = (
            non_empty(&credentials.username),
            non_empty(&credentials.password),
        ) {
            return CredentialMode::Basic {
                username: username.to_string(),
                password: password.to_string(),
            };
        }

        if let (Some(client_id), Some(client_secret)) = (
            non_empty(&credentials.client_id),
            non_empty(&credentials.client_secret),
        ) {
            return CredentialMode::OAuth {
                client_id: client_id.to_string(),
                client_secret: client_secret.to_string(),
            };
        }

        CredentialMode::Unconfigured
    }

    /// Short label for logs and the token introspection route.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialMode::Basic { .. } => "basic",
            CredentialMode::OAuth { .. } => "oauth",
            CredentialMode::Unconfigured => "unconfigured",
        }
    }

    /// True when some usable credential pair is configured.
    pub fn is_configured(&self) -> bool {
        !matches!(self, CredentialMode::Unconfigured)
    }
}

impl std::fmt::Display for CredentialMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the `Authorization` header value for HTTP Basic.
pub fn basic_header(username: &str, password: &str) -> String {
    let encoded = BASE64_STANDARD.encode(format!("{}:{}", username, password));
    format!("Basic {}", encoded)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(
        username: Option<&str>,
        password: Option<&str>,
        client_id: Option<&str>,
        client_secret: Option<&str>,
    ) -> CredentialsConfig {
        CredentialsConfig {
            username: username.map(String::from),
            password: password.map(String::from),
            client_id: client_id.map(String::from),
            client_secret: client_secret.map(String::from),
        }
    }

    #[test]
    fn test_basic_wins_over_oauth() {
        let mode = CredentialMode::resolve(&config(
            Some("user"),
            Some("pass"),
            Some("id"),
            Some("secret"),
        ));
        assert_eq!(
            mode,
            CredentialMode::Basic {
                username: "user".to_string(),
                password: "pass".to_string(),
            }
        );
    }

    #[test]
    fn test_oauth_when_basic_incomplete() {
        let mode = CredentialMode::resolve(&config(Some("user"), None, Some("id"), Some("secret")));
        assert_eq!(
            mode,
            CredentialMode::OAuth {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_strings_count_as_absent() {
        let mode = CredentialMode::resolve(&config(Some(""), Some("pass"), Some(""), Some("")));
        assert_eq!(mode, CredentialMode::Unconfigured);
    }

    #[test]
    fn test_unconfigured_when_nothing_set() {
        let mode = CredentialMode::resolve(&config(None, None, None, None));
        assert_eq!(mode, CredentialMode::Unconfigured);
        assert!(!mode.is_configured());
        assert_eq!(mode.as_str(), "unconfigured");
    }

    #[test]
    fn test_basic_header_encoding() {
        // "user:pass" in base64.
        assert_eq!(basic_header("user", "pass"), "Basic dXNlcjpwYXNz");
    }
}
