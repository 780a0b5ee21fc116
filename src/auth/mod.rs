//! Upstream authentication.
//!
//! # Responsibilities
//! - Resolve which credential scheme is configured (Basic, OAuth, none)
//! - Build `Authorization` header values for upstream requests
//! - Cache and refresh OAuth access tokens
//!
//! # Data Flow
//! ```text
//! Config -> CredentialMode::resolve -> CredentialProvider
//!                                          |
//!   authorization_header() <--------------+
//!          |                               |
//!   Basic: derive locally       OAuth: current_token()
//!                                          |
//!                            cached & fresh? reuse : fetch via
//!                            fetch_with_retry, store under lock
//! ```

pub mod credentials;
pub mod provider;
pub mod token;

pub use credentials::{basic_header, CredentialMode};
pub use provider::CredentialProvider;
pub use token::{CachedToken, TokenResponse, DEFAULT_TOKEN_LIFETIME_SECS, TOKEN_TTL_SAFETY};
