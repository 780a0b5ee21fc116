//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → optional TOML file (loader.rs, --config)
//!     → environment overrides (recognized variables)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via AppState to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Empty environment values are treated as unset
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, ConfigError};
pub use schema::{
    CredentialsConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, SecurityConfig,
    StatesFetchConfig, TokenFetchConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
