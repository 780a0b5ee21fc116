//! Security subsystem.
//!
//! # Responsibilities
//! - Gate protected routes behind the shared secret
//! - Restrict browser callers to the configured CORS origins
//!
//! # Design Decisions
//! - One static secret for all callers; there is no per-client identity
//! - Upstream credentials never reach this layer, it sees only the
//!   inbound side

pub mod cors;
pub mod secret;

pub use cors::build_cors_layer;
pub use secret::{require_shared_secret, SHARED_SECRET_HEADER};
