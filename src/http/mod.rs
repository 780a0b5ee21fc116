//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → middleware (request ID, trace, CORS, timeout)
//!     → shared-secret gate (protected routes)
//!     → handlers.rs (health / token / states)
//!     → upstream via auth + resilience, cache in between
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use server::{AppState, HttpServer};
