//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Initialize subsystems → Start listener
//!
//! Shutdown (shutdown.rs):
//!     SIGINT/SIGTERM → broadcast signal → drain connections → exit
//! ```

pub mod shutdown;

pub use shutdown::{wait_for_signal, Shutdown};
