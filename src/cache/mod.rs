//! Response caching.
//!
//! One slot, one upstream resource. The read-through logic lives in the
//! states handler; this module only owns storage and freshness.

pub mod response;

pub use response::{CachedResponse, ResponseCache};
