//! Slumber: sleep tracking with a social sleep feed.
//!
//! - [`domain`]: value types, the feed core, driving and driven ports and the
//!   services implementing them.
//! - [`inbound`]: the actix-web adapter.
//! - [`outbound`]: Diesel persistence and the Redis read-through cache.
//! - [`middleware`]: per-request trace ids.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
