//! Redis-backed read-through caching for feed inputs.
//!
//! - `bb8-redis` pools the connections.
//! - Payloads are JSON encoded with `serde_json`.
//! - Every write carries a TTL with up to 10% jitter so entries written
//!   together do not expire together.
//! - Keys are namespaced (`slumber:v1:<kind>:<user>`) so a payload change can
//!   bump the version instead of flushing.
//!
//! The decorators treat the cache as optional: any cache failure is logged
//! and the request falls through to the wrapped repository.

mod cached_follow_repository;
mod cached_sleep_record_repository;
mod redis_feed_cache;

pub use cached_follow_repository::CachedFollowRepository;
pub use cached_sleep_record_repository::CachedSleepRecordRepository;
pub use redis_feed_cache::{RedisFeedCache, jittered_ttl_seconds};
