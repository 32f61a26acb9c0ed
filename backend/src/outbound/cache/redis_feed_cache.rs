//! [`FeedCache`] adapter over a pooled Redis connection.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use bb8_redis::redis;
use rand::Rng;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::UserId;
use crate::domain::ports::{CachedOwnerRecords, FeedCache, FeedCacheError, FeedCacheKey};

/// Share of the base TTL that may be added as jitter, in percent.
const JITTER_PERCENT: u64 = 10;

/// Base TTL plus a random extra of up to 10%, in whole seconds (at least 1).
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use slumber::outbound::cache::jittered_ttl_seconds;
///
/// let ttl = jittered_ttl_seconds(Duration::from_secs(60), &mut rand::thread_rng());
/// assert!((60..=66).contains(&ttl));
/// ```
pub fn jittered_ttl_seconds(base: Duration, rng: &mut impl Rng) -> u64 {
    let base_secs = base.as_secs().max(1);
    let max_jitter = base_secs * JITTER_PERCENT / 100;
    base_secs + rng.gen_range(0..=max_jitter)
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, FeedCacheError> {
    serde_json::to_string(value).map_err(|err| FeedCacheError::serialization(err.to_string()))
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, FeedCacheError> {
    serde_json::from_str(raw).map_err(|err| FeedCacheError::serialization(err.to_string()))
}

fn backend_error(err: impl std::fmt::Display) -> FeedCacheError {
    FeedCacheError::backend(err.to_string())
}

/// Redis cache for follow sets and per-owner record lists.
#[derive(Clone)]
pub struct RedisFeedCache {
    pool: Pool<RedisConnectionManager>,
    ttl: Duration,
}

impl RedisFeedCache {
    /// Wrap an existing pool.
    pub fn new(pool: Pool<RedisConnectionManager>, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    /// Build a pool for `url` and wrap it.
    pub async fn connect(url: &str, ttl: Duration) -> Result<Self, FeedCacheError> {
        let manager = RedisConnectionManager::new(url).map_err(backend_error)?;
        let pool = Pool::builder()
            .connection_timeout(Duration::from_secs(2))
            .build(manager)
            .await
            .map_err(backend_error)?;
        Ok(Self::new(pool, ttl))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        key: &FeedCacheKey,
    ) -> Result<Option<T>, FeedCacheError> {
        let mut conn = self.pool.get().await.map_err(backend_error)?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(key.as_str())
            .query_async(&mut *conn)
            .await
            .map_err(backend_error)?;
        debug!(key = %key, hit = raw.is_some(), "feed cache read");
        raw.as_deref().map(decode).transpose()
    }

    async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &FeedCacheKey,
        value: &T,
    ) -> Result<(), FeedCacheError> {
        let payload = encode(value)?;
        let ttl = jittered_ttl_seconds(self.ttl, &mut rand::thread_rng());
        let mut conn = self.pool.get().await.map_err(backend_error)?;
        let (): () = redis::cmd("SET")
            .arg(key.as_str())
            .arg(payload)
            .arg("EX")
            .arg(ttl)
            .query_async(&mut *conn)
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}

#[async_trait]
impl FeedCache for RedisFeedCache {
    async fn followees(
        &self,
        follower: &UserId,
    ) -> Result<Option<BTreeSet<UserId>>, FeedCacheError> {
        self.get_json(&FeedCacheKey::followees(follower)).await
    }

    async fn store_followees(
        &self,
        follower: &UserId,
        followees: &BTreeSet<UserId>,
    ) -> Result<(), FeedCacheError> {
        self.set_json(&FeedCacheKey::followees(follower), followees)
            .await
    }

    async fn owner_records(
        &self,
        owner: &UserId,
    ) -> Result<Option<CachedOwnerRecords>, FeedCacheError> {
        self.get_json(&FeedCacheKey::owner_records(owner)).await
    }

    async fn store_owner_records(
        &self,
        owner: &UserId,
        records: &CachedOwnerRecords,
    ) -> Result<(), FeedCacheError> {
        self.set_json(&FeedCacheKey::owner_records(owner), records)
            .await
    }

    async fn invalidate(&self, key: &FeedCacheKey) -> Result<(), FeedCacheError> {
        let mut conn = self.pool.get().await.map_err(backend_error)?;
        let _removed: i64 = redis::cmd("DEL")
            .arg(key.as_str())
            .query_async(&mut *conn)
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}
