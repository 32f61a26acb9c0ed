//! Port interface for caching feed inputs.
use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FeedCacheKey, define_port_error};
use crate::domain::UserId;
use crate::domain::feed::FeedEntry;

define_port_error! {
    /// Errors surfaced by the caching adapter.
    pub enum FeedCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "feed cache backend failure: {message}",
        /// Serialisation or deserialisation of cached content failed.
        Serialization { message: String } => "feed cache serialisation failed: {message}",
    }
}

/// One owner's complete records with bedtimes at or after `since`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedOwnerRecords {
    pub since: DateTime<Utc>,
    pub entries: Vec<FeedEntry>,
}

impl CachedOwnerRecords {
    /// Whether this entry holds every record a read from `since` needs.
    pub fn covers(&self, since: DateTime<Utc>) -> bool {
        self.since <= since
    }

    /// Entries whose bedtime is at or after `since`.
    pub fn entries_since(&self, since: DateTime<Utc>) -> impl Iterator<Item = &FeedEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.record().started_at() >= since)
    }
}

/// Key/value cache for follow sets and per-owner record lists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedCache: Send + Sync {
    /// Cached followee set for `follower`.
    async fn followees(&self, follower: &UserId)
    -> Result<Option<BTreeSet<UserId>>, FeedCacheError>;

    /// Store the followee set for `follower`.
    async fn store_followees(
        &self,
        follower: &UserId,
        followees: &BTreeSet<UserId>,
    ) -> Result<(), FeedCacheError>;

    /// Cached records for `owner`.
    async fn owner_records(
        &self,
        owner: &UserId,
    ) -> Result<Option<CachedOwnerRecords>, FeedCacheError>;

    /// Store records for `owner`.
    async fn store_owner_records(
        &self,
        owner: &UserId,
        records: &CachedOwnerRecords,
    ) -> Result<(), FeedCacheError>;

    /// Drop a cached entry.
    async fn invalidate(&self, key: &FeedCacheKey) -> Result<(), FeedCacheError>;
}
