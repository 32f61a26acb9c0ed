//! Read-through caching for per-owner feed candidates.
//!
//! Each followee's complete records are cached under their own key together
//! with the cut-off they were read from. A cached entry answers any later
//! read whose cut-off is the same or newer; owners without a usable entry are
//! fetched together in one batch and cached individually.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::domain::feed::FeedEntry;
use crate::domain::ports::{
    CachedOwnerRecords, ClockInOutcome, ClockOutOutcome, FeedCache, FeedCacheKey,
    SleepRecordRepository, SleepRecordRepositoryError,
};
use crate::domain::{SleepRecord, UserId};

/// Caches followee records and drops an owner's entry whenever one of their
/// records starts or finishes.
pub struct CachedSleepRecordRepository<R, C> {
    inner: R,
    cache: Arc<C>,
}

impl<R, C> CachedSleepRecordRepository<R, C> {
    pub fn new(inner: R, cache: Arc<C>) -> Self {
        Self { inner, cache }
    }
}

impl<R, C> CachedSleepRecordRepository<R, C>
where
    C: FeedCache,
{
    async fn cached_for(&self, owner: &UserId, since: DateTime<Utc>) -> Option<Vec<FeedEntry>> {
        match self.cache.owner_records(owner).await {
            Ok(Some(cached)) if cached.covers(since) => {
                Some(cached.entries_since(since).cloned().collect())
            }
            Ok(_) => None,
            Err(error) => {
                warn!(%owner, %error, "owner record cache read failed");
                None
            }
        }
    }

    async fn invalidate(&self, owner: &UserId) {
        let key = FeedCacheKey::owner_records(owner);
        if let Err(error) = self.cache.invalidate(&key).await {
            warn!(%key, %error, "feed cache invalidation failed");
        }
    }

    async fn store(&self, owner: &UserId, since: DateTime<Utc>, entries: Vec<FeedEntry>) {
        let cached = CachedOwnerRecords { since, entries };
        if let Err(error) = self.cache.store_owner_records(owner, &cached).await {
            warn!(%owner, %error, "owner record cache write failed");
        }
    }
}

#[async_trait]
impl<R, C> SleepRecordRepository for CachedSleepRecordRepository<R, C>
where
    R: SleepRecordRepository,
    C: FeedCache,
{
    async fn records_for_owners(
        &self,
        owner_ids: &[UserId],
        since: DateTime<Utc>,
    ) -> Result<Vec<FeedEntry>, SleepRecordRepositoryError> {
        let lookups = join_all(owner_ids.iter().map(|owner| self.cached_for(owner, since))).await;

        let mut entries = Vec::new();
        let mut misses = Vec::new();
        for (owner, cached) in owner_ids.iter().zip(lookups) {
            match cached {
                Some(hit) => entries.extend(hit),
                None => misses.push(owner.clone()),
            }
        }
        debug!(
            hits = owner_ids.len() - misses.len(),
            misses = misses.len(),
            "owner record cache lookup"
        );
        if misses.is_empty() {
            return Ok(entries);
        }

        let fetched = self.inner.records_for_owners(&misses, since).await?;
        let mut by_owner: BTreeMap<UserId, Vec<FeedEntry>> = misses
            .iter()
            .map(|owner| (owner.clone(), Vec::new()))
            .collect();
        for entry in &fetched {
            if let Some(slot) = by_owner.get_mut(entry.record().owner_id()) {
                slot.push(entry.clone());
            }
        }
        for (owner, owned) in by_owner {
            self.store(&owner, since, owned).await;
        }

        entries.extend(fetched);
        Ok(entries)
    }

    async fn active_record(
        &self,
        owner_id: &UserId,
    ) -> Result<Option<SleepRecord>, SleepRecordRepositoryError> {
        self.inner.active_record(owner_id).await
    }

    async fn clock_in(
        &self,
        record: &SleepRecord,
    ) -> Result<ClockInOutcome, SleepRecordRepositoryError> {
        let outcome = self.inner.clock_in(record).await?;
        if outcome == ClockInOutcome::Started {
            self.invalidate(record.owner_id()).await;
        }
        Ok(outcome)
    }

    async fn clock_out(
        &self,
        record: &SleepRecord,
    ) -> Result<ClockOutOutcome, SleepRecordRepositoryError> {
        let outcome = self.inner.clock_out(record).await?;
        if outcome == ClockOutOutcome::Finished {
            self.invalidate(record.owner_id()).await;
        }
        Ok(outcome)
    }

    async fn list_for_owner(
        &self,
        owner_id: &UserId,
        limit: u32,
    ) -> Result<Vec<SleepRecord>, SleepRecordRepositoryError> {
        self.inner.list_for_owner(owner_id, limit).await
    }
}
