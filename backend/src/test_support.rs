//! Test utilities shared by unit tests (in `src/`) and integration tests (in
//! `tests/`).
//!
//! Compiled for `cfg(test)` and behind the `test-support` feature.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use mockable::Clock;

use crate::domain::feed::FeedEntry;
use crate::domain::ports::{
    CachedOwnerRecords, ClockInOutcome, ClockOutOutcome, FeedCache, FeedCacheError,
    FeedCacheKey, FollowRepository, FollowRepositoryError, SleepRecordRepository,
    SleepRecordRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{DisplayName, FollowEdge, FollowOutcome, SleepRecord, User, UserId};

/// Clock frozen at a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeMap<UserId, DisplayName>,
    follows: BTreeSet<(UserId, UserId)>,
    records: Vec<SleepRecord>,
    record_reads: usize,
    followee_reads: usize,
    unavailable: bool,
}

/// In-memory user, follow and sleep record store.
///
/// Clones share state, so one store can back every repository port of a
/// service graph. Read counters let tests assert how often the store was
/// queried.
#[derive(Debug, Clone, Default)]
pub struct InMemorySleepStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemorySleepStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a user.
    pub fn add_user(&self, user: User) {
        self.state()
            .users
            .insert(user.id().clone(), user.display_name().clone());
    }

    /// Record a follow edge directly.
    pub fn add_follow(&self, edge: &FollowEdge) {
        self.state()
            .follows
            .insert((edge.follower().clone(), edge.followee().clone()));
    }

    /// Store a record directly, bypassing overlap checks.
    pub fn add_record(&self, record: SleepRecord) {
        self.state().records.push(record);
    }

    /// Every stored record.
    pub fn records(&self) -> Vec<SleepRecord> {
        self.state().records.clone()
    }

    /// Number of `records_for_owners` calls served.
    pub fn record_reads(&self) -> usize {
        self.state().record_reads
    }

    /// Number of `followees` calls served.
    pub fn followee_reads(&self) -> usize {
        self.state().followee_reads
    }

    /// Make every call fail with a connection error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }
}

#[async_trait]
impl UserRepository for InMemorySleepStore {
    async fn exists(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let state = self.state();
        if state.unavailable {
            return Err(UserPersistenceError::connection("store offline"));
        }
        Ok(state.users.contains_key(id))
    }
}

#[async_trait]
impl FollowRepository for InMemorySleepStore {
    async fn followees(
        &self,
        follower: &UserId,
    ) -> Result<BTreeSet<UserId>, FollowRepositoryError> {
        let mut state = self.state();
        if state.unavailable {
            return Err(FollowRepositoryError::connection("store offline"));
        }
        state.followee_reads += 1;
        Ok(state
            .follows
            .iter()
            .filter(|(from, _)| from == follower)
            .map(|(_, to)| to.clone())
            .collect())
    }

    async fn follow(&self, edge: &FollowEdge) -> Result<FollowOutcome, FollowRepositoryError> {
        let mut state = self.state();
        if state.unavailable {
            return Err(FollowRepositoryError::connection("store offline"));
        }
        let inserted = state
            .follows
            .insert((edge.follower().clone(), edge.followee().clone()));
        Ok(if inserted {
            FollowOutcome::Created
        } else {
            FollowOutcome::AlreadyFollowing
        })
    }

    async fn unfollow(&self, edge: &FollowEdge) -> Result<bool, FollowRepositoryError> {
        let mut state = self.state();
        if state.unavailable {
            return Err(FollowRepositoryError::connection("store offline"));
        }
        Ok(state
            .follows
            .remove(&(edge.follower().clone(), edge.followee().clone())))
    }
}

#[async_trait]
impl SleepRecordRepository for InMemorySleepStore {
    async fn records_for_owners(
        &self,
        owner_ids: &[UserId],
        since: DateTime<Utc>,
    ) -> Result<Vec<FeedEntry>, SleepRecordRepositoryError> {
        let mut state = self.state();
        if state.unavailable {
            return Err(SleepRecordRepositoryError::connection("store offline"));
        }
        state.record_reads += 1;
        let owners: BTreeSet<&UserId> = owner_ids.iter().collect();
        Ok(state
            .records
            .iter()
            .filter(|record| {
                owners.contains(record.owner_id())
                    && record.is_complete()
                    && record.started_at() >= since
            })
            .filter_map(|record| {
                state
                    .users
                    .get(record.owner_id())
                    .map(|name| FeedEntry::new(record.clone(), name.clone()))
            })
            .collect())
    }

    async fn active_record(
        &self,
        owner_id: &UserId,
    ) -> Result<Option<SleepRecord>, SleepRecordRepositoryError> {
        let state = self.state();
        if state.unavailable {
            return Err(SleepRecordRepositoryError::connection("store offline"));
        }
        Ok(state
            .records
            .iter()
            .find(|record| record.owner_id() == owner_id && record.is_active())
            .cloned())
    }

    async fn clock_in(
        &self,
        record: &SleepRecord,
    ) -> Result<ClockInOutcome, SleepRecordRepositoryError> {
        let mut state = self.state();
        if state.unavailable {
            return Err(SleepRecordRepositoryError::connection("store offline"));
        }
        let owned = state
            .records
            .iter()
            .filter(|existing| existing.owner_id() == record.owner_id());
        for existing in owned {
            if existing.is_active() {
                return Ok(ClockInOutcome::AlreadyActive(existing.clone()));
            }
            if existing.overlaps(record.started_at(), record.ended_at()) {
                return Ok(ClockInOutcome::Overlaps(existing.clone()));
            }
        }
        state.records.push(record.clone());
        Ok(ClockInOutcome::Started)
    }

    async fn clock_out(
        &self,
        record: &SleepRecord,
    ) -> Result<ClockOutOutcome, SleepRecordRepositoryError> {
        let mut state = self.state();
        if state.unavailable {
            return Err(SleepRecordRepositoryError::connection("store offline"));
        }
        let slot = state
            .records
            .iter_mut()
            .find(|existing| existing.id() == record.id() && existing.is_active());
        Ok(match slot {
            Some(existing) => {
                *existing = record.clone();
                ClockOutOutcome::Finished
            }
            None => ClockOutOutcome::NotActive,
        })
    }

    async fn list_for_owner(
        &self,
        owner_id: &UserId,
        limit: u32,
    ) -> Result<Vec<SleepRecord>, SleepRecordRepositoryError> {
        let state = self.state();
        if state.unavailable {
            return Err(SleepRecordRepositoryError::connection("store offline"));
        }
        let mut owned: Vec<SleepRecord> = state
            .records
            .iter()
            .filter(|record| record.owner_id() == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|left, right| {
            right
                .started_at()
                .cmp(&left.started_at())
                .then_with(|| left.id().cmp(&right.id()))
        });
        owned.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(owned)
    }
}

#[derive(Debug, Default)]
struct CacheState {
    followees: BTreeMap<UserId, BTreeSet<UserId>>,
    owner_records: BTreeMap<UserId, CachedOwnerRecords>,
    invalidated: Vec<FeedCacheKey>,
    failing: bool,
}

/// In-memory [`FeedCache`] without expiry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeedCache {
    state: Arc<Mutex<CacheState>>,
}

impl InMemoryFeedCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Keys dropped so far, in order.
    pub fn invalidated(&self) -> Vec<FeedCacheKey> {
        self.state().invalidated.clone()
    }

    /// Cached records for `owner`, if present.
    pub fn cached_owner_records(&self, owner: &UserId) -> Option<CachedOwnerRecords> {
        self.state().owner_records.get(owner).cloned()
    }

    /// Make every call fail with a backend error.
    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }

    fn check(&self) -> Result<MutexGuard<'_, CacheState>, FeedCacheError> {
        let state = self.state();
        if state.failing {
            return Err(FeedCacheError::backend("cache offline"));
        }
        Ok(state)
    }
}

#[async_trait]
impl FeedCache for InMemoryFeedCache {
    async fn followees(
        &self,
        follower: &UserId,
    ) -> Result<Option<BTreeSet<UserId>>, FeedCacheError> {
        Ok(self.check()?.followees.get(follower).cloned())
    }

    async fn store_followees(
        &self,
        follower: &UserId,
        followees: &BTreeSet<UserId>,
    ) -> Result<(), FeedCacheError> {
        self.check()?
            .followees
            .insert(follower.clone(), followees.clone());
        Ok(())
    }

    async fn owner_records(
        &self,
        owner: &UserId,
    ) -> Result<Option<CachedOwnerRecords>, FeedCacheError> {
        Ok(self.check()?.owner_records.get(owner).cloned())
    }

    async fn store_owner_records(
        &self,
        owner: &UserId,
        records: &CachedOwnerRecords,
    ) -> Result<(), FeedCacheError> {
        self.check()?
            .owner_records
            .insert(owner.clone(), records.clone());
        Ok(())
    }

    async fn invalidate(&self, key: &FeedCacheKey) -> Result<(), FeedCacheError> {
        let mut state = self.check()?;
        let raw = key.as_str();
        state
            .followees
            .retain(|follower, _| FeedCacheKey::followees(follower).as_str() != raw);
        state
            .owner_records
            .retain(|owner, _| FeedCacheKey::owner_records(owner).as_str() != raw);
        state.invalidated.push(key.clone());
        Ok(())
    }
}
