//! Port for sleep record persistence and feed candidate reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::feed::FeedEntry;
use crate::domain::{SleepRecord, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by sleep record repository adapters.
    pub enum SleepRecordRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "sleep record repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "sleep record repository query failed: {message}",
    }
}

/// Result of an atomic clock-in attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockInOutcome {
    /// The new record was stored.
    Started,
    /// The owner already has an active record.
    AlreadyActive(SleepRecord),
    /// The new interval would overlap this completed record.
    Overlaps(SleepRecord),
}

/// Result of an atomic clock-out attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockOutOutcome {
    /// The active record was closed.
    Finished,
    /// The record was no longer active when the write ran.
    NotActive,
}

/// Sleep record storage.
///
/// Writes for one owner are serialised by the adapter so the overlap check
/// and the write observe the same state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SleepRecordRepository: Send + Sync {
    /// Complete records of `owner_ids` whose bedtime is at or after `since`,
    /// with owner display names, in one batch query.
    async fn records_for_owners(
        &self,
        owner_ids: &[UserId],
        since: DateTime<Utc>,
    ) -> Result<Vec<FeedEntry>, SleepRecordRepositoryError>;

    /// The owner's active record, if any.
    async fn active_record(
        &self,
        owner_id: &UserId,
    ) -> Result<Option<SleepRecord>, SleepRecordRepositoryError>;

    /// Store a new active record unless it conflicts with existing records.
    async fn clock_in(
        &self,
        record: &SleepRecord,
    ) -> Result<ClockInOutcome, SleepRecordRepositoryError>;

    /// Persist the finished form of a previously active record.
    async fn clock_out(
        &self,
        record: &SleepRecord,
    ) -> Result<ClockOutOutcome, SleepRecordRepositoryError>;

    /// The owner's most recent records, newest bedtime first.
    async fn list_for_owner(
        &self,
        owner_id: &UserId,
        limit: u32,
    ) -> Result<Vec<SleepRecord>, SleepRecordRepositoryError>;
}

/// Fixture implementation that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSleepRecordRepository;

#[async_trait]
impl SleepRecordRepository for FixtureSleepRecordRepository {
    async fn records_for_owners(
        &self,
        _owner_ids: &[UserId],
        _since: DateTime<Utc>,
    ) -> Result<Vec<FeedEntry>, SleepRecordRepositoryError> {
        Ok(Vec::new())
    }

    async fn active_record(
        &self,
        _owner_id: &UserId,
    ) -> Result<Option<SleepRecord>, SleepRecordRepositoryError> {
        Ok(None)
    }

    async fn clock_in(
        &self,
        _record: &SleepRecord,
    ) -> Result<ClockInOutcome, SleepRecordRepositoryError> {
        Ok(ClockInOutcome::Started)
    }

    async fn clock_out(
        &self,
        _record: &SleepRecord,
    ) -> Result<ClockOutOutcome, SleepRecordRepositoryError> {
        Ok(ClockOutOutcome::NotActive)
    }

    async fn list_for_owner(
        &self,
        _owner_id: &UserId,
        _limit: u32,
    ) -> Result<Vec<SleepRecord>, SleepRecordRepositoryError> {
        Ok(Vec::new())
    }
}
