//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer; adapters convert them into
//! validated domain values.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{SleepRecord, SleepRecordDraft, SleepRecordValidationError, UserId};

use super::schema::{follows, sleep_records};

/// Insertable struct for follow edges.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = follows)]
pub(crate) struct NewFollowRow {
    pub follower_id: Uuid,
    pub followee_id: Uuid,
}

/// Row struct for reading from the sleep_records table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sleep_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SleepRecordRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    #[expect(dead_code, reason = "duration is re-derived by the domain constructor")]
    pub duration_minutes: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SleepRecordRow> for SleepRecord {
    type Error = SleepRecordValidationError;

    fn try_from(row: SleepRecordRow) -> Result<Self, Self::Error> {
        SleepRecord::new(SleepRecordDraft {
            id: row.id,
            owner_id: UserId::from_uuid(row.user_id),
            started_at: row.started_at,
            ended_at: row.ended_at,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for new sleep records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sleep_records)]
pub(crate) struct NewSleepRecordRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<&SleepRecord> for NewSleepRecordRow {
    fn from(record: &SleepRecord) -> Self {
        Self {
            id: record.id(),
            user_id: *record.owner_id().as_uuid(),
            started_at: record.started_at(),
            ended_at: record.ended_at(),
            duration_minutes: record.duration_minutes(),
            created_at: record.created_at(),
        }
    }
}

/// Changeset closing an active record.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = sleep_records)]
pub(crate) struct SleepRecordClose {
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
}
