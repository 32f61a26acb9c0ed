//! PostgreSQL-backed `SleepRecordRepository` implementation using Diesel ORM.
//!
//! Clock-in and clock-out take a transaction-scoped advisory lock keyed on
//! the owner, so the overlap check and the write see the same rows. The
//! exclusion constraint on `sleep_records` backs this up at the schema level.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::feed::FeedEntry;
use crate::domain::ports::{
    ClockInOutcome, ClockOutOutcome, SleepRecordRepository, SleepRecordRepositoryError,
};
use crate::domain::{DisplayName, SleepRecord, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewSleepRecordRow, SleepRecordClose, SleepRecordRow};
use super::pool::{DbPool, PoolError};
use super::schema::{sleep_records, users};

/// Diesel-backed implementation of the sleep record port.
#[derive(Clone)]
pub struct DieselSleepRecordRepository {
    pool: DbPool,
}

impl DieselSleepRecordRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SleepRecordRepositoryError {
    map_basic_pool_error(error, |message| {
        SleepRecordRepositoryError::connection(message)
    })
}

fn map_diesel_error(error: diesel::result::Error) -> SleepRecordRepositoryError {
    map_basic_diesel_error(
        error,
        SleepRecordRepositoryError::query,
        SleepRecordRepositoryError::connection,
    )
}

fn row_to_record(row: SleepRecordRow) -> Result<SleepRecord, SleepRecordRepositoryError> {
    SleepRecord::try_from(row).map_err(|err| SleepRecordRepositoryError::query(err.to_string()))
}

fn row_to_entry(
    (row, display_name): (SleepRecordRow, String),
) -> Result<FeedEntry, SleepRecordRepositoryError> {
    let name = DisplayName::new(display_name)
        .map_err(|err| SleepRecordRepositoryError::query(err.to_string()))?;
    Ok(FeedEntry::new(row_to_record(row)?, name))
}

/// Serialise writes for one owner until the surrounding transaction ends.
async fn lock_owner(
    conn: &mut AsyncPgConnection,
    owner_id: &UserId,
) -> Result<(), diesel::result::Error> {
    diesel::sql_query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind::<Text, _>(owner_id.to_string())
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl SleepRecordRepository for DieselSleepRecordRepository {
    async fn records_for_owners(
        &self,
        owner_ids: &[UserId],
        since: DateTime<Utc>,
    ) -> Result<Vec<FeedEntry>, SleepRecordRepositoryError> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }
        let owners: Vec<Uuid> = owner_ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(SleepRecordRow, String)> = sleep_records::table
            .inner_join(users::table)
            .filter(sleep_records::user_id.eq_any(owners))
            .filter(sleep_records::ended_at.is_not_null())
            .filter(sleep_records::duration_minutes.gt(0_i64))
            .filter(sleep_records::started_at.ge(since))
            .select((SleepRecordRow::as_select(), users::display_name))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_entry).collect()
    }

    async fn active_record(
        &self,
        owner_id: &UserId,
    ) -> Result<Option<SleepRecord>, SleepRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = sleep_records::table
            .filter(sleep_records::user_id.eq(owner_id.as_uuid()))
            .filter(sleep_records::ended_at.is_null())
            .select(SleepRecordRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_record).transpose()
    }

    async fn clock_in(
        &self,
        record: &SleepRecord,
    ) -> Result<ClockInOutcome, SleepRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner_id = record.owner_id();
        let new_row = NewSleepRecordRow::from(record);

        let conflict = conn
            .transaction(|conn| {
                async move {
                    lock_owner(conn, owner_id).await?;

                    // Active rows sort first under DESC, so an active session
                    // is reported ahead of an overlap.
                    let conflict = sleep_records::table
                        .filter(sleep_records::user_id.eq(new_row.user_id))
                        .filter(
                            sleep_records::ended_at
                                .is_null()
                                .or(sleep_records::ended_at.gt(new_row.started_at)),
                        )
                        .order(sleep_records::ended_at.desc())
                        .select(SleepRecordRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    if conflict.is_none() {
                        diesel::insert_into(sleep_records::table)
                            .values(&new_row)
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, diesel::result::Error>(conflict)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match conflict {
            None => Ok(ClockInOutcome::Started),
            Some(row) => {
                let existing = row_to_record(row)?;
                Ok(if existing.is_active() {
                    ClockInOutcome::AlreadyActive(existing)
                } else {
                    ClockInOutcome::Overlaps(existing)
                })
            }
        }
    }

    async fn clock_out(
        &self,
        record: &SleepRecord,
    ) -> Result<ClockOutOutcome, SleepRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner_id = record.owner_id();
        let record_id = record.id();
        let close = SleepRecordClose {
            ended_at: record.ended_at(),
            duration_minutes: record.duration_minutes(),
        };

        let updated = conn
            .transaction(|conn| {
                async move {
                    lock_owner(conn, owner_id).await?;
                    diesel::update(
                        sleep_records::table
                            .filter(sleep_records::id.eq(record_id))
                            .filter(sleep_records::ended_at.is_null()),
                    )
                    .set(&close)
                    .execute(conn)
                    .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(if updated == 1 {
            ClockOutOutcome::Finished
        } else {
            ClockOutOutcome::NotActive
        })
    }

    async fn list_for_owner(
        &self,
        owner_id: &UserId,
        limit: u32,
    ) -> Result<Vec<SleepRecord>, SleepRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SleepRecordRow> = sleep_records::table
            .filter(sleep_records::user_id.eq(owner_id.as_uuid()))
            .order((sleep_records::started_at.desc(), sleep_records::id.asc()))
            .limit(i64::from(limit))
            .select(SleepRecordRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_record).collect()
    }
}
