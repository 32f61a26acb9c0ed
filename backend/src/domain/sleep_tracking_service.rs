//! Sleep tracking service.
//!
//! Implements clock-in, clock-out and own-record listing. Overlap checks and
//! writes run atomically inside the repository adapter.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT, PageRequest};
use serde_json::json;
use tracing::info;

use super::store_error_mapping::{map_record_error, map_user_error};
use crate::domain::ports::{
    ClockInOutcome, ClockInRequest, ClockOutOutcome, ClockOutRequest, ListOwnRecordsRequest,
    SleepRecordRepository, SleepTrackingCommand, SleepTrackingQuery, UserRepository,
};
use crate::domain::{Error, SleepRecord, UserId};

fn invalid_field(field: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field }))
}

/// Sleep tracking service implementing the command and query driving ports.
#[derive(Clone)]
pub struct SleepTrackingService<U, S> {
    users: Arc<U>,
    records: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<U, S> SleepTrackingService<U, S> {
    /// Create a tracking service over the user and sleep record ports.
    pub fn new(users: Arc<U>, records: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            records,
            clock,
        }
    }
}

impl<U, S> SleepTrackingService<U, S>
where
    U: UserRepository,
{
    async fn ensure_user_exists(&self, user_id: &UserId) -> Result<(), Error> {
        let exists = self.users.exists(user_id).await.map_err(map_user_error)?;
        if exists {
            Ok(())
        } else {
            Err(Error::not_found(format!("user {user_id} not found")))
        }
    }
}

#[async_trait]
impl<U, S> SleepTrackingCommand for SleepTrackingService<U, S>
where
    U: UserRepository,
    S: SleepRecordRepository,
{
    async fn clock_in(&self, request: ClockInRequest) -> Result<SleepRecord, Error> {
        self.ensure_user_exists(&request.user_id).await?;
        let now = self.clock.utc();
        let started_at = request.started_at.unwrap_or(now);
        if started_at > now {
            return Err(invalid_field(
                "started_at",
                "started_at must not be in the future",
            ));
        }

        let record = SleepRecord::start(request.user_id, started_at, now);
        match self
            .records
            .clock_in(&record)
            .await
            .map_err(map_record_error)?
        {
            ClockInOutcome::Started => {
                info!(
                    target: "slumber::audit",
                    user_id = %record.owner_id(),
                    record_id = %record.id(),
                    started_at = %record.started_at(),
                    "clocked in"
                );
                Ok(record)
            }
            ClockInOutcome::AlreadyActive(active) => {
                Err(Error::conflict("a sleep session is already active")
                    .with_details(json!({ "activeRecordId": active.id() })))
            }
            ClockInOutcome::Overlaps(existing) => Err(Error::conflict(
                "sleep session would overlap an existing record",
            )
            .with_details(json!({ "conflictingRecordId": existing.id() }))),
        }
    }

    async fn clock_out(&self, request: ClockOutRequest) -> Result<SleepRecord, Error> {
        self.ensure_user_exists(&request.user_id).await?;
        let active = self
            .records
            .active_record(&request.user_id)
            .await
            .map_err(map_record_error)?
            .ok_or_else(|| Error::conflict("no active sleep session to clock out of"))?;

        let now = self.clock.utc();
        let ended_at = request.ended_at.unwrap_or(now);
        if ended_at > now {
            return Err(invalid_field("ended_at", "ended_at must not be in the future"));
        }
        let finished = active
            .finish(ended_at)
            .map_err(|err| invalid_field("ended_at", err.to_string()))?;

        match self
            .records
            .clock_out(&finished)
            .await
            .map_err(map_record_error)?
        {
            ClockOutOutcome::Finished => {
                info!(
                    target: "slumber::audit",
                    user_id = %finished.owner_id(),
                    record_id = %finished.id(),
                    duration_minutes = finished.duration_minutes().unwrap_or_default(),
                    "clocked out"
                );
                Ok(finished)
            }
            ClockOutOutcome::NotActive => Err(Error::conflict(
                "sleep session was finished by another request",
            )),
        }
    }
}

#[async_trait]
impl<U, S> SleepTrackingQuery for SleepTrackingService<U, S>
where
    U: UserRepository,
    S: SleepRecordRepository,
{
    async fn list_own(&self, request: ListOwnRecordsRequest) -> Result<Vec<SleepRecord>, Error> {
        let limit = PageRequest::validate_limit(request.limit.unwrap_or(DEFAULT_LIMIT))
            .map_err(|_| {
                invalid_field(
                    "limit",
                    format!("limit must be between {MIN_LIMIT} and {MAX_LIMIT}"),
                )
            })?;
        self.ensure_user_exists(&request.user_id).await?;

        self.records
            .list_for_owner(&request.user_id, limit)
            .await
            .map_err(map_record_error)
    }
}

#[cfg(test)]
#[path = "sleep_tracking_service_tests.rs"]
mod tests;
