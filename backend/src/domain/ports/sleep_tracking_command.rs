//! Driving port for clocking in and out of sleep sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Error, SleepRecord, UserId};

/// Start a session for `user_id`, at `started_at` or now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockInRequest {
    pub user_id: UserId,
    pub started_at: Option<DateTime<Utc>>,
}

/// Finish the active session of `user_id`, at `ended_at` or now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockOutRequest {
    pub user_id: UserId,
    pub ended_at: Option<DateTime<Utc>>,
}

/// Driving port for sleep session writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SleepTrackingCommand: Send + Sync {
    /// Open a new active record.
    ///
    /// Fails with `conflict` while another session is active or when the new
    /// session would overlap a finished one.
    async fn clock_in(&self, request: ClockInRequest) -> Result<SleepRecord, Error>;

    /// Close the active record and derive its duration.
    ///
    /// Fails with `conflict` when nothing is active and `invalid_request`
    /// when the end precedes the start.
    async fn clock_out(&self, request: ClockOutRequest) -> Result<SleepRecord, Error>;
}
