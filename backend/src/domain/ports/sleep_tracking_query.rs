//! Driving port for reading a user's own sleep records.

use async_trait::async_trait;

use crate::domain::{Error, SleepRecord, UserId};

/// List the most recent records of `user_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOwnRecordsRequest {
    pub user_id: UserId,
    /// Page size, 1 to 100. Defaults to 20.
    pub limit: Option<i64>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SleepTrackingQuery: Send + Sync {
    /// Newest records first, active sessions included.
    async fn list_own(&self, request: ListOwnRecordsRequest) -> Result<Vec<SleepRecord>, Error>;
}
