//! Driving port for the social sleep feed.
//!
//! The feed combines one page of followees' records with statistics computed
//! over every record that passed the filter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageInfo;

use crate::domain::feed::{FeedEntry, FeedStatistics, RawFeedParameters, SortKey};
use crate::domain::{Error, UserId};

/// Request for one page of a viewer's feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SleepFeedRequest {
    pub viewer_id: UserId,
    pub parameters: RawFeedParameters,
}

impl SleepFeedRequest {
    /// Request with every parameter left at its default.
    pub fn for_viewer(viewer_id: UserId) -> Self {
        Self {
            viewer_id,
            parameters: RawFeedParameters::default(),
        }
    }
}

/// Window the feed was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedDateRange {
    pub days_back: u32,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// One assembled feed page.
#[derive(Debug, Clone, PartialEq)]
pub struct SleepFeed {
    pub entries: Vec<FeedEntry>,
    pub page: PageInfo,
    pub statistics: FeedStatistics,
    pub date_range: FeedDateRange,
    pub sort_key: SortKey,
    pub following_count: u64,
    /// Explanation attached to empty feeds.
    pub message: Option<String>,
}

/// Driving port for reading the sleep feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SleepFeedQuery: Send + Sync {
    /// Validate the parameters, resolve the viewer and assemble their feed.
    ///
    /// Returns `invalid_request` naming the first bad parameter, or
    /// `not_found` for an unknown viewer. Empty feeds are successes carrying
    /// a message.
    async fn assemble_feed(&self, request: SleepFeedRequest) -> Result<SleepFeed, Error>;
}
