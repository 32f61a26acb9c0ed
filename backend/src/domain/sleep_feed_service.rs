//! Feed assembler service.
//!
//! Implements [`SleepFeedQuery`] over the user, follow and sleep record
//! ports. One followee lookup and one batch record read feed both the page
//! and the statistics.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::PageInfo;
use tracing::info;

use super::store_error_mapping::{map_follow_error, map_record_error, map_user_error};
use crate::domain::feed::{
    FeedParameters, FeedStatistics, NO_FOLLOWEES_MESSAGE, aggregate, filter_feed,
    no_records_message, paginate,
};
use crate::domain::ports::{
    FeedDateRange, FollowRepository, SleepFeed, SleepFeedQuery, SleepFeedRequest,
    SleepRecordRepository, UserRepository,
};
use crate::domain::{Error, UserId};

/// Sleep feed service implementing [`SleepFeedQuery`].
#[derive(Clone)]
pub struct SleepFeedService<U, F, S> {
    users: Arc<U>,
    follows: Arc<F>,
    records: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<U, F, S> SleepFeedService<U, F, S> {
    /// Create a feed service over the store ports.
    pub fn new(users: Arc<U>, follows: Arc<F>, records: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            follows,
            records,
            clock,
        }
    }
}

impl<U, F, S> SleepFeedService<U, F, S>
where
    U: UserRepository,
{
    async fn ensure_viewer_exists(&self, viewer_id: &UserId) -> Result<(), Error> {
        let exists = self
            .users
            .exists(viewer_id)
            .await
            .map_err(map_user_error)?;
        if exists {
            Ok(())
        } else {
            Err(Error::not_found(format!("user {viewer_id} not found")))
        }
    }
}

fn empty_feed(
    params: &FeedParameters,
    date_range: FeedDateRange,
    following_count: u64,
    message: String,
) -> SleepFeed {
    SleepFeed {
        entries: Vec::new(),
        page: PageInfo::empty(params.page),
        statistics: FeedStatistics::default(),
        date_range,
        sort_key: params.sort_key,
        following_count,
        message: Some(message),
    }
}

fn audit(viewer_id: &UserId, params: &FeedParameters, feed: &SleepFeed) {
    info!(
        target: "slumber::audit",
        viewer_id = %viewer_id,
        days = params.window.days(),
        sort_by = %params.sort_key,
        limit = params.page.limit(),
        offset = params.page.offset(),
        following_count = feed.following_count,
        total_records = feed.statistics.total_records,
        returned = feed.entries.len(),
        "sleep feed viewed"
    );
}

#[async_trait]
impl<U, F, S> SleepFeedQuery for SleepFeedService<U, F, S>
where
    U: UserRepository,
    F: FollowRepository,
    S: SleepRecordRepository,
{
    async fn assemble_feed(&self, request: SleepFeedRequest) -> Result<SleepFeed, Error> {
        let params = FeedParameters::parse(&request.parameters)?;
        let viewer_id = request.viewer_id;
        self.ensure_viewer_exists(&viewer_id).await?;

        let followees = self
            .follows
            .followees(&viewer_id)
            .await
            .map_err(map_follow_error)?;
        let following_count = followees.len() as u64;
        let now = self.clock.utc();
        let since = params.window.since(now);
        let date_range = FeedDateRange {
            days_back: params.window.days(),
            from: since,
            to: now,
        };

        if followees.is_empty() {
            let feed = empty_feed(
                &params,
                date_range,
                following_count,
                NO_FOLLOWEES_MESSAGE.to_owned(),
            );
            audit(&viewer_id, &params, &feed);
            return Ok(feed);
        }

        let owner_ids: Vec<UserId> = followees
            .iter()
            .filter(|id| **id != viewer_id)
            .cloned()
            .collect();
        let candidates = self
            .records
            .records_for_owners(&owner_ids, since)
            .await
            .map_err(map_record_error)?;
        let filtered = filter_feed(&viewer_id, &followees, candidates, params.window, now);

        let feed = if filtered.is_empty() {
            empty_feed(
                &params,
                date_range,
                following_count,
                no_records_message(params.window),
            )
        } else {
            let statistics = aggregate(&filtered);
            let page = paginate(filtered, params.sort_key, params.page);
            SleepFeed {
                entries: page.items,
                page: page.info,
                statistics,
                date_range,
                sort_key: params.sort_key,
                following_count,
                message: None,
            }
        };
        audit(&viewer_id, &params, &feed);
        Ok(feed)
    }
}

#[cfg(test)]
#[path = "sleep_feed_service_tests.rs"]
mod tests;
