//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and depend only on
//! the driving ports, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{FollowCommand, SleepFeedQuery, SleepTrackingCommand, SleepTrackingQuery};

/// Port implementations backing the HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub sleep_feed: Arc<dyn SleepFeedQuery>,
    pub sleep_tracking: Arc<dyn SleepTrackingCommand>,
    pub sleep_records: Arc<dyn SleepTrackingQuery>,
    pub follows: Arc<dyn FollowCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub sleep_feed: Arc<dyn SleepFeedQuery>,
    pub sleep_tracking: Arc<dyn SleepTrackingCommand>,
    pub sleep_records: Arc<dyn SleepTrackingQuery>,
    pub follows: Arc<dyn FollowCommand>,
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::{Clock, DefaultClock};
    /// use slumber::domain::ports::{
    ///     FixtureFollowRepository, FixtureSleepRecordRepository, FixtureUserRepository,
    /// };
    /// use slumber::domain::{FollowService, SleepFeedService, SleepTrackingService};
    /// use slumber::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let users = Arc::new(FixtureUserRepository);
    /// let follows = Arc::new(FixtureFollowRepository);
    /// let records = Arc::new(FixtureSleepRecordRepository);
    /// let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    /// let tracking = Arc::new(SleepTrackingService::new(
    ///     users.clone(),
    ///     records.clone(),
    ///     clock.clone(),
    /// ));
    ///
    /// let state = HttpState::new(HttpStatePorts {
    ///     sleep_feed: Arc::new(SleepFeedService::new(
    ///         users.clone(),
    ///         follows.clone(),
    ///         records,
    ///         clock,
    ///     )),
    ///     sleep_tracking: tracking.clone(),
    ///     sleep_records: tracking,
    ///     follows: Arc::new(FollowService::new(users, follows)),
    /// });
    /// let _feed = state.sleep_feed.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            sleep_feed,
            sleep_tracking,
            sleep_records,
            follows,
        } = ports;
        Self {
            sleep_feed,
            sleep_tracking,
            sleep_records,
            follows,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
