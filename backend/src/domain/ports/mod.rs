//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_key;
mod feed_cache;
mod follow_command;
mod follow_repository;
mod sleep_feed_query;
mod sleep_record_repository;
mod sleep_tracking_command;
mod sleep_tracking_query;
mod user_repository;

pub use cache_key::FeedCacheKey;
#[cfg(test)]
pub use feed_cache::MockFeedCache;
pub use feed_cache::{CachedOwnerRecords, FeedCache, FeedCacheError};
#[cfg(test)]
pub use follow_command::MockFollowCommand;
pub use follow_command::{FollowCommand, FollowRequest};
#[cfg(test)]
pub use follow_repository::MockFollowRepository;
pub use follow_repository::{FixtureFollowRepository, FollowRepository, FollowRepositoryError};
#[cfg(test)]
pub use sleep_feed_query::MockSleepFeedQuery;
pub use sleep_feed_query::{FeedDateRange, SleepFeed, SleepFeedQuery, SleepFeedRequest};
#[cfg(test)]
pub use sleep_record_repository::MockSleepRecordRepository;
pub use sleep_record_repository::{
    ClockInOutcome, ClockOutOutcome, FixtureSleepRecordRepository, SleepRecordRepository,
    SleepRecordRepositoryError,
};
#[cfg(test)]
pub use sleep_tracking_command::MockSleepTrackingCommand;
pub use sleep_tracking_command::{ClockInRequest, ClockOutRequest, SleepTrackingCommand};
#[cfg(test)]
pub use sleep_tracking_query::MockSleepTrackingQuery;
pub use sleep_tracking_query::{ListOwnRecordsRequest, SleepTrackingQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};
