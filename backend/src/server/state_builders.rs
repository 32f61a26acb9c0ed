//! Wiring of the driving-port services over the configured adapters.
//!
//! Without a database pool the services run over the fixture repositories;
//! with a Redis cache the follow and sleep record ports are wrapped in the
//! read-through decorators.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use slumber::domain::ports::{
    FixtureFollowRepository, FixtureSleepRecordRepository, FixtureUserRepository,
    FollowRepository, SleepRecordRepository, UserRepository,
};
use slumber::domain::{FollowService, SleepFeedService, SleepTrackingService};
use slumber::inbound::http::state::{HttpState, HttpStatePorts};
use slumber::outbound::cache::{
    CachedFollowRepository, CachedSleepRecordRepository, RedisFeedCache,
};
use slumber::outbound::persistence::{
    DbPool, DieselFollowRepository, DieselSleepRecordRepository, DieselUserRepository,
};

use super::ServerConfig;

fn state_over<U, F, S>(users: Arc<U>, follows: Arc<F>, records: Arc<S>) -> HttpState
where
    U: UserRepository + 'static,
    F: FollowRepository + 'static,
    S: SleepRecordRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tracking = Arc::new(SleepTrackingService::new(
        users.clone(),
        records.clone(),
        clock.clone(),
    ));
    HttpState::new(HttpStatePorts {
        sleep_feed: Arc::new(SleepFeedService::new(
            users.clone(),
            follows.clone(),
            records,
            clock,
        )),
        sleep_tracking: tracking.clone(),
        sleep_records: tracking,
        follows: Arc::new(FollowService::new(users, follows)),
    })
}

fn cached_or_plain<U, F, S>(
    users: U,
    follows: F,
    records: S,
    cache: Option<&Arc<RedisFeedCache>>,
) -> HttpState
where
    U: UserRepository + 'static,
    F: FollowRepository + 'static,
    S: SleepRecordRepository + 'static,
{
    match cache {
        Some(cache) => state_over(
            Arc::new(users),
            Arc::new(CachedFollowRepository::new(follows, cache.clone())),
            Arc::new(CachedSleepRecordRepository::new(records, cache.clone())),
        ),
        None => state_over(Arc::new(users), Arc::new(follows), Arc::new(records)),
    }
}

fn diesel_state(pool: &DbPool, cache: Option<&Arc<RedisFeedCache>>) -> HttpState {
    cached_or_plain(
        DieselUserRepository::new(pool.clone()),
        DieselFollowRepository::new(pool.clone()),
        DieselSleepRecordRepository::new(pool.clone()),
        cache,
    )
}

/// Build the HTTP state for `config`.
pub fn build_http_state(config: &ServerConfig) -> HttpState {
    let cache = config.feed_cache.as_ref();
    match &config.db_pool {
        Some(pool) => diesel_state(pool, cache),
        None => cached_or_plain(
            FixtureUserRepository,
            FixtureFollowRepository,
            FixtureSleepRecordRepository,
            cache,
        ),
    }
}
