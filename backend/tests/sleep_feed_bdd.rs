//! Behavioural tests for the social sleep feed.
//!
//! Scenarios run the real feed service over the in-memory store with the
//! clock frozen at 2026-03-10T12:00:00Z.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use mockable::Clock;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use slumber::domain::feed::RawFeedParameters;
use slumber::domain::ports::{SleepFeed, SleepFeedQuery, SleepFeedRequest};
use slumber::domain::{
    DisplayName, Error, ErrorCode, FollowEdge, SleepFeedService, SleepRecord, SleepRecordDraft,
    User, UserId,
};
use slumber::test_support::{FixedClock, InMemorySleepStore};
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Wrapper for the non-Clone runtime.
#[derive(Clone)]
struct RuntimeHandle(Arc<Runtime>);

#[derive(Default, ScenarioState)]
struct SleepFeedWorld {
    runtime: Slot<RuntimeHandle>,
    store: Slot<InMemorySleepStore>,
    viewer: Slot<UserId>,
    followees: Slot<Vec<UserId>>,
    outcome: Slot<Result<SleepFeed, Error>>,
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0)
        .single()
        .expect("valid scenario clock")
}

impl SleepFeedWorld {
    fn store(&self) -> InMemorySleepStore {
        if let Some(store) = self.store.get() {
            return store;
        }
        let store = InMemorySleepStore::new();
        self.store.set(store.clone());
        store
    }

    fn register(&self, name: &str) -> UserId {
        let id = UserId::random();
        self.store().add_user(User::new(
            id.clone(),
            DisplayName::new(name).expect("valid scenario name"),
        ));
        id
    }

    fn setup_viewer(&self, followee_count: usize) {
        let viewer = self.register("Viewer");
        let store = self.store();
        let followees: Vec<UserId> = (1..=followee_count)
            .map(|index| {
                let followee = self.register(&format!("Followee {index}"));
                store.add_follow(
                    &FollowEdge::new(viewer.clone(), followee.clone()).expect("distinct users"),
                );
                followee
            })
            .collect();
        self.viewer.set(viewer);
        self.followees.set(followees);
    }

    fn followee(&self, index: usize) -> UserId {
        self.followees
            .get()
            .and_then(|followees| followees.get(index.saturating_sub(1)).cloned())
            .expect("followee registered")
    }

    fn add_completed(&self, owner: &UserId, started_at: DateTime<Utc>, minutes: i64) {
        let record = SleepRecord::new(SleepRecordDraft {
            id: Uuid::new_v4(),
            owner_id: owner.clone(),
            started_at,
            ended_at: Some(started_at + Duration::minutes(minutes)),
            created_at: started_at,
        })
        .expect("valid scenario record");
        self.store().add_record(record);
    }

    fn request(&self, parameters: RawFeedParameters) {
        let runtime = match self.runtime.get() {
            Some(handle) => handle,
            None => {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("tokio runtime");
                let handle = RuntimeHandle(Arc::new(runtime));
                self.runtime.set(handle.clone());
                handle
            }
        };
        let store = Arc::new(self.store());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now()));
        let service = SleepFeedService::new(store.clone(), store.clone(), store, clock);
        let viewer = self.viewer.get().expect("viewer registered");

        let outcome = runtime.0.block_on(service.assemble_feed(SleepFeedRequest {
            viewer_id: viewer,
            parameters,
        }));
        self.outcome.set(outcome);
    }

    fn feed(&self) -> SleepFeed {
        self.outcome
            .get()
            .expect("feed requested")
            .expect("feed assembled")
    }

    fn error(&self) -> Error {
        self.outcome
            .get()
            .expect("feed requested")
            .expect_err("feed rejected")
    }
}

#[fixture]
fn world() -> SleepFeedWorld {
    SleepFeedWorld::default()
}

// -----------------------------------------------------------------------------
// Given Steps
// -----------------------------------------------------------------------------

#[given("a viewer who follows nobody")]
fn a_viewer_who_follows_nobody(world: &SleepFeedWorld) {
    world.setup_viewer(0);
}

#[given("a viewer who follows {count} users")]
fn a_viewer_who_follows_users(world: &SleepFeedWorld, count: usize) {
    world.setup_viewer(count);
}

#[given("followee {index} slept {minutes} minutes")]
fn followee_slept_minutes(world: &SleepFeedWorld, index: usize, minutes: i64) {
    let owner = world.followee(index);
    world.add_completed(&owner, now() - Duration::hours(20), minutes);
}

#[given("followee {index} is asleep right now")]
fn followee_is_asleep_right_now(world: &SleepFeedWorld, index: usize) {
    let owner = world.followee(index);
    let started_at = now() - Duration::hours(2);
    world
        .store()
        .add_record(SleepRecord::start(owner, started_at, started_at));
}

#[given("the followees have {count} completed records")]
fn the_followees_have_completed_records(world: &SleepFeedWorld, count: usize) {
    let followees = world.followees.get().expect("followees registered");
    for index in 0..count {
        let owner = &followees[index % followees.len()];
        let hours_ago = 12 + 10 * i64::try_from(index).expect("small index");
        world.add_completed(owner, now() - Duration::hours(hours_ago), 420);
    }
}

// -----------------------------------------------------------------------------
// When Steps
// -----------------------------------------------------------------------------

#[when("the viewer requests the feed")]
fn the_viewer_requests_the_feed(world: &SleepFeedWorld) {
    world.request(RawFeedParameters::default());
}

#[when("the viewer requests the feed sorted by {key}")]
fn the_viewer_requests_the_feed_sorted_by(world: &SleepFeedWorld, key: String) {
    world.request(RawFeedParameters::default().with_sort_by(key));
}

#[when("the viewer requests the feed for {days} days")]
fn the_viewer_requests_the_feed_for_days(world: &SleepFeedWorld, days: i64) {
    world.request(RawFeedParameters::default().with_days(days));
}

#[when("the viewer requests the feed with limit {limit} and offset {offset}")]
fn the_viewer_requests_the_feed_with_limit_and_offset(
    world: &SleepFeedWorld,
    limit: i64,
    offset: i64,
) {
    world.request(
        RawFeedParameters::default()
            .with_limit(limit)
            .with_offset(offset),
    );
}

// -----------------------------------------------------------------------------
// Then Steps
// -----------------------------------------------------------------------------

#[then("the feed has {count} records")]
fn the_feed_has_records(world: &SleepFeedWorld, count: usize) {
    let feed = world.feed();
    assert_eq!(feed.entries.len(), count);
    assert_eq!(feed.page.current_count, u64::try_from(count).expect("count"));
}

#[then("the statistics are all zero")]
fn the_statistics_are_all_zero(world: &SleepFeedWorld) {
    let stats = world.feed().statistics;
    assert_eq!(stats.total_records, 0);
    assert_eq!(stats.unique_users, 0);
    assert_eq!(stats.average_minutes, 0);
    assert_eq!(stats.longest_minutes, 0);
    assert_eq!(stats.shortest_minutes, 0);
    assert!(stats.total_sleep_hours.abs() < f64::EPSILON);
}

#[then("the following count is {count}")]
fn the_following_count_is(world: &SleepFeedWorld, count: u64) {
    assert_eq!(world.feed().following_count, count);
}

#[then("the feed carries an explanatory message")]
fn the_feed_carries_an_explanatory_message(world: &SleepFeedWorld) {
    let message = world.feed().message.expect("message present");
    assert!(!message.trim().is_empty());
}

#[then("the total record count is {count}")]
fn the_total_record_count_is(world: &SleepFeedWorld, count: u64) {
    let feed = world.feed();
    assert_eq!(feed.page.total_count, count);
    assert_eq!(feed.statistics.total_records, feed.page.total_count);
}

#[then("record {index} lasted {minutes} minutes")]
fn record_lasted_minutes(world: &SleepFeedWorld, index: usize, minutes: i64) {
    let feed = world.feed();
    let entry = feed
        .entries
        .get(index.saturating_sub(1))
        .expect("record on page");
    assert_eq!(entry.record().duration_minutes(), Some(minutes));
}

#[then("the longest sleep is {minutes} minutes")]
fn the_longest_sleep_is(world: &SleepFeedWorld, minutes: i64) {
    assert_eq!(world.feed().statistics.longest_minutes, minutes);
}

#[then("the request is rejected for field {field}")]
fn the_request_is_rejected_for_field(world: &SleepFeedWorld, field: String) {
    let error = world.error();
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("details present");
    assert_eq!(details["field"], field.as_str());
}

#[then("the allowed range is {allowed}")]
fn the_allowed_range_is(world: &SleepFeedWorld, allowed: String) {
    let error = world.error();
    let details = error.details().expect("details present");
    assert_eq!(details["allowed"], allowed.as_str());
}

#[then("there are more records")]
fn there_are_more_records(world: &SleepFeedWorld) {
    let page = world.feed().page;
    assert!(page.has_more);
    assert_eq!(page.next_offset, Some(page.offset + u64::from(page.limit)));
}

#[then("there are no more records")]
fn there_are_no_more_records(world: &SleepFeedWorld) {
    let page = world.feed().page;
    assert!(!page.has_more);
    assert_eq!(page.next_offset, None);
}

#[then("the previous offset is {offset}")]
fn the_previous_offset_is(world: &SleepFeedWorld, offset: u64) {
    assert_eq!(world.feed().page.previous_offset, Some(offset));
}

#[then("the statistics cover {count} records")]
fn the_statistics_cover_records(world: &SleepFeedWorld, count: u64) {
    let stats = world.feed().statistics;
    assert_eq!(stats.total_records, count);
    assert_eq!(stats.unique_users, 2);
    assert_eq!(stats.longest_minutes, 420);
    assert_eq!(stats.shortest_minutes, 420);
}

// -----------------------------------------------------------------------------
// Scenario Bindings
// -----------------------------------------------------------------------------

#[scenario(
    path = "tests/features/sleep_feed.feature",
    name = "Viewer following nobody gets an empty feed"
)]
fn viewer_following_nobody(world: SleepFeedWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/sleep_feed.feature",
    name = "Active sessions are left out of the feed"
)]
fn active_sessions_are_left_out(world: SleepFeedWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/sleep_feed.feature",
    name = "Longest sleep comes first when sorting by duration"
)]
fn longest_sleep_comes_first(world: SleepFeedWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/sleep_feed.feature",
    name = "Look-back window beyond thirty days is rejected"
)]
fn look_back_window_is_bounded(world: SleepFeedWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/sleep_feed.feature",
    name = "Paging through twelve records"
)]
fn paging_through_twelve_records(world: SleepFeedWorld) {
    let _ = world;
}
