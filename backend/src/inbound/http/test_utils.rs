//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{DateTime, TimeZone, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::Trace;
use crate::domain::{
    DisplayName, FollowEdge, FollowService, SleepFeedService, SleepRecord, SleepRecordDraft,
    SleepTrackingService, User, UserId,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::test_support::{FixedClock, InMemorySleepStore};

/// Instant every handler test treats as "now".
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Parse an RFC 3339 fixture timestamp.
pub fn at(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("valid fixture timestamp")
        .with_timezone(&Utc)
}

/// Register a user with a fixed id.
pub fn register(store: &InMemorySleepStore, id: &str, name: &str) -> UserId {
    let id = UserId::new(id).expect("valid fixture id");
    store.add_user(User::new(
        id.clone(),
        DisplayName::new(name).expect("valid fixture name"),
    ));
    id
}

/// Record that `follower` follows `followee`.
pub fn follow(store: &InMemorySleepStore, follower: &UserId, followee: &UserId) {
    store.add_follow(
        &FollowEdge::new(follower.clone(), followee.clone()).expect("distinct fixture users"),
    );
}

/// Store a completed record with a fixed id.
pub fn completed(store: &InMemorySleepStore, id: &str, owner: &UserId, start: &str, end: &str) {
    let started_at = at(start);
    store.add_record(
        SleepRecord::new(SleepRecordDraft {
            id: Uuid::parse_str(id).expect("valid fixture id"),
            owner_id: owner.clone(),
            started_at,
            ended_at: Some(at(end)),
            created_at: started_at,
        })
        .expect("valid fixture record"),
    );
}

/// Wire the real services over one in-memory store.
pub fn state_over(store: &InMemorySleepStore, clock: Arc<FixedClock>) -> HttpState {
    let shared = Arc::new(store.clone());
    let clock: Arc<dyn Clock> = clock;
    let tracking = Arc::new(SleepTrackingService::new(
        shared.clone(),
        shared.clone(),
        clock.clone(),
    ));
    HttpState::new(HttpStatePorts {
        sleep_feed: Arc::new(SleepFeedService::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            clock,
        )),
        sleep_tracking: tracking.clone(),
        sleep_records: tracking,
        follows: Arc::new(FollowService::new(shared.clone(), shared)),
    })
}

/// Application exposing every `/api/v1` endpoint over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(
            web::scope("/api/v1")
                .service(crate::inbound::http::sleep_feed::get_sleep_feed)
                .service(crate::inbound::http::sleep_records::clock_in)
                .service(crate::inbound::http::sleep_records::clock_out)
                .service(crate::inbound::http::sleep_records::list_sleep_records)
                .service(crate::inbound::http::follows::follow_user)
                .service(crate::inbound::http::follows::unfollow_user),
        )
}
