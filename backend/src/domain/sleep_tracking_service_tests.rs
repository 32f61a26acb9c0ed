//! Tests for the sleep tracking service.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    MockSleepRecordRepository, MockUserRepository, SleepRecordRepositoryError,
};

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 11, 7, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

#[fixture]
fn user_id() -> UserId {
    UserId::random()
}

fn known_users() -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users.expect_exists().returning(|_| Ok(true));
    users
}

fn service(
    users: MockUserRepository,
    records: MockSleepRecordRepository,
) -> SleepTrackingService<MockUserRepository, MockSleepRecordRepository> {
    SleepTrackingService::new(
        Arc::new(users),
        Arc::new(records),
        Arc::new(FixtureClock {
            utc_now: fixture_now(),
        }),
    )
}

#[rstest]
#[tokio::test]
async fn clock_in_defaults_to_now(user_id: UserId) {
    let mut records = MockSleepRecordRepository::new();
    records
        .expect_clock_in()
        .withf(|record| record.is_active() && record.started_at() == fixture_now())
        .times(1)
        .return_once(|_| Ok(ClockInOutcome::Started));

    let record = service(known_users(), records)
        .clock_in(ClockInRequest {
            user_id: user_id.clone(),
            started_at: None,
        })
        .await
        .expect("clock in succeeds");

    assert_eq!(record.owner_id(), &user_id);
    assert!(record.is_active());
}

#[rstest]
#[tokio::test]
async fn clock_in_rejects_future_start(user_id: UserId) {
    let mut records = MockSleepRecordRepository::new();
    records.expect_clock_in().times(0);

    let error = service(known_users(), records)
        .clock_in(ClockInRequest {
            user_id,
            started_at: Some(fixture_now() + Duration::minutes(5)),
        })
        .await
        .expect_err("future start");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case::active(true)]
#[case::overlap(false)]
#[tokio::test]
async fn clock_in_conflicts_are_reported(user_id: UserId, #[case] active: bool) {
    let existing = SleepRecord::start(
        user_id.clone(),
        fixture_now() - Duration::hours(3),
        fixture_now(),
    );
    let mut records = MockSleepRecordRepository::new();
    records.expect_clock_in().return_once(move |_| {
        Ok(if active {
            ClockInOutcome::AlreadyActive(existing)
        } else {
            ClockInOutcome::Overlaps(existing)
        })
    });

    let error = service(known_users(), records)
        .clock_in(ClockInRequest {
            user_id,
            started_at: Some(fixture_now() - Duration::hours(1)),
        })
        .await
        .expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn clock_in_for_unknown_user_is_not_found(user_id: UserId) {
    let mut users = MockUserRepository::new();
    users.expect_exists().return_once(|_| Ok(false));
    let mut records = MockSleepRecordRepository::new();
    records.expect_clock_in().times(0);

    let error = service(users, records)
        .clock_in(ClockInRequest {
            user_id,
            started_at: None,
        })
        .await
        .expect_err("unknown user");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn clock_out_derives_duration(user_id: UserId) {
    let active = SleepRecord::start(
        user_id.clone(),
        fixture_now() - Duration::minutes(450),
        fixture_now() - Duration::minutes(450),
    );
    let mut records = MockSleepRecordRepository::new();
    records
        .expect_active_record()
        .return_once(move |_| Ok(Some(active)));
    records
        .expect_clock_out()
        .withf(|record| record.duration_minutes() == Some(450))
        .times(1)
        .return_once(|_| Ok(ClockOutOutcome::Finished));

    let finished = service(known_users(), records)
        .clock_out(ClockOutRequest {
            user_id,
            ended_at: None,
        })
        .await
        .expect("clock out succeeds");

    assert!(finished.is_complete());
    assert_eq!(finished.ended_at(), Some(fixture_now()));
}

#[rstest]
#[tokio::test]
async fn clock_out_without_active_session_conflicts(user_id: UserId) {
    let mut records = MockSleepRecordRepository::new();
    records.expect_active_record().return_once(|_| Ok(None));
    records.expect_clock_out().times(0);

    let error = service(known_users(), records)
        .clock_out(ClockOutRequest {
            user_id,
            ended_at: None,
        })
        .await
        .expect_err("nothing active");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn clock_out_before_start_is_invalid(user_id: UserId) {
    let started_at = fixture_now() - Duration::hours(1);
    let active = SleepRecord::start(user_id.clone(), started_at, started_at);
    let mut records = MockSleepRecordRepository::new();
    records
        .expect_active_record()
        .return_once(move |_| Ok(Some(active)));
    records.expect_clock_out().times(0);

    let error = service(known_users(), records)
        .clock_out(ClockOutRequest {
            user_id,
            ended_at: Some(started_at - Duration::minutes(1)),
        })
        .await
        .expect_err("end before start");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details(),
        Some(&serde_json::json!({ "field": "ended_at" }))
    );
}

#[rstest]
#[tokio::test]
async fn list_own_passes_validated_limit(user_id: UserId) {
    let mut records = MockSleepRecordRepository::new();
    records
        .expect_list_for_owner()
        .withf(|_, limit| *limit == 20)
        .times(1)
        .return_once(|_, _| Ok(Vec::new()));

    let listed = service(known_users(), records)
        .list_own(ListOwnRecordsRequest {
            user_id,
            limit: None,
        })
        .await
        .expect("list succeeds");

    assert!(listed.is_empty());
}

#[rstest]
#[case(0)]
#[case(101)]
#[tokio::test]
async fn list_own_rejects_out_of_range_limit(user_id: UserId, #[case] limit: i64) {
    let mut records = MockSleepRecordRepository::new();
    records.expect_list_for_owner().times(0);

    let error = service(MockUserRepository::new(), records)
        .list_own(ListOwnRecordsRequest {
            user_id,
            limit: Some(limit),
        })
        .await
        .expect_err("bad limit");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn store_outage_is_service_unavailable(user_id: UserId) {
    let mut records = MockSleepRecordRepository::new();
    records
        .expect_active_record()
        .return_once(|_| Err(SleepRecordRepositoryError::connection("refused")));

    let error = service(known_users(), records)
        .clock_out(ClockOutRequest {
            user_id,
            ended_at: None,
        })
        .await
        .expect_err("outage");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
