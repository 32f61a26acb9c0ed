//! Domain primitives, the feed core and the services behind the driving
//! ports.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: API error payload and stable identifiers.
//! - `User`, `UserId`, `DisplayName`: read-only user identity.
//! - `FollowEdge`: directed follow relationship.
//! - `SleepRecord`: one sleep session with its derived duration.
//! - `feed`: filtering, ordering, paging and statistics for the sleep feed.

pub mod error;
pub mod feed;
pub mod follow;
mod follow_service;
pub mod ports;
pub mod sleep_record;
mod sleep_feed_service;
mod sleep_tracking_service;
mod store_error_mapping;
pub mod trace_id;
pub mod user;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::follow::{FollowEdge, FollowOutcome, FollowValidationError};
pub use self::follow_service::FollowService;
pub use self::sleep_feed_service::SleepFeedService;
pub use self::sleep_record::{
    SleepRecord, SleepRecordDraft, SleepRecordValidationError, minutes_to_hours,
};
pub use self::sleep_tracking_service::SleepTrackingService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{DISPLAY_NAME_MAX, DisplayName, User, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use slumber::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no such user"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
