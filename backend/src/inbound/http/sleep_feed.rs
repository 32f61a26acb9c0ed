//! Social sleep feed HTTP handler.
//!
//! ```text
//! GET /api/v1/sleep-feed?days=7&sort_by=duration&limit=20&offset=0
//! ```

use actix_web::{get, web};
use chrono::{DateTime, SecondsFormat, Utc};
use pagination::PageInfo;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::feed::{FeedEntry, FeedStatistics, RawFeedParameters};
use crate::domain::minutes_to_hours;
use crate::domain::ports::{FeedDateRange, SleepFeed, SleepFeedRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Feed query parameters. Values are validated by the feed service so
/// malformed numbers produce field-named errors.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SleepFeedQueryParams {
    /// Look-back window in days, 1-30 (default 7).
    #[param(value_type = Option<i64>, example = 7)]
    pub days: Option<String>,
    /// Ordering key: duration, bedtime, waketime or created_at (default duration).
    #[param(value_type = Option<String>, example = "duration")]
    pub sort_by: Option<String>,
    /// Page size, 1-100 (default 20).
    #[param(value_type = Option<i64>, example = 20)]
    pub limit: Option<String>,
    /// Records to skip, zero or greater (default 0).
    #[param(value_type = Option<i64>, example = 0)]
    pub offset: Option<String>,
}

impl From<SleepFeedQueryParams> for RawFeedParameters {
    fn from(value: SleepFeedQueryParams) -> Self {
        Self {
            days: value.days,
            sort_by: value.sort_by,
            limit: value.limit,
            offset: value.offset,
        }
    }
}

pub(crate) fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Owner of a feed record.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedUserBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub display_name: String,
}

/// One followee record in the feed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedRecordBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub user: FeedUserBody,
    #[schema(format = "date-time")]
    pub started_at: String,
    #[schema(format = "date-time")]
    pub ended_at: Option<String>,
    pub duration_minutes: Option<i64>,
    /// Duration in hours rounded to one decimal place.
    pub duration_hours: Option<f64>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<FeedEntry> for FeedRecordBody {
    fn from(entry: FeedEntry) -> Self {
        let record = entry.record();
        Self {
            id: record.id().to_string(),
            user: FeedUserBody {
                id: record.owner_id().to_string(),
                display_name: entry.owner_display_name().to_string(),
            },
            started_at: format_timestamp(record.started_at()),
            ended_at: record.ended_at().map(format_timestamp),
            duration_minutes: record.duration_minutes(),
            duration_hours: record.duration_minutes().map(minutes_to_hours),
            created_at: format_timestamp(record.created_at()),
        }
    }
}

/// Pagination envelope.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct PaginationBody {
    pub total_count: u64,
    pub current_count: u64,
    pub limit: u32,
    pub offset: u64,
    pub has_more: bool,
    pub next_offset: Option<u64>,
    pub previous_offset: Option<u64>,
}

impl From<PageInfo> for PaginationBody {
    fn from(info: PageInfo) -> Self {
        Self {
            total_count: info.total_count,
            current_count: info.current_count,
            limit: info.limit,
            offset: info.offset,
            has_more: info.has_more,
            next_offset: info.next_offset,
            previous_offset: info.previous_offset,
        }
    }
}

/// Duration figures over the whole filtered set.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct DurationStatsBody {
    pub average_minutes: i64,
    pub longest_minutes: i64,
    pub shortest_minutes: i64,
    pub total_sleep_hours: f64,
}

/// Statistics over every record that passed the filter, not just the page.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct StatisticsBody {
    pub total_records: u64,
    pub unique_users: u64,
    pub duration_stats: DurationStatsBody,
}

impl From<FeedStatistics> for StatisticsBody {
    fn from(stats: FeedStatistics) -> Self {
        Self {
            total_records: stats.total_records,
            unique_users: stats.unique_users,
            duration_stats: DurationStatsBody {
                average_minutes: stats.average_minutes,
                longest_minutes: stats.longest_minutes,
                shortest_minutes: stats.shortest_minutes,
                total_sleep_hours: stats.total_sleep_hours,
            },
        }
    }
}

/// Window the feed covers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DateRangeBody {
    pub days_back: u32,
    #[schema(format = "date-time")]
    pub from_date: String,
    #[schema(format = "date-time")]
    pub to_date: String,
}

impl From<FeedDateRange> for DateRangeBody {
    fn from(range: FeedDateRange) -> Self {
        Self {
            days_back: range.days_back,
            from_date: format_timestamp(range.from),
            to_date: format_timestamp(range.to),
        }
    }
}

/// Ordering applied to the page.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SortingBody {
    #[schema(example = "duration")]
    pub sort_by: String,
}

/// Visibility facts about the feed.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct PrivacyInfoBody {
    pub following_count: u64,
    /// Always false: the viewer's own records never appear.
    pub your_records_included: bool,
}

/// Sleep feed response envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SleepFeedResponse {
    pub sleep_records: Vec<FeedRecordBody>,
    pub pagination: PaginationBody,
    pub statistics: StatisticsBody,
    pub date_range: DateRangeBody,
    pub sorting: SortingBody,
    pub privacy_info: PrivacyInfoBody,
    /// Explanation attached to empty feeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<SleepFeed> for SleepFeedResponse {
    fn from(feed: SleepFeed) -> Self {
        Self {
            sleep_records: feed.entries.into_iter().map(FeedRecordBody::from).collect(),
            pagination: PaginationBody::from(feed.page),
            statistics: StatisticsBody::from(feed.statistics),
            date_range: DateRangeBody::from(feed.date_range),
            sorting: SortingBody {
                sort_by: feed.sort_key.as_str().to_owned(),
            },
            privacy_info: PrivacyInfoBody {
                following_count: feed.following_count,
                your_records_included: false,
            },
            message: feed.message,
        }
    }
}

/// Page through the completed sleep records of the users the caller follows.
#[utoipa::path(
    get,
    path = "/api/v1/sleep-feed",
    params(SleepFeedQueryParams),
    responses(
        (status = 200, description = "Feed page with statistics", body = SleepFeedResponse),
        (status = 400, description = "Invalid query parameter", body = ErrorSchema),
        (status = 401, description = "Missing or malformed X-User-Id", body = ErrorSchema),
        (status = 404, description = "Unknown viewer", body = ErrorSchema),
        (status = 503, description = "Record store unavailable", body = ErrorSchema)
    ),
    tags = ["sleep-feed"],
    operation_id = "getSleepFeed",
    security(("UserIdHeader" = []))
)]
#[get("/sleep-feed")]
pub async fn get_sleep_feed(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<SleepFeedQueryParams>,
) -> ApiResult<web::Json<SleepFeedResponse>> {
    let feed = state
        .sleep_feed
        .assemble_feed(SleepFeedRequest {
            viewer_id: caller.into_inner(),
            parameters: query.into_inner().into(),
        })
        .await?;
    Ok(web::Json(SleepFeedResponse::from(feed)))
}

#[cfg(test)]
#[path = "sleep_feed_tests.rs"]
mod tests;
