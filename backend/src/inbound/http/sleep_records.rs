//! Sleep session HTTP handlers.
//!
//! ```text
//! POST /api/v1/sleep-records/clock-in  {"started_at":"2026-03-09T23:00:00Z"}
//! POST /api/v1/sleep-records/clock-out {"ended_at":"2026-03-10T06:30:00Z"}
//! GET  /api/v1/sleep-records?limit=20
//! ```
//!
//! Both clock bodies are optional; an empty body uses the server clock.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{ClockInRequest, ClockOutRequest, ListOwnRecordsRequest};
use crate::domain::{Error, SleepRecord, minutes_to_hours};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::sleep_feed::format_timestamp;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_optional_json_body, parse_optional_rfc3339_timestamp,
};

/// Optional body for `POST /sleep-records/clock-in`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ClockInBody {
    /// When the session started. Defaults to now.
    #[schema(format = "date-time", example = "2026-03-09T23:00:00Z")]
    pub started_at: Option<String>,
}

/// Optional body for `POST /sleep-records/clock-out`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ClockOutBody {
    /// When the session ended. Defaults to now.
    #[schema(format = "date-time", example = "2026-03-10T06:30:00Z")]
    pub ended_at: Option<String>,
}

/// Query parameters for listing the caller's own records.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SleepRecordsQueryParams {
    /// Page size, 1-100 (default 20).
    #[param(value_type = Option<i64>, example = 20)]
    pub limit: Option<String>,
}

/// One sleep session owned by the caller.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SleepRecordBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub user_id: String,
    #[schema(format = "date-time")]
    pub started_at: String,
    #[schema(format = "date-time")]
    pub ended_at: Option<String>,
    pub duration_minutes: Option<i64>,
    pub duration_hours: Option<f64>,
    /// True while the session has not been clocked out.
    pub active: bool,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<SleepRecord> for SleepRecordBody {
    fn from(record: SleepRecord) -> Self {
        Self {
            id: record.id().to_string(),
            user_id: record.owner_id().to_string(),
            started_at: format_timestamp(record.started_at()),
            ended_at: record.ended_at().map(format_timestamp),
            duration_minutes: record.duration_minutes(),
            duration_hours: record.duration_minutes().map(minutes_to_hours),
            active: record.is_active(),
            created_at: format_timestamp(record.created_at()),
        }
    }
}

/// The caller's most recent records, newest first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SleepRecordListResponse {
    pub sleep_records: Vec<SleepRecordBody>,
    pub count: usize,
}

fn parse_limit(raw: Option<&str>) -> Result<Option<i64>, Error> {
    raw.map(|value| {
        value.trim().parse::<i64>().map_err(|_| {
            Error::invalid_request("limit must be an integer").with_details(json!({
                "field": "limit",
                "value": value,
                "code": "invalid_integer",
            }))
        })
    })
    .transpose()
}

/// Start a sleep session for the caller.
#[utoipa::path(
    post,
    path = "/api/v1/sleep-records/clock-in",
    request_body(content = ClockInBody, description = "Optional start time"),
    responses(
        (status = 201, description = "Session started", body = SleepRecordBody),
        (status = 400, description = "Invalid start time", body = ErrorSchema),
        (status = 401, description = "Missing or malformed X-User-Id", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 409, description = "Session already active or overlapping", body = ErrorSchema),
        (status = 503, description = "Record store unavailable", body = ErrorSchema)
    ),
    tags = ["sleep-records"],
    operation_id = "clockIn",
    security(("UserIdHeader" = []))
)]
#[post("/sleep-records/clock-in")]
pub async fn clock_in(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let payload: ClockInBody = parse_optional_json_body(&body)?;
    let started_at = parse_optional_rfc3339_timestamp(
        payload.started_at.as_deref(),
        FieldName::new("started_at"),
    )?;
    let record = state
        .sleep_tracking
        .clock_in(ClockInRequest {
            user_id: caller.into_inner(),
            started_at,
        })
        .await?;
    Ok(HttpResponse::Created().json(SleepRecordBody::from(record)))
}

/// Finish the caller's active sleep session.
#[utoipa::path(
    post,
    path = "/api/v1/sleep-records/clock-out",
    request_body(content = ClockOutBody, description = "Optional end time"),
    responses(
        (status = 200, description = "Session finished", body = SleepRecordBody),
        (status = 400, description = "Invalid end time", body = ErrorSchema),
        (status = 401, description = "Missing or malformed X-User-Id", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 409, description = "No active session", body = ErrorSchema),
        (status = 503, description = "Record store unavailable", body = ErrorSchema)
    ),
    tags = ["sleep-records"],
    operation_id = "clockOut",
    security(("UserIdHeader" = []))
)]
#[post("/sleep-records/clock-out")]
pub async fn clock_out(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    body: web::Bytes,
) -> ApiResult<web::Json<SleepRecordBody>> {
    let payload: ClockOutBody = parse_optional_json_body(&body)?;
    let ended_at =
        parse_optional_rfc3339_timestamp(payload.ended_at.as_deref(), FieldName::new("ended_at"))?;
    let record = state
        .sleep_tracking
        .clock_out(ClockOutRequest {
            user_id: caller.into_inner(),
            ended_at,
        })
        .await?;
    Ok(web::Json(SleepRecordBody::from(record)))
}

/// List the caller's own records, active session included.
#[utoipa::path(
    get,
    path = "/api/v1/sleep-records",
    params(SleepRecordsQueryParams),
    responses(
        (status = 200, description = "Own records, newest first", body = SleepRecordListResponse),
        (status = 400, description = "Invalid limit", body = ErrorSchema),
        (status = 401, description = "Missing or malformed X-User-Id", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 503, description = "Record store unavailable", body = ErrorSchema)
    ),
    tags = ["sleep-records"],
    operation_id = "listSleepRecords",
    security(("UserIdHeader" = []))
)]
#[get("/sleep-records")]
pub async fn list_sleep_records(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<SleepRecordsQueryParams>,
) -> ApiResult<web::Json<SleepRecordListResponse>> {
    let limit = parse_limit(query.limit.as_deref())?;
    let records = state
        .sleep_records
        .list_own(ListOwnRecordsRequest {
            user_id: caller.into_inner(),
            limit,
        })
        .await?;
    let sleep_records: Vec<SleepRecordBody> =
        records.into_iter().map(SleepRecordBody::from).collect();
    Ok(web::Json(SleepRecordListResponse {
        count: sleep_records.len(),
        sleep_records,
    }))
}
