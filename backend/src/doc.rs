//! OpenAPI documentation.
//!
//! [`ApiDoc`] registers every REST endpoint, the response bodies and the
//! `X-User-Id` header scheme. Swagger UI serves it in debug builds and the
//! `openapi-dump` binary prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::follows::FollowBody;
use crate::inbound::http::health::ProbeBody;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::sleep_feed::{
    DateRangeBody, DurationStatsBody, FeedRecordBody, FeedUserBody, PaginationBody,
    PrivacyInfoBody, SleepFeedResponse, SortingBody, StatisticsBody,
};
use crate::inbound::http::sleep_records::{
    ClockInBody, ClockOutBody, SleepRecordBody, SleepRecordListResponse,
};

/// Registers the caller identification header as a security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "UserIdHeader",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "X-User-Id",
                "UUID of the calling user.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Slumber API",
        description = "Sleep tracking with a social feed of followed users' sleep."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("UserIdHeader" = [])),
    paths(
        crate::inbound::http::sleep_feed::get_sleep_feed,
        crate::inbound::http::sleep_records::clock_in,
        crate::inbound::http::sleep_records::clock_out,
        crate::inbound::http::sleep_records::list_sleep_records,
        crate::inbound::http::follows::follow_user,
        crate::inbound::http::follows::unfollow_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        SleepFeedResponse,
        FeedRecordBody,
        FeedUserBody,
        PaginationBody,
        StatisticsBody,
        DurationStatsBody,
        DateRangeBody,
        SortingBody,
        PrivacyInfoBody,
        ClockInBody,
        ClockOutBody,
        SleepRecordBody,
        SleepRecordListResponse,
        FollowBody,
        ProbeBody,
    )),
    tags(
        (name = "sleep-feed", description = "Followed users' completed sleep"),
        (name = "sleep-records", description = "Clocking in and out of sleep sessions"),
        (name = "follows", description = "Follow graph changes"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Shape checks on the generated document.
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    fn assert_has_fields(schema: &RefOr<Schema>, fields: &[&str]) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                for field in fields {
                    assert!(
                        obj.properties.contains_key(*field),
                        "schema should have field '{field}'"
                    );
                }
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn feed_envelope_is_documented() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let feed = schemas.get("SleepFeedResponse").expect("feed schema");

        assert_has_fields(
            feed,
            &[
                "sleep_records",
                "pagination",
                "statistics",
                "date_range",
                "sorting",
                "privacy_info",
                "message",
            ],
        );
        assert_has_fields(
            schemas.get("crate.domain.Error").expect("error schema"),
            &["code", "message", "traceId", "details"],
        );
    }

    #[rstest]
    #[case("/api/v1/sleep-feed")]
    #[case("/api/v1/sleep-records")]
    #[case("/api/v1/sleep-records/clock-in")]
    #[case("/api/v1/sleep-records/clock-out")]
    #[case("/api/v1/follows/{user_id}")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn every_endpoint_is_listed(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn user_id_header_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        let scheme = components
            .security_schemes
            .get("UserIdHeader")
            .expect("UserIdHeader scheme");
        let json = serde_json::to_value(scheme).expect("scheme serialises");

        assert_eq!(json["in"], "header");
        assert_eq!(json["name"], "X-User-Id");
    }
}
