//! Follow graph HTTP handlers.
//!
//! ```text
//! POST   /api/v1/follows/{user_id}
//! DELETE /api/v1/follows/{user_id}
//! ```

use actix_web::{HttpResponse, delete, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::UserId;
use crate::domain::ports::FollowRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_user_id};

/// Follow relationship created by `POST /follows/{user_id}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FollowBody {
    #[schema(format = "uuid")]
    pub follower_id: String,
    #[schema(format = "uuid")]
    pub followee_id: String,
}

fn follow_request(caller: AuthenticatedUser, target: &str) -> ApiResult<FollowRequest> {
    let followee_id: UserId = parse_user_id(target, FieldName::new("user_id"))?;
    Ok(FollowRequest {
        follower_id: caller.into_inner(),
        followee_id,
    })
}

/// Start following `user_id`.
#[utoipa::path(
    post,
    path = "/api/v1/follows/{user_id}",
    params(("user_id" = String, Path, description = "User to follow", format = "uuid")),
    responses(
        (status = 201, description = "Now following", body = FollowBody),
        (status = 400, description = "Malformed id or self-follow", body = ErrorSchema),
        (status = 401, description = "Missing or malformed X-User-Id", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 409, description = "Already following", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["follows"],
    operation_id = "followUser",
    security(("UserIdHeader" = []))
)]
#[post("/follows/{user_id}")]
pub async fn follow_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let request = follow_request(caller, &path)?;
    let body = FollowBody {
        follower_id: request.follower_id.to_string(),
        followee_id: request.followee_id.to_string(),
    };
    state.follows.follow(request).await?;
    Ok(HttpResponse::Created().json(body))
}

/// Stop following `user_id`.
#[utoipa::path(
    delete,
    path = "/api/v1/follows/{user_id}",
    params(("user_id" = String, Path, description = "User to unfollow", format = "uuid")),
    responses(
        (status = 204, description = "No longer following"),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Missing or malformed X-User-Id", body = ErrorSchema),
        (status = 404, description = "Not following this user", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["follows"],
    operation_id = "unfollowUser",
    security(("UserIdHeader" = []))
)]
#[delete("/follows/{user_id}")]
pub async fn unfollow_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let request = follow_request(caller, &path)?;
    state.follows.unfollow(request).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    //! Follow and unfollow round trips through the feed.
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::{fixture, rstest};
    use serde_json::Value;

    use crate::inbound::http::auth::USER_ID_HEADER;
    use crate::inbound::http::test_utils::{
        completed, fixed_now, register, state_over, test_app,
    };
    use crate::test_support::{FixedClock, InMemorySleepStore};

    const VIEWER: &str = "00000000-0000-0000-0000-0000000000a1";
    const ADA: &str = "00000000-0000-0000-0000-0000000000b1";
    const MISSING: &str = "00000000-0000-0000-0000-0000000000ff";

    #[fixture]
    fn store() -> InMemorySleepStore {
        let store = InMemorySleepStore::new();
        register(&store, VIEWER, "Viewer");
        let ada = register(&store, ADA, "Ada");
        completed(
            &store,
            "00000000-0000-0000-0000-0000000000c1",
            &ada,
            "2026-03-09T22:00:00Z",
            "2026-03-10T06:00:00Z",
        );
        store
    }

    async fn call(
        store: &InMemorySleepStore,
        request: actix_test::TestRequest,
    ) -> (StatusCode, Option<Value>) {
        let app = actix_test::init_service(test_app(state_over(
            store,
            Arc::new(FixedClock::new(fixed_now())),
        )))
        .await;
        let response = actix_test::call_service(
            &app,
            request.insert_header((USER_ID_HEADER, VIEWER)).to_request(),
        )
        .await;
        let status = response.status();
        let bytes = actix_test::read_body(response).await;
        let body = (!bytes.is_empty())
            .then(|| serde_json::from_slice(&bytes).expect("JSON body"));
        (status, body)
    }

    fn follow(target: &str) -> actix_test::TestRequest {
        actix_test::TestRequest::post().uri(&format!("/api/v1/follows/{target}"))
    }

    fn unfollow(target: &str) -> actix_test::TestRequest {
        actix_test::TestRequest::delete().uri(&format!("/api/v1/follows/{target}"))
    }

    fn feed() -> actix_test::TestRequest {
        actix_test::TestRequest::get().uri("/api/v1/sleep-feed")
    }

    #[rstest]
    #[actix_web::test]
    async fn following_brings_records_into_the_feed(store: InMemorySleepStore) {
        let (status, body) = call(&store, follow(ADA)).await;
        assert_eq!(status, StatusCode::CREATED);
        let body = body.expect("follow body");
        assert_eq!(body["follower_id"], VIEWER);
        assert_eq!(body["followee_id"], ADA);

        let (_, feed_body) = call(&store, feed()).await;
        let feed_body = feed_body.expect("feed body");
        assert_eq!(feed_body["privacy_info"]["following_count"], 1);
        assert_eq!(feed_body["pagination"]["total_count"], 1);
    }

    #[rstest]
    #[actix_web::test]
    async fn unfollowing_removes_records_from_the_feed(store: InMemorySleepStore) {
        call(&store, follow(ADA)).await;

        let (status, body) = call(&store, unfollow(ADA)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_none());

        let (_, feed_body) = call(&store, feed()).await;
        assert_eq!(
            feed_body.expect("feed body")["pagination"]["total_count"],
            0
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_follow_conflicts(store: InMemorySleepStore) {
        call(&store, follow(ADA)).await;

        let (status, body) = call(&store, follow(ADA)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.expect("error body")["code"], "conflict");
    }

    #[rstest]
    #[case(follow(VIEWER), StatusCode::BAD_REQUEST, "invalid_request")]
    #[case(follow("not-a-uuid"), StatusCode::BAD_REQUEST, "invalid_request")]
    #[case(follow(MISSING), StatusCode::NOT_FOUND, "not_found")]
    #[case(unfollow(ADA), StatusCode::NOT_FOUND, "not_found")]
    #[actix_web::test]
    async fn invalid_follow_changes_are_rejected(
        store: InMemorySleepStore,
        #[case] request: actix_test::TestRequest,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let (actual, body) = call(&store, request).await;

        assert_eq!(actual, status);
        assert_eq!(body.expect("error body")["code"], code);
    }
}
