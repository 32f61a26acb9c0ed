//! Follow graph service implementing [`FollowCommand`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::store_error_mapping::{map_follow_error, map_user_error};
use crate::domain::ports::{FollowCommand, FollowRepository, FollowRequest, UserRepository};
use crate::domain::{Error, FollowEdge, FollowOutcome};

/// Follow service over the user and follow repositories.
#[derive(Clone)]
pub struct FollowService<U, F> {
    users: Arc<U>,
    follows: Arc<F>,
}

impl<U, F> FollowService<U, F> {
    pub fn new(users: Arc<U>, follows: Arc<F>) -> Self {
        Self { users, follows }
    }
}

fn edge_for(request: FollowRequest) -> Result<FollowEdge, Error> {
    FollowEdge::new(request.follower_id, request.followee_id)
        .map_err(|err| Error::invalid_request(err.to_string()))
}

#[async_trait]
impl<U, F> FollowCommand for FollowService<U, F>
where
    U: UserRepository,
    F: FollowRepository,
{
    async fn follow(&self, request: FollowRequest) -> Result<(), Error> {
        let edge = edge_for(request)?;
        for user_id in [edge.follower(), edge.followee()] {
            if !self.users.exists(user_id).await.map_err(map_user_error)? {
                return Err(Error::not_found(format!("user {user_id} not found")));
            }
        }

        match self.follows.follow(&edge).await.map_err(map_follow_error)? {
            FollowOutcome::Created => {
                info!(
                    target: "slumber::audit",
                    follower_id = %edge.follower(),
                    followee_id = %edge.followee(),
                    "follow created"
                );
                Ok(())
            }
            FollowOutcome::AlreadyFollowing => Err(Error::conflict(format!(
                "already following user {}",
                edge.followee()
            ))),
        }
    }

    async fn unfollow(&self, request: FollowRequest) -> Result<(), Error> {
        let edge = edge_for(request)?;
        let removed = self
            .follows
            .unfollow(&edge)
            .await
            .map_err(map_follow_error)?;
        if !removed {
            return Err(Error::not_found(format!(
                "not following user {}",
                edge.followee()
            )));
        }

        info!(
            target: "slumber::audit",
            follower_id = %edge.follower(),
            followee_id = %edge.followee(),
            "follow removed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for follow validation and outcome mapping.
    use mockall::predicate::always;
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{FollowRepositoryError, MockFollowRepository, MockUserRepository};
    use crate::domain::{ErrorCode, UserId};

    fn request() -> FollowRequest {
        FollowRequest {
            follower_id: UserId::random(),
            followee_id: UserId::random(),
        }
    }

    fn known_users() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_exists().returning(|_| Ok(true));
        users
    }

    fn service(
        users: MockUserRepository,
        follows: MockFollowRepository,
    ) -> FollowService<MockUserRepository, MockFollowRepository> {
        FollowService::new(Arc::new(users), Arc::new(follows))
    }

    #[rstest]
    #[tokio::test]
    async fn follow_creates_edge() {
        let mut follows = MockFollowRepository::new();
        follows
            .expect_follow()
            .with(always())
            .times(1)
            .return_once(|_| Ok(FollowOutcome::Created));

        service(known_users(), follows)
            .follow(request())
            .await
            .expect("follow succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn self_follow_is_invalid() {
        let id = UserId::random();
        let mut follows = MockFollowRepository::new();
        follows.expect_follow().times(0);

        let error = service(MockUserRepository::new(), follows)
            .follow(FollowRequest {
                follower_id: id.clone(),
                followee_id: id,
            })
            .await
            .expect_err("self follow");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_followee_is_not_found() {
        let request = request();
        let followee = request.followee_id.clone();
        let mut users = MockUserRepository::new();
        users
            .expect_exists()
            .returning(move |id| Ok(*id != followee));
        let mut follows = MockFollowRepository::new();
        follows.expect_follow().times(0);

        let error = service(users, follows)
            .follow(request)
            .await
            .expect_err("unknown followee");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_follow_conflicts() {
        let mut follows = MockFollowRepository::new();
        follows
            .expect_follow()
            .return_once(|_| Ok(FollowOutcome::AlreadyFollowing));

        let error = service(known_users(), follows)
            .follow(request())
            .await
            .expect_err("duplicate");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case(true, None)]
    #[case(false, Some(ErrorCode::NotFound))]
    #[tokio::test]
    async fn unfollow_maps_missing_edges(
        #[case] removed: bool,
        #[case] expected: Option<ErrorCode>,
    ) {
        let mut follows = MockFollowRepository::new();
        follows
            .expect_unfollow()
            .return_once(move |_| Ok(removed));

        let result = service(MockUserRepository::new(), follows)
            .unfollow(request())
            .await;

        assert_eq!(result.err().map(|error| error.code()), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn store_outage_is_service_unavailable() {
        let mut follows = MockFollowRepository::new();
        follows
            .expect_unfollow()
            .return_once(|_| Err(FollowRepositoryError::connection("refused")));

        let error = service(MockUserRepository::new(), follows)
            .unfollow(request())
            .await
            .expect_err("outage");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
