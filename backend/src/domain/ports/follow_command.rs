//! Driving port for follow graph mutations.

use async_trait::async_trait;

use crate::domain::{Error, UserId};

/// `follower_id` starts or stops following `followee_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowRequest {
    pub follower_id: UserId,
    pub followee_id: UserId,
}

/// Driving port for follow and unfollow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowCommand: Send + Sync {
    /// Create the edge. Self-follows are `invalid_request`, unknown targets
    /// `not_found` and existing edges `conflict`.
    async fn follow(&self, request: FollowRequest) -> Result<(), Error>;

    /// Remove the edge, or fail with `not_found` when it does not exist.
    async fn unfollow(&self, request: FollowRequest) -> Result<(), Error>;
}
