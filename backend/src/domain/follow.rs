//! Directed follow relationships between users.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::UserId;

/// Validation errors raised when constructing a [`FollowEdge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowValidationError {
    SelfFollow,
}

impl fmt::Display for FollowValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfFollow => write!(f, "users cannot follow themselves"),
        }
    }
}

impl std::error::Error for FollowValidationError {}

/// Directed edge meaning `follower` sees `followee`'s records.
///
/// ## Invariants
/// - `follower != followee`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FollowEdge {
    follower: UserId,
    followee: UserId,
}

impl FollowEdge {
    /// Build an edge, rejecting self-follows.
    ///
    /// # Examples
    /// ```
    /// use slumber::domain::{FollowEdge, UserId};
    ///
    /// let viewer = UserId::random();
    /// assert!(FollowEdge::new(viewer.clone(), viewer).is_err());
    /// ```
    pub fn new(follower: UserId, followee: UserId) -> Result<Self, FollowValidationError> {
        if follower == followee {
            return Err(FollowValidationError::SelfFollow);
        }
        Ok(Self { follower, followee })
    }

    /// User doing the following.
    pub fn follower(&self) -> &UserId {
        &self.follower
    }

    /// User being followed.
    pub fn followee(&self) -> &UserId {
        &self.followee
    }
}

/// Result of recording a follow edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    /// The edge was newly recorded.
    Created,
    /// The edge already existed.
    AlreadyFollowing,
}
