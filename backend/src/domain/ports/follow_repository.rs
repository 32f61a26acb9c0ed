//! Port for the follow graph.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{FollowEdge, FollowOutcome, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by follow repository adapters.
    pub enum FollowRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "follow repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "follow repository query failed: {message}",
    }
}

/// Storage for directed follow edges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Every user `follower` follows, fetched in one query.
    async fn followees(&self, follower: &UserId)
    -> Result<BTreeSet<UserId>, FollowRepositoryError>;

    /// Record an edge. Existing edges are left untouched.
    async fn follow(&self, edge: &FollowEdge) -> Result<FollowOutcome, FollowRepositoryError>;

    /// Remove an edge, returning whether one existed.
    async fn unfollow(&self, edge: &FollowEdge) -> Result<bool, FollowRepositoryError>;
}

/// Fixture implementation with an empty graph.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFollowRepository;

#[async_trait]
impl FollowRepository for FixtureFollowRepository {
    async fn followees(
        &self,
        _follower: &UserId,
    ) -> Result<BTreeSet<UserId>, FollowRepositoryError> {
        Ok(BTreeSet::new())
    }

    async fn follow(&self, _edge: &FollowEdge) -> Result<FollowOutcome, FollowRepositoryError> {
        Ok(FollowOutcome::Created)
    }

    async fn unfollow(&self, _edge: &FollowEdge) -> Result<bool, FollowRepositoryError> {
        Ok(false)
    }
}
