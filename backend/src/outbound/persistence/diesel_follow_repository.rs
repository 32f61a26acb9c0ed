//! PostgreSQL-backed `FollowRepository` implementation using Diesel ORM.

use std::collections::BTreeSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{FollowRepository, FollowRepositoryError};
use crate::domain::{FollowEdge, FollowOutcome, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewFollowRow;
use super::pool::{DbPool, PoolError};
use super::schema::follows;

/// Diesel-backed implementation of the follow graph port.
#[derive(Clone)]
pub struct DieselFollowRepository {
    pool: DbPool,
}

impl DieselFollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FollowRepositoryError {
    map_basic_pool_error(error, |message| FollowRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> FollowRepositoryError {
    map_basic_diesel_error(
        error,
        FollowRepositoryError::query,
        FollowRepositoryError::connection,
    )
}

#[async_trait]
impl FollowRepository for DieselFollowRepository {
    async fn followees(
        &self,
        follower: &UserId,
    ) -> Result<BTreeSet<UserId>, FollowRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<Uuid> = follows::table
            .filter(follows::follower_id.eq(follower.as_uuid()))
            .select(follows::followee_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }

    async fn follow(&self, edge: &FollowEdge) -> Result<FollowOutcome, FollowRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewFollowRow {
            follower_id: *edge.follower().as_uuid(),
            followee_id: *edge.followee().as_uuid(),
        };
        let inserted = diesel::insert_into(follows::table)
            .values(&row)
            .on_conflict((follows::follower_id, follows::followee_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(if inserted == 0 {
            FollowOutcome::AlreadyFollowing
        } else {
            FollowOutcome::Created
        })
    }

    async fn unfollow(&self, edge: &FollowEdge) -> Result<bool, FollowRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            follows::table
                .filter(follows::follower_id.eq(edge.follower().as_uuid()))
                .filter(follows::followee_id.eq(edge.followee().as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
