//! Read-through caching for follow sets.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::ports::{FeedCache, FeedCacheKey, FollowRepository, FollowRepositoryError};
use crate::domain::{FollowEdge, FollowOutcome, UserId};

/// Serves followee sets from the cache and drops the follower's entry on
/// every graph change.
pub struct CachedFollowRepository<R, C> {
    inner: R,
    cache: Arc<C>,
}

impl<R, C> CachedFollowRepository<R, C> {
    pub fn new(inner: R, cache: Arc<C>) -> Self {
        Self { inner, cache }
    }
}

impl<R, C> CachedFollowRepository<R, C>
where
    C: FeedCache,
{
    async fn invalidate(&self, follower: &UserId) {
        let key = FeedCacheKey::followees(follower);
        if let Err(error) = self.cache.invalidate(&key).await {
            warn!(%key, %error, "feed cache invalidation failed");
        }
    }
}

#[async_trait]
impl<R, C> FollowRepository for CachedFollowRepository<R, C>
where
    R: FollowRepository,
    C: FeedCache,
{
    async fn followees(
        &self,
        follower: &UserId,
    ) -> Result<BTreeSet<UserId>, FollowRepositoryError> {
        match self.cache.followees(follower).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(error) => warn!(%follower, %error, "followee cache read failed"),
        }

        let followees = self.inner.followees(follower).await?;
        if let Err(error) = self.cache.store_followees(follower, &followees).await {
            warn!(%follower, %error, "followee cache write failed");
        }
        Ok(followees)
    }

    async fn follow(&self, edge: &FollowEdge) -> Result<FollowOutcome, FollowRepositoryError> {
        let outcome = self.inner.follow(edge).await?;
        if outcome == FollowOutcome::Created {
            self.invalidate(edge.follower()).await;
        }
        Ok(outcome)
    }

    async fn unfollow(&self, edge: &FollowEdge) -> Result<bool, FollowRepositoryError> {
        let removed = self.inner.unfollow(edge).await?;
        if removed {
            self.invalidate(edge.follower()).await;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    //! Behavioural coverage for followee caching.
    use rstest::{fixture, rstest};

    use super::*;
    use crate::test_support::{InMemoryFeedCache, InMemorySleepStore};

    struct Harness {
        store: InMemorySleepStore,
        cache: InMemoryFeedCache,
        repo: CachedFollowRepository<InMemorySleepStore, InMemoryFeedCache>,
    }

    #[fixture]
    fn harness() -> Harness {
        let store = InMemorySleepStore::new();
        let cache = InMemoryFeedCache::new();
        let repo = CachedFollowRepository::new(store.clone(), Arc::new(cache.clone()));
        Harness { store, cache, repo }
    }

    #[rstest]
    #[tokio::test]
    async fn second_read_is_served_from_cache(harness: Harness) {
        let follower = UserId::random();
        let edge = FollowEdge::new(follower.clone(), UserId::random()).expect("distinct users");
        harness.store.add_follow(&edge);

        let first = harness.repo.followees(&follower).await.expect("first read");
        let second = harness.repo.followees(&follower).await.expect("second read");

        assert_eq!(first, second);
        assert_eq!(harness.store.followee_reads(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn follow_and_unfollow_drop_the_follower_entry(harness: Harness) {
        let follower = UserId::random();
        let followee = UserId::random();
        let edge = FollowEdge::new(follower.clone(), followee.clone()).expect("distinct users");

        assert!(harness.repo.followees(&follower).await.expect("read").is_empty());
        harness.repo.follow(&edge).await.expect("follow");
        let after_follow = harness.repo.followees(&follower).await.expect("read");
        harness.repo.unfollow(&edge).await.expect("unfollow");
        let after_unfollow = harness.repo.followees(&follower).await.expect("read");

        assert!(after_follow.contains(&followee));
        assert!(after_unfollow.is_empty());
        assert_eq!(
            harness.cache.invalidated(),
            vec![
                FeedCacheKey::followees(&follower),
                FeedCacheKey::followees(&follower)
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn repeated_follow_keeps_the_cached_entry(harness: Harness) {
        let edge = FollowEdge::new(UserId::random(), UserId::random()).expect("distinct users");
        harness.store.add_follow(&edge);

        let outcome = harness.repo.follow(&edge).await.expect("follow");

        assert_eq!(outcome, FollowOutcome::AlreadyFollowing);
        assert!(harness.cache.invalidated().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn cache_failures_fall_back_to_the_store(harness: Harness) {
        let follower = UserId::random();
        let edge = FollowEdge::new(follower.clone(), UserId::random()).expect("distinct users");
        harness.store.add_follow(&edge);
        harness.cache.set_failing(true);

        let first = harness.repo.followees(&follower).await.expect("first read");
        let second = harness.repo.followees(&follower).await.expect("second read");

        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
        assert_eq!(harness.store.followee_reads(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn store_errors_propagate(harness: Harness) {
        harness.store.set_unavailable(true);

        let result = harness.repo.followees(&UserId::random()).await;

        assert!(matches!(
            result,
            Err(FollowRepositoryError::Connection { .. })
        ));
    }
}
