//! Cache keys for feed read-through entries.
use crate::domain::UserId;

const KEY_PREFIX: &str = "slumber:v1";

/// Namespaced cache key for one user's cached feed inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedCacheKey(String);

impl FeedCacheKey {
    /// Key holding the set of users `follower` follows.
    ///
    /// # Examples
    /// ```
    /// use slumber::domain::UserId;
    /// use slumber::domain::ports::FeedCacheKey;
    ///
    /// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
    /// assert_eq!(
    ///     FeedCacheKey::followees(&id).as_str(),
    ///     "slumber:v1:followees:3fa85f64-5717-4562-b3fc-2c963f66afa6"
    /// );
    /// ```
    pub fn followees(follower: &UserId) -> Self {
        Self(format!("{KEY_PREFIX}:followees:{follower}"))
    }

    /// Key holding `owner`'s complete records since a cut-off.
    pub fn owner_records(owner: &UserId) -> Self {
        Self(format!("{KEY_PREFIX}:records:{owner}"))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for FeedCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for FeedCacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    //! Validates key namespacing.
    use super::FeedCacheKey;
    use crate::domain::UserId;
    use rstest::rstest;

    #[rstest]
    fn keys_are_namespaced_per_user_and_kind() {
        let first = UserId::random();
        let second = UserId::random();

        assert_ne!(
            FeedCacheKey::followees(&first),
            FeedCacheKey::owner_records(&first)
        );
        assert_ne!(
            FeedCacheKey::owner_records(&first),
            FeedCacheKey::owner_records(&second)
        );
        assert!(
            FeedCacheKey::owner_records(&first)
                .as_str()
                .starts_with("slumber:v1:records:")
        );
    }
}
