//! Port abstraction for user lookups.
use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Read access to the user table. Users are managed elsewhere.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Whether a user with this id exists.
    async fn exists(&self, id: &UserId) -> Result<bool, UserPersistenceError>;
}

/// Fixture implementation that treats every id as a known user.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn exists(&self, _id: &UserId) -> Result<bool, UserPersistenceError> {
        Ok(true)
    }
}
