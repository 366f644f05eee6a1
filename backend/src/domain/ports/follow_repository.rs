//! Port for the follower relation.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by follow repository adapters.
    pub enum FollowPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "follow repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "follow repository query failed: {message}",
    }
}

/// Port for the `(follower, followed)` relation.
///
/// Both mutations are idempotent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Record that `follower` follows `followed`.
    async fn follow(&self, follower: &UserId, followed: &UserId)
    -> Result<(), FollowPersistenceError>;

    /// Remove the relation if present.
    async fn unfollow(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<(), FollowPersistenceError>;

    /// Whether `follower` follows `followed`.
    async fn is_following(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, FollowPersistenceError>;

    /// Number of users following `user`.
    async fn count_followers(&self, user: &UserId) -> Result<u64, FollowPersistenceError>;

    /// Number of users `user` follows.
    async fn count_following(&self, user: &UserId) -> Result<u64, FollowPersistenceError>;
}
