//! Driving port for following and unfollowing users.

use async_trait::async_trait;

use crate::domain::{Error, UserId, Username};

/// Domain use-case port for the social graph.
///
/// Unknown targets yield [`crate::domain::ErrorCode::NotFound`]; targeting
/// oneself yields [`crate::domain::ErrorCode::InvalidRequest`]. Both
/// operations are idempotent and return the target's canonical username.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowCommand: Send + Sync {
    /// Follow the user called `username`.
    async fn follow(&self, me: &UserId, username: &str) -> Result<Username, Error>;

    /// Stop following the user called `username`.
    async fn unfollow(&self, me: &UserId, username: &str) -> Result<Username, Error>;
}
