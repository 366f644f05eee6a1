//! Driving port for reading the signed-in account.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for account lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Load the account behind a session. A session pointing at a deleted
    /// account yields [`crate::domain::ErrorCode::Unauthorized`].
    async fn current_user(&self, user: &UserId) -> Result<User, Error>;
}
