//! Driving port for publishing and deleting posts.

use async_trait::async_trait;

use crate::domain::{Error, Post, PostBody, UserId};

/// Domain use-case port for post mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostCommand: Send + Sync {
    /// Publish `body` as `author`.
    async fn publish(&self, author: &UserId, body: &PostBody) -> Result<Post, Error>;

    /// Delete every post by `username` whose text equals `body`.
    ///
    /// Only the author may delete their posts; anyone else receives
    /// [`crate::domain::ErrorCode::Forbidden`]. Returns the number removed.
    async fn delete_matching(&self, actor: &UserId, username: &str, body: &str)
    -> Result<u64, Error>;
}
