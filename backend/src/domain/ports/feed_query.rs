//! Driving port for paginated feeds.

use async_trait::async_trait;
use pagination::Page;

use crate::domain::{Error, Post, UserId};

/// Domain use-case port for reading feeds, newest first.
///
/// `page` is 1-based; the page size is fixed by the implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedQuery: Send + Sync {
    /// Posts by `me` and the users `me` follows.
    async fn home_feed(&self, me: &UserId, page: u32) -> Result<Page<Post>, Error>;

    /// Posts by `username`; unknown users yield
    /// [`crate::domain::ErrorCode::NotFound`].
    async fn user_feed(&self, username: &str, page: u32) -> Result<Page<Post>, Error>;

    /// Every post.
    async fn explore(&self, page: u32) -> Result<Page<Post>, Error>;
}
