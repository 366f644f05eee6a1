//! Port for post persistence and feed queries.
//!
//! Feeds are ordered newest first; equal timestamps fall back to post id
//! descending so page boundaries stay stable between requests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{Post, PostBody, PostId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by post repository adapters.
    pub enum PostPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "post repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "post repository query failed: {message}",
    }
}

/// Post row to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    /// Identifier assigned by the service.
    pub id: PostId,
    /// Author of the post.
    pub author: UserId,
    /// Validated text.
    pub body: PostBody,
    /// Publication time from the service clock.
    pub created_at: DateTime<Utc>,
}

/// Port for post storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post.
    async fn create(&self, post: &NewPost) -> Result<(), PostPersistenceError>;

    /// Posts by `user` and by everyone `user` follows.
    async fn followed_feed(
        &self,
        user: &UserId,
        request: PageRequest,
    ) -> Result<Page<Post>, PostPersistenceError>;

    /// Posts by a single author.
    async fn by_author(
        &self,
        author: &UserId,
        request: PageRequest,
    ) -> Result<Page<Post>, PostPersistenceError>;

    /// Every post.
    async fn explore(&self, request: PageRequest) -> Result<Page<Post>, PostPersistenceError>;

    /// Delete every post by `author` whose body equals `body` exactly,
    /// returning how many were removed.
    async fn delete_by_body(&self, author: &UserId, body: &str)
    -> Result<u64, PostPersistenceError>;
}
