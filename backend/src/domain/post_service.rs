//! Post domain service: publishing, deletion and feeds.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use crate::domain::account_service::map_user_error;
use crate::domain::ports::{
    FeedQuery, NewPost, PostCommand, PostPersistenceError, PostRepository, UserRepository,
};
use crate::domain::social_service::resolve_user;
use crate::domain::{Error, Post, PostAuthor, PostBody, PostId, UserId};

fn map_post_error(error: PostPersistenceError) -> Error {
    match error {
        PostPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("post repository unavailable: {message}"))
        }
        PostPersistenceError::Query { message } => {
            Error::internal(format!("post repository error: {message}"))
        }
    }
}

/// Service implementing the post command and feed query ports.
#[derive(Clone)]
pub struct PostService<U, P> {
    users: Arc<U>,
    posts: Arc<P>,
    clock: Arc<dyn Clock>,
    per_page: u32,
}

impl<U, P> PostService<U, P> {
    /// Create a service paging feeds by `per_page` posts.
    pub fn new(users: Arc<U>, posts: Arc<P>, clock: Arc<dyn Clock>, per_page: u32) -> Self {
        Self {
            users,
            posts,
            clock,
            per_page,
        }
    }

    fn page_request(&self, page: u32) -> Result<PageRequest, Error> {
        PageRequest::new(page, self.per_page)
            .map_err(|err| Error::internal(format!("invalid feed page size: {err}")))
    }
}

#[async_trait]
impl<U, P> PostCommand for PostService<U, P>
where
    U: UserRepository,
    P: PostRepository,
{
    async fn publish(&self, author: &UserId, body: &PostBody) -> Result<Post, Error> {
        let user = self
            .users
            .find_by_id(author)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))?;
        let post = NewPost {
            id: PostId::random(),
            author: *author,
            body: body.clone(),
            created_at: self.clock.utc(),
        };
        self.posts.create(&post).await.map_err(map_post_error)?;
        info!(post_id = %post.id, author = %author, "post published");

        Ok(Post::new(
            post.id,
            post.body,
            post.created_at,
            PostAuthor {
                id: *user.id(),
                username: user.username().clone(),
                avatar: user.avatar().cloned(),
            },
        ))
    }

    async fn delete_matching(
        &self,
        actor: &UserId,
        username: &str,
        body: &str,
    ) -> Result<u64, Error> {
        let owner = resolve_user(self.users.as_ref(), username).await?;
        if owner.id() != actor {
            return Err(Error::forbidden("You can only delete your own posts."));
        }
        let removed = self
            .posts
            .delete_by_body(owner.id(), body)
            .await
            .map_err(map_post_error)?;
        info!(author = %actor, removed, "posts deleted");
        Ok(removed)
    }
}

#[async_trait]
impl<U, P> FeedQuery for PostService<U, P>
where
    U: UserRepository,
    P: PostRepository,
{
    async fn home_feed(&self, me: &UserId, page: u32) -> Result<Page<Post>, Error> {
        let request = self.page_request(page)?;
        self.posts
            .followed_feed(me, request)
            .await
            .map_err(map_post_error)
    }

    async fn user_feed(&self, username: &str, page: u32) -> Result<Page<Post>, Error> {
        let request = self.page_request(page)?;
        let author = resolve_user(self.users.as_ref(), username).await?;
        self.posts
            .by_author(author.id(), request)
            .await
            .map_err(map_post_error)
    }

    async fn explore(&self, page: u32) -> Result<Page<Post>, Error> {
        let request = self.page_request(page)?;
        self.posts.explore(request).await.map_err(map_post_error)
    }
}
