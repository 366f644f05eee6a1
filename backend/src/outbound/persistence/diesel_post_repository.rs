//! PostgreSQL-backed `PostRepository` implementation using Diesel ORM.
//!
//! Every feed is the same `posts ⋈ users` join narrowed by a [`FeedScope`];
//! the page and its total are read with two queries built from that scope.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{NewPost, PostPersistenceError, PostRepository};
use crate::domain::{Post, PostAuthor, PostBody, PostId, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_user_repository::row_to_user;
use super::models::{NewPostRow, PostRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{followers, posts, users};

type FeedQuery = diesel::helper_types::IntoBoxed<
    'static,
    diesel::helper_types::InnerJoin<posts::table, users::table>,
    Pg,
>;

#[derive(Debug, Clone, Copy)]
enum FeedScope {
    All,
    Author(Uuid),
    Followed(Uuid),
}

impl FeedScope {
    fn query(self) -> FeedQuery {
        let query = posts::table.inner_join(users::table).into_boxed();
        match self {
            Self::All => query,
            Self::Author(author) => query.filter(posts::user_id.eq(author)),
            Self::Followed(me) => query.filter(
                posts::user_id.eq(me).or(posts::user_id.eq_any(
                    followers::table
                        .filter(followers::follower_id.eq(me))
                        .select(followers::followed_id),
                )),
            ),
        }
    }
}

/// Diesel-backed implementation of the `PostRepository` port.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_page(
        &self,
        scope: FeedScope,
        request: PageRequest,
    ) -> Result<Page<Post>, PostPersistenceError> {
        let limit = to_sql_bound(request.limit())?;
        let offset = to_sql_bound(request.offset())?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = scope
            .query()
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<(PostRow, UserRow)> = scope
            .query()
            .select((PostRow::as_select(), UserRow::as_select()))
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_post)
            .collect::<Result<Vec<_>, _>>()?;
        let total = u64::try_from(total)
            .map_err(|_| PostPersistenceError::query("negative post count"))?;
        Ok(Page::new(request, items, total))
    }
}

fn map_pool_error(error: PoolError) -> PostPersistenceError {
    map_basic_pool_error(error, PostPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PostPersistenceError {
    map_basic_diesel_error(
        error,
        PostPersistenceError::query,
        PostPersistenceError::connection,
    )
}

fn to_sql_bound(value: u64) -> Result<i64, PostPersistenceError> {
    i64::try_from(value).map_err(|_| PostPersistenceError::query("page offset out of range"))
}

fn row_to_post((post, author): (PostRow, UserRow)) -> Result<Post, PostPersistenceError> {
    let body = PostBody::new(&post.body)
        .map_err(|err| PostPersistenceError::query(format!("stored post body is invalid: {err}")))?;
    let author = row_to_user(author)
        .map_err(|err| PostPersistenceError::query(format!("stored author is invalid: {err}")))?;
    Ok(Post::new(
        PostId::from(post.id),
        body,
        post.created_at,
        PostAuthor {
            id: *author.id(),
            username: author.username().clone(),
            avatar: author.avatar().cloned(),
        },
    ))
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn create(&self, post: &NewPost) -> Result<(), PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewPostRow {
            id: *post.id.as_uuid(),
            body: post.body.as_ref(),
            created_at: post.created_at,
            user_id: *post.author.as_uuid(),
        };
        diesel::insert_into(posts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn followed_feed(
        &self,
        user: &UserId,
        request: PageRequest,
    ) -> Result<Page<Post>, PostPersistenceError> {
        self.load_page(FeedScope::Followed(*user.as_uuid()), request)
            .await
    }

    async fn by_author(
        &self,
        author: &UserId,
        request: PageRequest,
    ) -> Result<Page<Post>, PostPersistenceError> {
        self.load_page(FeedScope::Author(*author.as_uuid()), request)
            .await
    }

    async fn explore(&self, request: PageRequest) -> Result<Page<Post>, PostPersistenceError> {
        self.load_page(FeedScope::All, request).await
    }

    async fn delete_by_body(
        &self,
        author: &UserId,
        body: &str,
    ) -> Result<u64, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            posts::table
                .filter(posts::user_id.eq(author.as_uuid()))
                .filter(posts::body.eq(body)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed as u64)
    }
}
