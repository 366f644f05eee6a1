//! In-memory repositories for development servers and tests.
//!
//! One [`InMemoryStore`] backs the user, post and follow ports so feeds can
//! join posts with their authors the same way the SQL adapter does. State is
//! guarded by a `std::sync::Mutex`; no lock is held across an `.await`.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    FollowPersistenceError, FollowRepository, NewPost, PostPersistenceError, PostRepository,
    StoredCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AboutMe, AvatarPath, EmailAddress, PasswordHash, Post, PostAuthor, PostBody, PostId, User,
    UserId, Username,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: PasswordHash,
}

#[derive(Debug, Clone)]
struct StoredPost {
    id: PostId,
    author: UserId,
    body: PostBody,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, StoredUser>,
    posts: Vec<StoredPost>,
    follows: BTreeSet<(UserId, UserId)>,
}

impl State {
    fn user_by_name(&self, username: &Username) -> Option<&StoredUser> {
        self.users
            .values()
            .find(|stored| stored.user.username() == username)
    }

    fn username_used_by_other(&self, username: &Username, except: Option<&UserId>) -> bool {
        self.users
            .values()
            .any(|stored| stored.user.username() == username && Some(stored.user.id()) != except)
    }

    fn page<F>(&self, request: PageRequest, include: F) -> Page<Post>
    where
        F: Fn(&StoredPost) -> bool,
    {
        let mut matching: Vec<&StoredPost> = self.posts.iter().filter(|post| include(post)).collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });
        let total = matching.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|post| self.to_post(post))
            .collect();
        Page::new(request, items, total)
    }

    fn to_post(&self, post: &StoredPost) -> Option<Post> {
        let author = &self.users.get(&post.author)?.user;
        Some(Post::new(
            post.id,
            post.body.clone(),
            post.created_at,
            PostAuthor {
                id: *author.id(),
                username: author.username().clone(),
                avatar: author.avatar().cloned(),
            },
        ))
    }
}

/// Shared in-memory backing store implementing every repository port.
///
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, &'static str> {
        self.state.lock().map_err(|_| POISONED)
    }

    fn lock_users(&self) -> Result<MutexGuard<'_, State>, UserPersistenceError> {
        self.lock().map_err(UserPersistenceError::query)
    }

    fn lock_posts(&self) -> Result<MutexGuard<'_, State>, PostPersistenceError> {
        self.lock().map_err(PostPersistenceError::query)
    }

    fn lock_follows(&self) -> Result<MutexGuard<'_, State>, FollowPersistenceError> {
        self.lock().map_err(FollowPersistenceError::query)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock_users()?;
        if state.username_used_by_other(user.username(), None) {
            return Err(UserPersistenceError::duplicate_username());
        }
        if state
            .users
            .values()
            .any(|stored| stored.user.email() == user.email())
        {
            return Err(UserPersistenceError::duplicate_email());
        }
        state.users.insert(
            *user.id(),
            StoredUser {
                user: user.clone(),
                password_hash: password_hash.clone(),
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock_users()?;
        Ok(state.users.get(id).map(|stored| stored.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock_users()?;
        Ok(state.user_by_name(username).map(|stored| stored.user.clone()))
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let state = self.lock_users()?;
        Ok(state.user_by_name(username).map(|stored| StoredCredentials {
            user: stored.user.clone(),
            password_hash: stored.password_hash.clone(),
        }))
    }

    async fn username_taken(&self, username: &Username) -> Result<bool, UserPersistenceError> {
        let state = self.lock_users()?;
        Ok(state.user_by_name(username).is_some())
    }

    async fn email_taken(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError> {
        let state = self.lock_users()?;
        Ok(state
            .users
            .values()
            .any(|stored| stored.user.email() == email))
    }

    async fn update_profile(
        &self,
        id: &UserId,
        username: &Username,
        about_me: Option<AboutMe>,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock_users()?;
        if state.username_used_by_other(username, Some(id)) {
            return Err(UserPersistenceError::duplicate_username());
        }
        if let Some(stored) = state.users.get_mut(id) {
            let user = &stored.user;
            stored.user = User::new(*user.id(), username.clone(), user.email().clone())
                .with_about_me(about_me)
                .with_last_seen(user.last_seen())
                .with_avatar(user.avatar().cloned());
        }
        Ok(())
    }

    async fn touch_last_seen(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock_users()?;
        if let Some(stored) = state.users.get_mut(id) {
            stored.user = stored.user.clone().with_last_seen(Some(at));
        }
        Ok(())
    }

    async fn set_avatar(
        &self,
        id: &UserId,
        avatar: &AvatarPath,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock_users()?;
        if let Some(stored) = state.users.get_mut(id) {
            stored.user = stored.user.clone().with_avatar(Some(avatar.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, post: &NewPost) -> Result<(), PostPersistenceError> {
        let mut state = self.lock_posts()?;
        if !state.users.contains_key(&post.author) {
            return Err(PostPersistenceError::query("post author does not exist"));
        }
        state.posts.push(StoredPost {
            id: post.id,
            author: post.author,
            body: post.body.clone(),
            created_at: post.created_at,
        });
        Ok(())
    }

    async fn followed_feed(
        &self,
        user: &UserId,
        request: PageRequest,
    ) -> Result<Page<Post>, PostPersistenceError> {
        let state = self.lock_posts()?;
        Ok(state.page(request, |post| {
            post.author == *user || state.follows.contains(&(*user, post.author))
        }))
    }

    async fn by_author(
        &self,
        author: &UserId,
        request: PageRequest,
    ) -> Result<Page<Post>, PostPersistenceError> {
        let state = self.lock_posts()?;
        Ok(state.page(request, |post| post.author == *author))
    }

    async fn explore(&self, request: PageRequest) -> Result<Page<Post>, PostPersistenceError> {
        let state = self.lock_posts()?;
        Ok(state.page(request, |_| true))
    }

    async fn delete_by_body(
        &self,
        author: &UserId,
        body: &str,
    ) -> Result<u64, PostPersistenceError> {
        let mut state = self.lock_posts()?;
        let before = state.posts.len();
        state
            .posts
            .retain(|post| !(post.author == *author && post.body.as_ref() == body));
        Ok((before - state.posts.len()) as u64)
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn follow(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<(), FollowPersistenceError> {
        let mut state = self.lock_follows()?;
        state.follows.insert((*follower, *followed));
        Ok(())
    }

    async fn unfollow(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<(), FollowPersistenceError> {
        let mut state = self.lock_follows()?;
        state.follows.remove(&(*follower, *followed));
        Ok(())
    }

    async fn is_following(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, FollowPersistenceError> {
        let state = self.lock_follows()?;
        Ok(state.follows.contains(&(*follower, *followed)))
    }

    async fn count_followers(&self, user: &UserId) -> Result<u64, FollowPersistenceError> {
        let state = self.lock_follows()?;
        Ok(state.follows.iter().filter(|(_, followed)| followed == user).count() as u64)
    }

    async fn count_following(&self, user: &UserId) -> Result<u64, FollowPersistenceError> {
        let state = self.lock_follows()?;
        Ok(state.follows.iter().filter(|(follower, _)| follower == user).count() as u64)
    }
}
