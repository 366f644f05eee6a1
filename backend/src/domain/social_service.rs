//! Social graph domain service: follows and profile pages.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::account_service::map_user_error;
use crate::domain::ports::{
    FollowCommand, FollowPersistenceError, FollowRepository, ProfileQuery, UserRepository,
};
use crate::domain::{Error, Profile, User, UserId, Username};

fn map_follow_error(error: FollowPersistenceError) -> Error {
    match error {
        FollowPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("follow repository unavailable: {message}"))
        }
        FollowPersistenceError::Query { message } => {
            Error::internal(format!("follow repository error: {message}"))
        }
    }
}

pub(crate) fn user_not_found(username: &str) -> Error {
    Error::not_found(format!("User {username} not found."))
}

/// Look up `username`, treating names that could never be registered as
/// unknown.
pub(crate) async fn resolve_user<U: UserRepository>(
    users: &U,
    username: &str,
) -> Result<User, Error> {
    let Ok(name) = Username::new(username) else {
        return Err(user_not_found(username));
    };
    users
        .find_by_username(&name)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| user_not_found(username))
}

/// Service implementing the follow command and profile query ports.
#[derive(Clone)]
pub struct SocialService<U, F> {
    users: Arc<U>,
    follows: Arc<F>,
}

impl<U, F> SocialService<U, F> {
    /// Create a service over the user and follow repositories.
    pub fn new(users: Arc<U>, follows: Arc<F>) -> Self {
        Self { users, follows }
    }
}

#[async_trait]
impl<U, F> FollowCommand for SocialService<U, F>
where
    U: UserRepository,
    F: FollowRepository,
{
    async fn follow(&self, me: &UserId, username: &str) -> Result<Username, Error> {
        let target = resolve_user(self.users.as_ref(), username).await?;
        if target.id() == me {
            return Err(Error::invalid_request("You cannot follow yourself!"));
        }
        self.follows
            .follow(me, target.id())
            .await
            .map_err(map_follow_error)?;
        info!(follower = %me, followed = %target.id(), "follow recorded");
        Ok(target.username().clone())
    }

    async fn unfollow(&self, me: &UserId, username: &str) -> Result<Username, Error> {
        let target = resolve_user(self.users.as_ref(), username).await?;
        if target.id() == me {
            return Err(Error::invalid_request("You cannot unfollow yourself!"));
        }
        self.follows
            .unfollow(me, target.id())
            .await
            .map_err(map_follow_error)?;
        info!(follower = %me, followed = %target.id(), "follow removed");
        Ok(target.username().clone())
    }
}

#[async_trait]
impl<U, F> ProfileQuery for SocialService<U, F>
where
    U: UserRepository,
    F: FollowRepository,
{
    async fn profile(&self, viewer: &UserId, username: &str) -> Result<Profile, Error> {
        let user = resolve_user(self.users.as_ref(), username).await?;
        let is_self = user.id() == viewer;
        let is_following = if is_self {
            false
        } else {
            self.follows
                .is_following(viewer, user.id())
                .await
                .map_err(map_follow_error)?
        };
        let followers = self
            .follows
            .count_followers(user.id())
            .await
            .map_err(map_follow_error)?;
        let following = self
            .follows
            .count_following(user.id())
            .await
            .map_err(map_follow_error)?;
        Ok(Profile {
            user,
            is_self,
            is_following,
            followers,
            following,
        })
    }
}
