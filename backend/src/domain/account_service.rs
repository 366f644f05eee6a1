//! Account domain service: sign-up, login, activity tracking, profile edits
//! and avatars.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    AccountCommand, AvatarStore, AvatarStoreError, LoginService, PasswordHashError,
    PasswordHasher, UserPersistenceError, UserRepository, UsersQuery,
};
use crate::domain::{
    AvatarPath, AvatarUpload, Error, LoginCredentials, ProfileUpdate, Registration, User, UserId,
    Username,
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername => username_taken(),
        UserPersistenceError::DuplicateEmail => email_taken(),
    }
}

fn username_taken() -> Error {
    Error::conflict("Please use a different username.").with_details(json!({ "field": "username" }))
}

fn email_taken() -> Error {
    Error::conflict("Please use a different email address.")
        .with_details(json!({ "field": "email" }))
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(format!("password hasher error: {error}"))
}

fn map_avatar_error(error: AvatarStoreError) -> Error {
    Error::internal(format!("avatar store error: {error}"))
}

fn session_user_missing() -> Error {
    Error::unauthorized("account no longer exists")
}

/// Service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService<U, H, A> {
    users: Arc<U>,
    hasher: Arc<H>,
    avatars: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<U, H, A> AccountService<U, H, A> {
    /// Create a service over the given repositories and clock.
    pub fn new(users: Arc<U>, hasher: Arc<H>, avatars: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            avatars,
            clock,
        }
    }
}

impl<U, H, A> AccountService<U, H, A>
where
    U: UserRepository,
{
    async fn load(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(session_user_missing)
    }
}

#[async_trait]
impl<U, H, A> LoginService for AccountService<U, H, A>
where
    U: UserRepository,
    H: PasswordHasher,
    A: AvatarStore,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let Some(stored) = self
            .users
            .find_credentials(&username)
            .await
            .map_err(map_user_error)?
        else {
            debug!(username = %username, "login for unknown username");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let verified = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(map_hash_error)?;
        if !verified {
            debug!(user_id = %stored.user.id(), "login with wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(*stored.user.id())
    }
}

#[async_trait]
impl<U, H, A> AccountCommand for AccountService<U, H, A>
where
    U: UserRepository,
    H: PasswordHasher,
    A: AvatarStore,
{
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        if self
            .users
            .username_taken(registration.username())
            .await
            .map_err(map_user_error)?
        {
            return Err(username_taken());
        }
        if self
            .users
            .email_taken(registration.email())
            .await
            .map_err(map_user_error)?
        {
            return Err(email_taken());
        }

        let password_hash = self
            .hasher
            .hash(registration.password())
            .map_err(map_hash_error)?;
        let user = User::new(
            UserId::random(),
            registration.username().clone(),
            registration.email().clone(),
        );
        self.users
            .create(&user, &password_hash)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id(), username = %user.username(), "user registered");
        Ok(user)
    }

    async fn record_activity(&self, user: &UserId) -> Result<(), Error> {
        self.users
            .touch_last_seen(user, self.clock.utc())
            .await
            .map_err(map_user_error)
    }

    async fn update_profile(&self, user: &UserId, update: &ProfileUpdate) -> Result<User, Error> {
        let current = self.load(user).await?;
        if current.username() != update.username()
            && self
                .users
                .username_taken(update.username())
                .await
                .map_err(map_user_error)?
        {
            return Err(username_taken());
        }

        self.users
            .update_profile(user, update.username(), update.about_me().cloned())
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user, "profile updated");

        Ok(User::new(*current.id(), update.username().clone(), current.email().clone())
            .with_about_me(update.about_me().cloned())
            .with_last_seen(current.last_seen())
            .with_avatar(current.avatar().cloned()))
    }

    async fn update_avatar(
        &self,
        user: &UserId,
        upload: &AvatarUpload,
    ) -> Result<AvatarPath, Error> {
        self.load(user).await?;
        let path = self.avatars.store(upload).await.map_err(map_avatar_error)?;
        self.users
            .set_avatar(user, &path)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user, avatar = %path, "avatar updated");
        Ok(path)
    }
}

#[async_trait]
impl<U, H, A> UsersQuery for AccountService<U, H, A>
where
    U: UserRepository,
    H: PasswordHasher,
    A: AvatarStore,
{
    async fn current_user(&self, user: &UserId) -> Result<User, Error> {
        self.load(user).await
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
