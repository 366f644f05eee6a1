//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AboutMe, AvatarPath, EmailAddress, PasswordHash, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already owns the username.
        DuplicateUsername => "username is already registered",
        /// Another account already owns the e-mail address.
        DuplicateEmail => "email address is already registered",
    }
}

/// Stored account plus its password hash, loaded only for authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// Account owning the hash.
    pub user: User,
    /// PHC-format password hash.
    pub password_hash: PasswordHash,
}

/// Port for account storage.
///
/// Username lookups are exact and case-sensitive. Mutations on an unknown
/// id are no-ops.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    ///
    /// Unique-constraint violations surface as
    /// [`UserPersistenceError::DuplicateUsername`] or
    /// [`UserPersistenceError::DuplicateEmail`].
    async fn create(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and password hash by username.
    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Whether any account uses `username`.
    async fn username_taken(&self, username: &Username) -> Result<bool, UserPersistenceError>;

    /// Whether any account uses `email`.
    async fn email_taken(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError>;

    /// Replace the username and about-me text.
    async fn update_profile(
        &self,
        id: &UserId,
        username: &Username,
        about_me: Option<AboutMe>,
    ) -> Result<(), UserPersistenceError>;

    /// Record the time of the latest authenticated request.
    async fn touch_last_seen(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserPersistenceError>;

    /// Point the account at a newly stored avatar.
    async fn set_avatar(&self, id: &UserId, avatar: &AvatarPath)
    -> Result<(), UserPersistenceError>;
}
