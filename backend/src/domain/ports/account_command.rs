//! Driving port for account mutations: sign-up, activity tracking, profile
//! edits and avatar uploads.

use async_trait::async_trait;

use crate::domain::{AvatarPath, AvatarUpload, Error, ProfileUpdate, Registration, User, UserId};

/// Domain use-case port for account changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account. Taken usernames or e-mail addresses yield
    /// [`crate::domain::ErrorCode::Conflict`] with `details.field` naming the
    /// offending form field.
    async fn register(&self, registration: &Registration) -> Result<User, Error>;

    /// Stamp `last_seen` with the current time.
    async fn record_activity(&self, user: &UserId) -> Result<(), Error>;

    /// Apply an edit-profile submission and return the updated account.
    async fn update_profile(&self, user: &UserId, update: &ProfileUpdate) -> Result<User, Error>;

    /// Store an avatar and return its public path.
    async fn update_avatar(&self, user: &UserId, upload: &AvatarUpload)
    -> Result<AvatarPath, Error>;
}
