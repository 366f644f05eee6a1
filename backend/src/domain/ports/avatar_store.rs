//! Port for avatar file storage.

use async_trait::async_trait;

use crate::domain::{AvatarPath, AvatarUpload};

use super::define_port_error;

define_port_error! {
    /// Errors raised by avatar storage adapters.
    pub enum AvatarStoreError {
        /// The upload directory could not be opened or written.
        Io { message: String } => "avatar storage failed: {message}",
    }
}

/// Writes validated uploads and returns the public path they are served at.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Store `upload` under a fresh, unguessable file name.
    async fn store(&self, upload: &AvatarUpload) -> Result<AvatarPath, AvatarStoreError>;
}
