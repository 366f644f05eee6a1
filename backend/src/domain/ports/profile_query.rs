//! Driving port for profile pages.

use async_trait::async_trait;

use crate::domain::{Error, Profile, UserId};

/// Domain use-case port for profile lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// Profile of `username` as seen by `viewer`.
    async fn profile(&self, viewer: &UserId, username: &str) -> Result<Profile, Error>;
}
