//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::DEFAULT_MAX_AVATAR_BYTES;
use crate::domain::ports::{
    AccountCommand, FeedQuery, FollowCommand, LoginService, PostCommand, ProfileQuery, UsersQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountCommand>,
    pub users: Arc<dyn UsersQuery>,
    pub follows: Arc<dyn FollowCommand>,
    pub profiles: Arc<dyn ProfileQuery>,
    pub posts: Arc<dyn PostCommand>,
    pub feeds: Arc<dyn FeedQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountCommand>,
    pub users: Arc<dyn UsersQuery>,
    pub follows: Arc<dyn FollowCommand>,
    pub profiles: Arc<dyn ProfileQuery>,
    pub posts: Arc<dyn PostCommand>,
    pub feeds: Arc<dyn FeedQuery>,
    /// Largest avatar upload accepted, in bytes.
    pub max_upload_bytes: usize,
}

impl HttpState {
    /// Build state from ports with the default upload limit.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            accounts,
            users,
            follows,
            profiles,
            posts,
            feeds,
        } = ports;
        Self {
            login,
            accounts,
            users,
            follows,
            profiles,
            posts,
            feeds,
            max_upload_bytes: DEFAULT_MAX_AVATAR_BYTES,
        }
    }

    /// Override the avatar upload limit.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
