//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use microblog::domain::DEFAULT_MAX_AVATAR_BYTES;
use microblog::outbound::persistence::DbPool;

const DEFAULT_POSTS_PER_PAGE: u32 = 3;
const DEFAULT_SESSION_TTL_HOURS: i64 = 14 * 24;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) session_ttl_hours: i64,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) upload_dir: PathBuf,
    pub(crate) posts_per_page: u32,
    pub(crate) max_upload_bytes: usize,
}

impl ServerConfig {
    /// Construct a server configuration from validated session settings.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        upload_dir: PathBuf,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            bind_addr,
            db_pool: None,
            upload_dir,
            posts_per_page: DEFAULT_POSTS_PER_PAGE,
            max_upload_bytes: DEFAULT_MAX_AVATAR_BYTES,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without one the server runs on in-memory storage.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_posts_per_page(mut self, posts_per_page: u32) -> Self {
        self.posts_per_page = posts_per_page;
        self
    }

    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    #[must_use]
    pub fn with_session_ttl_hours(mut self, hours: i64) -> Self {
        self.session_ttl_hours = hours;
        self
    }
}
