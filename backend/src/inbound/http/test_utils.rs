//! Test helpers for inbound HTTP components.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::header::LOCATION;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use tempfile::TempDir;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{
    AccountService, Password, PasswordHash, PostService, Registration, SocialService, User,
};
use crate::outbound::avatar_storage::FilesystemAvatarStore;
use crate::outbound::memory::InMemoryStore;

use super::state::{HttpState, HttpStatePorts};

/// Password used by [`TestApp::register`].
pub const TEST_PASSWORD: &str = "correct horse";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Reversible "hash" keeping HTTP tests fast.
#[derive(Debug, Default)]
pub struct PlainTextHasher;

impl PasswordHasher for PlainTextHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError> {
        Ok(PasswordHash::new(format!("plain${}", password.expose())))
    }

    fn verify(&self, password: &Password, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        Ok(hash.as_ref() == format!("plain${}", password.expose()))
    }
}

/// Clock advancing one second per reading so feed order is deterministic.
#[derive(Debug)]
pub struct TickingClock {
    next: AtomicI64,
}

impl Default for TickingClock {
    fn default() -> Self {
        Self {
            next: AtomicI64::new(1_700_000_000),
        }
    }
}

impl Clock for TickingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let secs = self.next.fetch_add(1, Ordering::SeqCst);
        Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
    }
}

/// Real services over the in-memory store.
pub struct TestApp {
    pub state: HttpState,
    pub store: InMemoryStore,
    pub uploads: TempDir,
}

impl TestApp {
    /// Wire services paging feeds by `per_page` posts.
    pub fn new(per_page: u32) -> Self {
        let uploads = tempfile::tempdir().expect("upload dir");
        let avatars =
            Arc::new(FilesystemAvatarStore::open(uploads.path()).expect("open upload dir"));
        let store = InMemoryStore::new();
        let repo = Arc::new(store.clone());
        let clock: Arc<dyn Clock> = Arc::new(TickingClock::default());

        let accounts = Arc::new(AccountService::new(
            repo.clone(),
            Arc::new(PlainTextHasher),
            avatars,
            clock.clone(),
        ));
        let social = Arc::new(SocialService::new(repo.clone(), repo.clone()));
        let posts = Arc::new(PostService::new(repo.clone(), repo, clock, per_page));

        let state = HttpState::new(HttpStatePorts {
            login: accounts.clone(),
            accounts: accounts.clone(),
            users: accounts,
            follows: social.clone(),
            profiles: social,
            posts: posts.clone(),
            feeds: posts,
        });
        Self {
            state,
            store,
            uploads,
        }
    }

    /// Register `username` with [`TEST_PASSWORD`].
    pub async fn register(&self, username: &str) -> User {
        let registration = Registration::try_from_parts(
            username,
            &format!("{username}@example.com"),
            TEST_PASSWORD,
            TEST_PASSWORD,
        )
        .expect("valid registration");
        self.state
            .accounts
            .register(&registration)
            .await
            .expect("registration succeeds")
    }
}

/// Session cookie set by `res`, if any.
pub fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// `Location` header of a redirect.
pub fn location(res: &ServiceResponse) -> &str {
    res.headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("redirect location")
}
