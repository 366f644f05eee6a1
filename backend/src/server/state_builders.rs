//! Builders wiring repositories into the HTTP state ports.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use microblog::domain::ports::{FollowRepository, PostRepository, UserRepository};
use microblog::domain::{AccountService, PostService, SocialService};
use microblog::inbound::http::state::{HttpState, HttpStatePorts};
use microblog::outbound::avatar_storage::FilesystemAvatarStore;
use microblog::outbound::memory::InMemoryStore;
use microblog::outbound::password::Argon2PasswordHasher;
use microblog::outbound::persistence::{
    DieselFollowRepository, DieselPostRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Repository adapters behind the services.
struct Repositories<U, P, F> {
    users: Arc<U>,
    posts: Arc<P>,
    follows: Arc<F>,
}

fn wire_ports<U, P, F>(
    repos: Repositories<U, P, F>,
    avatars: Arc<FilesystemAvatarStore>,
    posts_per_page: u32,
) -> HttpStatePorts
where
    U: UserRepository + 'static,
    P: PostRepository + 'static,
    F: FollowRepository + 'static,
{
    let Repositories {
        users,
        posts,
        follows,
    } = repos;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let accounts = Arc::new(AccountService::new(
        users.clone(),
        Arc::new(Argon2PasswordHasher::new()),
        avatars,
        clock.clone(),
    ));
    let social = Arc::new(SocialService::new(users.clone(), follows));
    let feeds = Arc::new(PostService::new(users, posts, clock, posts_per_page));

    HttpStatePorts {
        login: accounts.clone(),
        accounts: accounts.clone(),
        users: accounts,
        follows: social.clone(),
        profiles: social,
        posts: feeds.clone(),
        feeds,
    }
}

/// Build the HTTP state, using Diesel repositories when a pool is configured
/// and the in-memory store otherwise.
///
/// # Errors
/// Returns [`std::io::Error`] when the upload directory cannot be opened.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let avatars = Arc::new(FilesystemAvatarStore::open(&config.upload_dir)?);
    info!(upload_dir = %avatars.root().display(), "avatar storage ready");

    let ports = match &config.db_pool {
        Some(pool) => wire_ports(
            Repositories {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                posts: Arc::new(DieselPostRepository::new(pool.clone())),
                follows: Arc::new(DieselFollowRepository::new(pool.clone())),
            },
            avatars,
            config.posts_per_page,
        ),
        None => {
            warn!("no database configured; data lives in memory and is lost on restart");
            let store = Arc::new(InMemoryStore::new());
            wire_ports(
                Repositories {
                    users: store.clone(),
                    posts: store.clone(),
                    follows: store,
                },
                avatars,
                config.posts_per_page,
            )
        }
    };

    Ok(HttpState::new(ports).with_max_upload_bytes(config.max_upload_bytes))
}
