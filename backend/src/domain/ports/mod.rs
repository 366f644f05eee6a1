//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, hasher, avatar store) are implemented by
//! outbound adapters; driving ports are implemented by domain services and
//! called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod avatar_store;
mod feed_query;
mod follow_command;
mod follow_repository;
mod login_service;
mod password_hasher;
mod post_command;
mod post_repository;
mod profile_query;
mod user_repository;
mod users_query;

pub use account_command::AccountCommand;
#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use avatar_store::{AvatarStore, AvatarStoreError};
#[cfg(test)]
pub use avatar_store::MockAvatarStore;
pub use feed_query::FeedQuery;
#[cfg(test)]
pub use feed_query::MockFeedQuery;
pub use follow_command::FollowCommand;
#[cfg(test)]
pub use follow_command::MockFollowCommand;
pub use follow_repository::{FollowPersistenceError, FollowRepository};
#[cfg(test)]
pub use follow_repository::MockFollowRepository;
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use post_command::PostCommand;
#[cfg(test)]
pub use post_command::MockPostCommand;
pub use post_repository::{NewPost, PostPersistenceError, PostRepository};
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use profile_query::ProfileQuery;
#[cfg(test)]
pub use profile_query::MockProfileQuery;
pub use user_repository::{StoredCredentials, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use users_query::UsersQuery;
#[cfg(test)]
pub use users_query::MockUsersQuery;
