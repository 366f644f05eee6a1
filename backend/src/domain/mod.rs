//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: define strongly typed entities used by the HTTP and persistence
//! adapters, the ports those adapters plug into, and the services that
//! implement the use-cases. Types are immutable and validated at
//! construction.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Post, Profile and their value types.
//! - AccountService, SocialService, PostService: use-case implementations.

pub mod account_service;
pub mod auth;
pub mod avatar;
pub mod error;
pub mod localization;
pub mod ports;
pub mod post;
pub mod post_service;
pub mod profile;
pub mod social_service;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, Password, PasswordHash, Registration,
    RegistrationValidationError,
};
pub use self::avatar::{
    AvatarUpload, AvatarValidationError, DEFAULT_MAX_AVATAR_BYTES, ImageKind,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::localization::{Locale, Message};
pub use self::post::{POST_BODY_MAX, Post, PostAuthor, PostBody, PostId, PostValidationError};
pub use self::post_service::PostService;
pub use self::profile::{Profile, ProfileUpdate, ProfileValidationError};
pub use self::social_service::SocialService;
pub use self::trace_id::TraceId;
pub use self::user::{
    ABOUT_ME_MAX, AVATAR_PUBLIC_PREFIX, AboutMe, AvatarPath, EMAIL_MAX, EmailAddress,
    USERNAME_MAX, User, UserId, UserValidationError, Username,
};

/// Convenient result alias for use-case and handler code.
///
/// # Examples
/// ```
/// use microblog::domain::{Error, DomainResult};
///
/// fn handler() -> DomainResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
