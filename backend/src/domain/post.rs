//! Post data model.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::{AvatarPath, UserId, Username};

/// Maximum post length in characters.
pub const POST_BODY_MAX: usize = 140;

/// Validation errors for post bodies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostValidationError {
    /// Body was missing or blank once trimmed.
    #[error("post must not be empty")]
    Empty,
    /// Body exceeded [`POST_BODY_MAX`] characters.
    #[error("post must be at most {max} characters")]
    TooLong {
        /// Maximum permitted length.
        max: usize,
    },
}

/// Stable post identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostId(Uuid);

impl PostId {
    /// Generate a new random [`PostId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for PostId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Text of a post, trimmed, between 1 and [`POST_BODY_MAX`] characters.
///
/// # Examples
/// ```
/// use microblog::domain::PostBody;
///
/// let body = PostBody::new("  hello world \n").expect("valid body");
/// assert_eq!(body.as_ref(), "hello world");
/// assert!(PostBody::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostBody(String);

impl PostBody {
    /// Validate and construct a [`PostBody`].
    pub fn new(body: impl AsRef<str>) -> Result<Self, PostValidationError> {
        let trimmed = body.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PostValidationError::Empty);
        }
        if trimmed.chars().count() > POST_BODY_MAX {
            return Err(PostValidationError::TooLong { max: POST_BODY_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PostBody {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PostBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Author details rendered next to each post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostAuthor {
    /// Author identifier.
    pub id: UserId,
    /// Author handle, linked to the profile page.
    pub username: Username,
    /// Author avatar, if uploaded.
    pub avatar: Option<AvatarPath>,
}

/// Published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    id: PostId,
    body: PostBody,
    created_at: DateTime<Utc>,
    author: PostAuthor,
}

impl Post {
    /// Assemble a post from validated components.
    pub fn new(id: PostId, body: PostBody, created_at: DateTime<Utc>, author: PostAuthor) -> Self {
        Self {
            id,
            body,
            created_at,
            author,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &PostId {
        &self.id
    }

    /// Post text.
    pub fn body(&self) -> &PostBody {
        &self.body
    }

    /// Publication time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Author summary.
    pub fn author(&self) -> &PostAuthor {
        &self.author
    }
}
