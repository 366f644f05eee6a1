//! User data model.
//!
//! Value types validate at construction so adapters can trust any `User`
//! they receive; persistence adapters rebuild them from stored rows through
//! the same constructors.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use uuid::Uuid;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Identifier was not a UUID.
    InvalidId,
    /// Username was missing or blank.
    EmptyUsername,
    /// Username exceeded [`USERNAME_MAX`] characters.
    UsernameTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// Username contained characters outside `[A-Za-z0-9_.-]`.
    UsernameInvalidCharacters,
    /// E-mail address was missing or blank.
    EmptyEmail,
    /// E-mail address exceeded [`EMAIL_MAX`] characters.
    EmailTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// E-mail address was not of the form `local@domain.tld`.
    InvalidEmail,
    /// About-me text exceeded [`ABOUT_ME_MAX`] characters.
    AboutMeTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// Avatar path was not below the public upload prefix.
    InvalidAvatarPath,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, numbers, dots, dashes, or underscores",
            ),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "invalid email address"),
            Self::AboutMeTooLong { max } => {
                write!(f, "about me must be at most {max} characters")
            }
            Self::InvalidAvatarPath => {
                write!(f, "avatar path must live under {AVATAR_PUBLIC_PREFIX}")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its canonical string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 64;
/// Maximum allowed length for an e-mail address.
pub const EMAIL_MAX: usize = 120;
/// Maximum allowed length for the about-me text.
pub const ABOUT_ME_MAX: usize = 140;
/// Public URL prefix under which uploaded avatars are served.
pub const AVATAR_PUBLIC_PREFIX: &str = "/static/upload/";

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        Regex::new("^[A-Za-z0-9_.-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Unique public handle of a user, used in profile URLs.
///
/// Usernames are case-sensitive and stored as entered (minus surrounding
/// whitespace).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    ///
    /// # Examples
    /// ```
    /// use microblog::domain::Username;
    ///
    /// let name = Username::new("  ada.l ").expect("valid username");
    /// assert_eq!(name.as_ref(), "ada.l");
    /// assert!(Username::new("has space").is_err());
    /// ```
    pub fn new(username: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = username.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_regex().is_match(trimmed) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Contact e-mail address, normalised to lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = email.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Free-text biography shown on the profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AboutMe(String);

impl AboutMe {
    /// Validate form input; blank input clears the field and yields `None`.
    ///
    /// # Examples
    /// ```
    /// use microblog::domain::AboutMe;
    ///
    /// assert_eq!(AboutMe::parse("   ").expect("blank is fine"), None);
    /// let about = AboutMe::parse("Analytical engines").expect("short text");
    /// assert_eq!(about.map(String::from).as_deref(), Some("Analytical engines"));
    /// ```
    pub fn parse(raw: impl AsRef<str>) -> Result<Option<Self>, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.chars().count() > ABOUT_ME_MAX {
            return Err(UserValidationError::AboutMeTooLong { max: ABOUT_ME_MAX });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }
}

impl AsRef<str> for AboutMe {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<AboutMe> for String {
    fn from(value: AboutMe) -> Self {
        value.0
    }
}

/// Public URL path of a stored avatar, e.g. `/static/upload/<digest>.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarPath(String);

impl AvatarPath {
    /// Validate a stored public path.
    pub fn new(path: impl Into<String>) -> Result<Self, UserValidationError> {
        let path = path.into();
        let Some(name) = path.strip_prefix(AVATAR_PUBLIC_PREFIX) else {
            return Err(UserValidationError::InvalidAvatarPath);
        };
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return Err(UserValidationError::InvalidAvatarPath);
        }
        Ok(Self(path))
    }

    /// Build the public path for a file stored under the upload directory.
    pub fn for_file_name(file_name: &str) -> Result<Self, UserValidationError> {
        Self::new(format!("{AVATAR_PUBLIC_PREFIX}{file_name}"))
    }
}

impl AsRef<str> for AvatarPath {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AvatarPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Registered account.
///
/// The password hash is deliberately absent; credentials are loaded
/// separately through the user repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    email: EmailAddress,
    about_me: Option<AboutMe>,
    last_seen: Option<DateTime<Utc>>,
    avatar: Option<AvatarPath>,
}

impl User {
    /// Build a freshly registered [`User`] with no profile data yet.
    pub fn new(id: UserId, username: Username, email: EmailAddress) -> Self {
        Self {
            id,
            username,
            email,
            about_me: None,
            last_seen: None,
            avatar: None,
        }
    }

    /// Attach the about-me text.
    pub fn with_about_me(mut self, about_me: Option<AboutMe>) -> Self {
        self.about_me = about_me;
        self
    }

    /// Attach the last-seen timestamp.
    pub fn with_last_seen(mut self, last_seen: Option<DateTime<Utc>>) -> Self {
        self.last_seen = last_seen;
        self
    }

    /// Attach the avatar path.
    pub fn with_avatar(mut self, avatar: Option<AvatarPath>) -> Self {
        self.avatar = avatar;
        self
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Public handle.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Contact address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Biography, if set.
    pub fn about_me(&self) -> Option<&AboutMe> {
        self.about_me.as_ref()
    }

    /// Time of the last authenticated request.
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }

    /// Uploaded avatar, if any.
    pub fn avatar(&self) -> Option<&AvatarPath> {
        self.avatar.as_ref()
    }
}
