//! Profile page projection and profile edits.

use std::fmt;

use super::{AboutMe, User, UserValidationError, Username};

/// Profile page data as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Profile owner.
    pub user: User,
    /// Whether the viewer is looking at their own profile.
    pub is_self: bool,
    /// Whether the viewer follows the owner.
    pub is_following: bool,
    /// Number of users following the owner.
    pub followers: u64,
    /// Number of users the owner follows.
    pub following: u64,
}

/// Validation errors for the edit-profile form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    /// The new username failed validation.
    Username(UserValidationError),
    /// The about-me text failed validation.
    AboutMe(UserValidationError),
}

impl ProfileValidationError {
    /// Form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Username(_) => "username",
            Self::AboutMe(_) => "about_me",
        }
    }

    /// Underlying value error.
    pub fn reason(&self) -> &UserValidationError {
        match self {
            Self::Username(err) | Self::AboutMe(err) => err,
        }
    }
}

impl fmt::Display for ProfileValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.reason(), f)
    }
}

impl std::error::Error for ProfileValidationError {}

/// Validated edit-profile submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    username: Username,
    about_me: Option<AboutMe>,
}

impl ProfileUpdate {
    /// Validate raw form input. A blank about-me clears the stored value.
    ///
    /// # Examples
    /// ```
    /// use microblog::domain::ProfileUpdate;
    ///
    /// let update = ProfileUpdate::try_from_parts("ada", "  ").expect("valid");
    /// assert!(update.about_me().is_none());
    /// ```
    pub fn try_from_parts(username: &str, about_me: &str) -> Result<Self, ProfileValidationError> {
        let username = Username::new(username).map_err(ProfileValidationError::Username)?;
        let about_me = AboutMe::parse(about_me).map_err(ProfileValidationError::AboutMe)?;
        Ok(Self { username, about_me })
    }

    /// Requested username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Requested biography.
    pub fn about_me(&self) -> Option<&AboutMe> {
        self.about_me.as_ref()
    }
}
