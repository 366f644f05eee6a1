//! Supported locales and the user-facing message catalogue.
//!
//! Flash messages and form errors are modelled as a closed [`Message`] enum so
//! every locale must supply every string; adding a variant without a
//! translation fails to compile.

use std::fmt;

/// Locales the interface is translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// Simplified Chinese.
    Zh,
}

impl Locale {
    /// Every supported locale, in preference order for ties.
    pub const ALL: [Self; 2] = [Self::En, Self::Zh];

    /// BCP 47 language tag used in `<html lang>`.
    pub fn tag(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }

    /// Supported locale for a primary language subtag, if any.
    pub fn from_primary_language(primary: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|locale| primary.eq_ignore_ascii_case(locale.tag()))
    }

    /// First supported locale among primary subtags listed in preference
    /// order, falling back to English.
    ///
    /// # Examples
    /// ```
    /// use microblog::domain::Locale;
    ///
    /// assert_eq!(Locale::first_supported(["fr", "zh", "en"]), Locale::Zh);
    /// assert_eq!(Locale::first_supported(["de"]), Locale::En);
    /// ```
    pub fn first_supported<I, S>(preferred: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        preferred
            .into_iter()
            .find_map(|primary| Self::from_primary_language(primary.as_ref()))
            .unwrap_or_default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// User-facing strings shown as flashes or next to form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Shown when an anonymous visitor hits a protected page.
    PleaseLogIn,
    /// Failed login.
    InvalidCredentials,
    /// Successful registration.
    Registered,
    /// Post published.
    PostLive,
    /// Profile saved.
    ChangesSaved,
    /// Unknown username in a follow link.
    UserNotFound(String),
    /// Follow target is the current user.
    CannotFollowSelf,
    /// Unfollow target is the current user.
    CannotUnfollowSelf,
    /// Follow succeeded.
    Following(String),
    /// Unfollow succeeded.
    NotFollowing(String),
    /// Username already registered.
    UsernameTaken,
    /// E-mail address already registered.
    EmailTaken,
    /// Required field left blank.
    FieldRequired,
    /// Confirmation password differs.
    PasswordsMustMatch,
    /// Malformed e-mail address.
    InvalidEmail,
    /// Username contains characters outside the allowed set.
    InvalidUsername,
    /// Field exceeds its length limit.
    TooLong(usize),
}

impl Message {
    /// Render the message in `locale`.
    pub fn text(&self, locale: Locale) -> String {
        match locale {
            Locale::En => self.english(),
            Locale::Zh => self.chinese(),
        }
    }

    fn english(&self) -> String {
        match self {
            Self::PleaseLogIn => "Please log in to access this page.".to_owned(),
            Self::InvalidCredentials => "Invalid username or password".to_owned(),
            Self::Registered => "Congratulations, you are now a registered user!".to_owned(),
            Self::PostLive => "Your post is now live!".to_owned(),
            Self::ChangesSaved => "Your changes have been saved.".to_owned(),
            Self::UserNotFound(name) => format!("User {name} not found."),
            Self::CannotFollowSelf => "You cannot follow yourself!".to_owned(),
            Self::CannotUnfollowSelf => "You cannot unfollow yourself!".to_owned(),
            Self::Following(name) => format!("You are following {name}!"),
            Self::NotFollowing(name) => format!("You are not following {name}."),
            Self::UsernameTaken => "Please use a different username.".to_owned(),
            Self::EmailTaken => "Please use a different email address.".to_owned(),
            Self::FieldRequired => "This field is required.".to_owned(),
            Self::PasswordsMustMatch => "Field must be equal to password.".to_owned(),
            Self::InvalidEmail => "Invalid email address.".to_owned(),
            Self::InvalidUsername => {
                "Use only letters, numbers, dots, dashes and underscores.".to_owned()
            }
            Self::TooLong(max) => format!("Field cannot be longer than {max} characters."),
        }
    }

    fn chinese(&self) -> String {
        match self {
            Self::PleaseLogIn => "请先登录再访问此页面。".to_owned(),
            Self::InvalidCredentials => "用户名或密码错误".to_owned(),
            Self::Registered => "恭喜，您已成为注册用户！".to_owned(),
            Self::PostLive => "您的动态已发布！".to_owned(),
            Self::ChangesSaved => "您的修改已保存。".to_owned(),
            Self::UserNotFound(name) => format!("未找到用户 {name}。"),
            Self::CannotFollowSelf => "您不能关注自己！".to_owned(),
            Self::CannotUnfollowSelf => "您不能取消关注自己！".to_owned(),
            Self::Following(name) => format!("您已关注 {name}！"),
            Self::NotFollowing(name) => format!("您已取消关注 {name}。"),
            Self::UsernameTaken => "请使用其他用户名。".to_owned(),
            Self::EmailTaken => "请使用其他电子邮件地址。".to_owned(),
            Self::FieldRequired => "此字段为必填项。".to_owned(),
            Self::PasswordsMustMatch => "两次输入的密码必须一致。".to_owned(),
            Self::InvalidEmail => "电子邮件地址无效。".to_owned(),
            Self::InvalidUsername => "只能使用字母、数字、点、短横线和下划线。".to_owned(),
            Self::TooLong(max) => format!("长度不能超过 {max} 个字符。"),
        }
    }
}
