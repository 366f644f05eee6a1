//! Form payloads and their validation messages.

use pagination::{FIRST_PAGE, PageRequest};
use serde::Deserialize;

use crate::domain::{
    Error, ErrorCode, LoginValidationError, Message, PostValidationError,
    ProfileValidationError, RegistrationValidationError, UserValidationError,
};

use super::locale::RequestLocale;
use super::views::FormErrors;

/// `POST /login` body.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Checkbox; present only when ticked.
    pub remember_me: Option<String>,
}

/// `POST /register` body.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
}

/// `POST /index` body.
#[derive(Debug, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub post: String,
}

/// `POST /edit_profile/{username}` body.
#[derive(Debug, Default, Deserialize)]
pub struct EditProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub about_me: String,
}

/// Query string carrying the page number.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// Requested page, parsed by [`PageRequest::from_query`].
    ///
    /// The feed services apply their own page size, so only the number is
    /// kept here.
    pub fn number(&self) -> u32 {
        PageRequest::from_query(self.page.as_deref(), 1)
            .map_or(FIRST_PAGE, |request| request.page())
    }
}

/// Query string of the sign-in page.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

fn user_value_message(err: &UserValidationError) -> Message {
    match err {
        UserValidationError::EmptyUsername | UserValidationError::EmptyEmail => {
            Message::FieldRequired
        }
        UserValidationError::UsernameTooLong { max }
        | UserValidationError::EmailTooLong { max }
        | UserValidationError::AboutMeTooLong { max } => Message::TooLong(*max),
        UserValidationError::UsernameInvalidCharacters => Message::InvalidUsername,
        UserValidationError::InvalidEmail => Message::InvalidEmail,
        UserValidationError::InvalidId | UserValidationError::InvalidAvatarPath => {
            Message::FieldRequired
        }
    }
}

/// Field errors for a rejected sign-in form.
pub fn login_errors(err: &LoginValidationError, locale: RequestLocale) -> FormErrors {
    let mut errors = FormErrors::default();
    errors.add(err.field(), locale.text(&Message::FieldRequired));
    errors
}

/// Field errors for a rejected registration form.
pub fn registration_errors(err: &RegistrationValidationError, locale: RequestLocale) -> FormErrors {
    let message = match err {
        RegistrationValidationError::Username(inner) | RegistrationValidationError::Email(inner) => {
            user_value_message(inner)
        }
        RegistrationValidationError::EmptyPassword
        | RegistrationValidationError::EmptyConfirmation => Message::FieldRequired,
        RegistrationValidationError::PasswordMismatch => Message::PasswordsMustMatch,
    };
    let mut errors = FormErrors::default();
    errors.add(err.field(), locale.text(&message));
    errors
}

/// Field errors for a rejected edit-profile form.
pub fn profile_errors(err: &ProfileValidationError, locale: RequestLocale) -> FormErrors {
    let mut errors = FormErrors::default();
    errors.add(err.field(), locale.text(&user_value_message(err.reason())));
    errors
}

/// Message for a rejected post body.
pub fn post_error(err: &PostValidationError, locale: RequestLocale) -> String {
    let message = match err {
        PostValidationError::Empty => Message::FieldRequired,
        PostValidationError::TooLong { max } => Message::TooLong(*max),
    };
    locale.text(&message)
}

/// Field errors for a uniqueness conflict, or `None` for any other error.
pub fn conflict_errors(err: &Error, locale: RequestLocale) -> Option<FormErrors> {
    if err.code() != ErrorCode::Conflict {
        return None;
    }
    let (field, message) = match err.field()? {
        "username" => ("username", Message::UsernameTaken),
        "email" => ("email", Message::EmailTaken),
        _ => return None,
    };
    let mut errors = FormErrors::default();
    errors.add(field, locale.text(&message));
    Some(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Locale, ProfileUpdate, Registration};
    use rstest::rstest;
    use serde_json::json;

    const EN: RequestLocale = RequestLocale(Locale::En);

    #[rstest]
    #[case(None, 1)]
    #[case(Some("3"), 3)]
    #[case(Some("0"), 1)]
    #[case(Some("x"), 1)]
    #[case(Some("-4"), 1)]
    #[case(Some(" 2 "), 2)]
    #[case(Some("99999999999"), u32::MAX)]
    fn page_query_defaults_to_the_first_page(#[case] raw: Option<&str>, #[case] expected: u32) {
        let query = PageQuery {
            page: raw.map(str::to_owned),
        };
        assert_eq!(query.number(), expected);
    }

    #[rstest]
    fn mismatched_passwords_flag_the_confirmation() {
        let err = Registration::try_from_parts("ada", "ada@example.com", "a", "b")
            .expect_err("mismatch");

        let errors = registration_errors(&err, EN);

        assert_eq!(
            errors.get("password2"),
            Some(Message::PasswordsMustMatch.text(Locale::En).as_str())
        );
    }

    #[rstest]
    fn long_about_me_reports_the_limit() {
        let err = ProfileUpdate::try_from_parts("ada", &"x".repeat(141)).expect_err("too long");

        let errors = profile_errors(&err, EN);

        assert_eq!(
            errors.get("about_me"),
            Some(Message::TooLong(140).text(Locale::En).as_str())
        );
    }

    #[rstest]
    #[case("username", Message::UsernameTaken)]
    #[case("email", Message::EmailTaken)]
    fn conflicts_map_to_their_field(#[case] field: &str, #[case] expected: Message) {
        let err = Error::conflict("taken").with_details(json!({ "field": field }));

        let errors = conflict_errors(&err, EN).expect("conflict maps to a field");

        assert_eq!(errors.get(field), Some(expected.text(Locale::En).as_str()));
    }

    #[rstest]
    fn other_errors_are_not_form_errors() {
        assert!(conflict_errors(&Error::internal("boom"), EN).is_none());
    }
}
