//! Sign-in, sign-out and registration pages.
//!
//! ```text
//! GET|POST /login[?next=/path]
//! GET /logout
//! GET|POST /register
//! ```

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::domain::{ErrorCode, LoginCredentials, Message, Registration};

use super::auth::{HOME_PATH, LOGIN_PATH, LoginRequired, is_local_path};
use super::error::PageResult;
use super::forms::{LoginForm, NextQuery, RegisterForm, conflict_errors, login_errors, registration_errors};
use super::locale::RequestLocale;
use super::session::SessionContext;
use super::state::HttpState;
use super::views::{FormErrors, Layout, LoginPage, RegisterPage, render, see_other};

fn login_action(next: Option<&str>) -> String {
    match next {
        Some(next) if !next.is_empty() => LoginRequired::new(next).location(),
        _ => LOGIN_PATH.to_owned(),
    }
}

fn login_page(
    session: &SessionContext,
    locale: RequestLocale,
    next: Option<&str>,
    form: &LoginForm,
    errors: FormErrors,
) -> PageResult<HttpResponse> {
    render(&LoginPage {
        layout: Layout::for_request("Sign In", session, locale, None)?,
        username: form.username.clone(),
        remember_me: form.remember_me.is_some(),
        action: login_action(next),
        errors,
    })
}

/// Render the sign-in form.
pub async fn login_form(
    session: SessionContext,
    locale: RequestLocale,
    query: web::Query<NextQuery>,
) -> PageResult<HttpResponse> {
    if session.user_id()?.is_some() {
        return Ok(see_other(HOME_PATH));
    }
    login_page(
        &session,
        locale,
        query.next.as_deref(),
        &LoginForm::default(),
        FormErrors::default(),
    )
}

/// Authenticate and start a session.
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    locale: RequestLocale,
    query: web::Query<NextQuery>,
    form: web::Form<LoginForm>,
) -> PageResult<HttpResponse> {
    if session.user_id()?.is_some() {
        return Ok(see_other(HOME_PATH));
    }
    let form = form.into_inner();
    let next = query.next.as_deref();
    let credentials = match LoginCredentials::try_from_parts(&form.username, &form.password) {
        Ok(credentials) => credentials,
        Err(err) => {
            let errors = login_errors(&err, locale);
            return login_page(&session, locale, next, &form, errors);
        }
    };

    let user_id = match state.login.authenticate(&credentials).await {
        Ok(user_id) => user_id,
        Err(err) if err.code() == ErrorCode::Unauthorized => {
            info!(username = credentials.username(), "sign-in rejected");
            session.flash(locale.text(&Message::InvalidCredentials))?;
            return Ok(see_other(LOGIN_PATH));
        }
        Err(err) => return Err(err),
    };

    session.persist_user(&user_id)?;
    info!(%user_id, remember_me = form.remember_me.is_some(), "signed in");
    let target = next.filter(|next| is_local_path(next)).unwrap_or(HOME_PATH);
    Ok(see_other(target))
}

/// End the session.
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.forget_user();
    see_other(HOME_PATH)
}

fn register_page(
    session: &SessionContext,
    locale: RequestLocale,
    form: &RegisterForm,
    errors: FormErrors,
) -> PageResult<HttpResponse> {
    render(&RegisterPage {
        layout: Layout::for_request("Register", session, locale, None)?,
        username: form.username.clone(),
        email: form.email.clone(),
        errors,
    })
}

/// Render the registration form.
pub async fn register_form(
    session: SessionContext,
    locale: RequestLocale,
) -> PageResult<HttpResponse> {
    if session.user_id()?.is_some() {
        return Ok(see_other(HOME_PATH));
    }
    register_page(
        &session,
        locale,
        &RegisterForm::default(),
        FormErrors::default(),
    )
}

/// Create an account.
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    locale: RequestLocale,
    form: web::Form<RegisterForm>,
) -> PageResult<HttpResponse> {
    if session.user_id()?.is_some() {
        return Ok(see_other(HOME_PATH));
    }
    let form = form.into_inner();
    let registration = match Registration::try_from_parts(
        &form.username,
        &form.email,
        &form.password,
        &form.password2,
    ) {
        Ok(registration) => registration,
        Err(err) => {
            let errors = registration_errors(&err, locale);
            return register_page(&session, locale, &form, errors);
        }
    };

    match state.accounts.register(&registration).await {
        Ok(user) => {
            info!(user_id = %user.id(), username = %user.username(), "registered");
            session.flash(locale.text(&Message::Registered))?;
            Ok(see_other(LOGIN_PATH))
        }
        Err(err) => match conflict_errors(&err, locale) {
            Some(errors) => register_page(&session, locale, &form, errors),
            None => Err(err),
        },
    }
}
