//! Login gate for protected pages.
//!
//! [`CurrentUser`] resolves the signed-in user from the session, records
//! their activity, and otherwise redirects to the sign-in page carrying the
//! original path in `next`.

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::{Error, ErrorCode, Message, User};

use super::locale::RequestLocale;
use super::session::SessionContext;
use super::state::HttpState;

/// Sign-in page path.
pub const LOGIN_PATH: &str = "/login";
/// Landing page after sign-in.
pub const HOME_PATH: &str = "/index";

/// Redirect to the sign-in page for an anonymous visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequired {
    next: String,
}

impl LoginRequired {
    /// Remember `next` so the visitor returns there after signing in.
    pub fn new(next: impl Into<String>) -> Self {
        Self { next: next.into() }
    }

    /// Sign-in URL carrying `next`.
    pub fn location(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("next", &self.next)
            .finish();
        format!("{LOGIN_PATH}?{query}")
    }
}

impl fmt::Display for LoginRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "login required for {}", self.next)
    }
}

impl ResponseError for LoginRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::SeeOther()
            .insert_header((LOCATION, self.location()))
            .finish()
    }
}

/// Whether `next` is safe to redirect to after sign-in.
///
/// Only same-site absolute paths qualify; anything carrying a scheme or host
/// is rejected.
pub fn is_local_path(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && url::Url::parse(next).is_err()
}

/// The signed-in user of a protected request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn user(&self) -> &User {
        &self.0
    }
}

fn original_target(req: &HttpRequest) -> String {
    req.uri()
        .path_and_query()
        .map_or_else(|| req.path().to_owned(), |pq| pq.as_str().to_owned())
}

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = SessionContext::from_request(req, payload);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let locale = RequestLocale::from_request_headers(req);
        let target = original_target(req);

        Box::pin(async move {
            let session = session.await?;
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let deny = |session: &SessionContext| -> Result<Self, actix_web::Error> {
                session.flash(locale.text(&Message::PleaseLogIn))?;
                Err(LoginRequired::new(target.clone()).into())
            };

            let Some(user_id) = session.user_id()? else {
                return deny(&session);
            };
            let user = match state.users.current_user(&user_id).await {
                Ok(user) => user,
                Err(error) if error.code() == ErrorCode::Unauthorized => {
                    debug!(%user_id, "session refers to a missing user");
                    session.forget_user();
                    return deny(&session);
                }
                Err(error) => return Err(error.into()),
            };
            state.accounts.record_activity(&user_id).await?;
            Ok(Self(user))
        })
    }
}
