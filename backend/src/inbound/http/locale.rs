//! Request locale negotiated from `Accept-Language`.

use std::convert::Infallible;

use actix_web::http::header::{AcceptLanguage, Header, Preference, Quality};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};

use crate::domain::{Locale, Message};

/// Locale the response should be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestLocale(pub Locale);

impl RequestLocale {
    /// Negotiate from the request headers, falling back to English.
    ///
    /// A missing or malformed `Accept-Language` header selects English.
    pub fn from_request_headers(req: &HttpRequest) -> Self {
        let preferred = AcceptLanguage::parse(req)
            .map(|header| preferred_languages(&header))
            .unwrap_or_default();
        Self(Locale::first_supported(preferred))
    }

    /// Render `message` in this locale.
    pub fn text(self, message: &Message) -> String {
        message.text(self.0)
    }
}

/// Primary subtags ranked by quality, highest first.
///
/// Ranges with `q=0` are refused by the client and dropped; the wildcard
/// carries no language and is skipped. Equal qualities keep header order.
fn preferred_languages(header: &AcceptLanguage) -> Vec<String> {
    let mut accepted: Vec<_> = header
        .0
        .iter()
        .filter(|item| item.quality >= Quality::MIN)
        .collect();
    accepted.sort_by(|a, b| b.quality.cmp(&a.quality));
    accepted
        .into_iter()
        .filter_map(|item| match &item.item {
            Preference::Specific(tag) => Some(tag.primary_language().to_owned()),
            Preference::Any => None,
        })
        .collect()
}

impl FromRequest for RequestLocale {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::from_request_headers(req)))
    }
}
