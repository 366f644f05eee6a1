//! Page models rendered through the askama templates in `templates/`.
//!
//! Handlers turn domain values into these flat view structs so templates
//! never call into the domain.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use askama::Template;
use chrono::{DateTime, Utc};
use pagination::Page;
use url::Url;

use crate::domain::{Error, Locale, Post, Profile, User, UserId};

use super::locale::RequestLocale;
use super::session::SessionContext;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Chrome shared by every page.
#[derive(Debug, Clone)]
pub struct Layout {
    pub title: String,
    pub lang: &'static str,
    pub current_user: Option<String>,
    pub profile_link: Option<String>,
    pub flashes: Vec<String>,
}

impl Layout {
    pub fn new(title: impl Into<String>, locale: Locale, current_user: Option<&User>) -> Self {
        let username = current_user.map(|user| user.username().as_ref());
        Self {
            title: title.into(),
            lang: locale.tag(),
            current_user: username.map(str::to_owned),
            profile_link: username.map(|name| path_link(&["users", name])),
            flashes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_flashes(mut self, flashes: Vec<String>) -> Self {
        self.flashes = flashes;
        self
    }

    /// Page chrome for the current request, consuming pending flashes.
    pub fn for_request(
        title: &str,
        session: &SessionContext,
        locale: RequestLocale,
        current_user: Option<&User>,
    ) -> Result<Self, Error> {
        Ok(Self::new(title, locale.0, current_user).with_flashes(session.take_flashes()?))
    }
}

/// `303 See Other` to `location`.
pub fn see_other(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location.as_ref()))
        .finish()
}

/// Per-field validation messages for a form.
#[derive(Debug, Clone, Default)]
pub struct FormErrors(Vec<(&'static str, String)>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push((field, message.into()));
    }

    /// First message recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build an absolute path from raw segments, percent-encoding each one.
pub fn path_link(segments: &[&str]) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return "/".to_owned();
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    url.path().to_owned()
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// One post in a feed.
#[derive(Debug, Clone)]
pub struct PostView {
    pub author: String,
    pub author_link: String,
    pub avatar: Option<String>,
    pub body: String,
    pub timestamp: String,
    pub delete_link: Option<String>,
}

impl PostView {
    pub fn new(post: &Post, viewer: &UserId) -> Self {
        let written_by = post.author();
        let author = written_by.username.as_ref();
        let body = post.body().as_ref();
        Self {
            author: author.to_owned(),
            author_link: path_link(&["users", author]),
            avatar: written_by.avatar.as_ref().map(|path| path.as_ref().to_owned()),
            body: body.to_owned(),
            timestamp: format_timestamp(post.created_at()),
            delete_link: (written_by.id == *viewer).then(|| path_link(&["del_msg", author, body])),
        }
    }
}

/// A page of posts with its navigation links.
#[derive(Debug, Clone, Default)]
pub struct FeedView {
    pub posts: Vec<PostView>,
    pub next_url: Option<String>,
    pub prev_url: Option<String>,
}

impl FeedView {
    pub fn new(page: &Page<Post>, base_path: &str, viewer: &UserId) -> Self {
        let links = page.links(base_path);
        Self {
            posts: page
                .items()
                .iter()
                .map(|post| PostView::new(post, viewer))
                .collect(),
            next_url: links.next,
            prev_url: links.prev,
        }
    }
}

/// Post form shown above the home feed.
#[derive(Debug, Clone, Default)]
pub struct PostFormView {
    pub body: String,
    pub error: Option<String>,
}

/// Home feed and explore page.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub layout: Layout,
    pub form: Option<PostFormView>,
    pub feed: FeedView,
}

/// Sign-in form.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub layout: Layout,
    pub username: String,
    pub remember_me: bool,
    /// Form target, carrying `next` when present.
    pub action: String,
    pub errors: FormErrors,
}

/// Registration form.
#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub layout: Layout,
    pub username: String,
    pub email: String,
    pub errors: FormErrors,
}

/// Profile header data.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub username: String,
    pub avatar: Option<String>,
    pub about_me: Option<String>,
    pub last_seen: Option<String>,
    pub is_self: bool,
    pub is_following: bool,
    pub followers: u64,
    pub following: u64,
    pub edit_link: String,
    pub follow_link: String,
    pub unfollow_link: String,
}

impl From<&Profile> for ProfileView {
    fn from(profile: &Profile) -> Self {
        let user = &profile.user;
        let username = user.username().as_ref();
        Self {
            username: username.to_owned(),
            avatar: user.avatar().map(|path| path.as_ref().to_owned()),
            about_me: user.about_me().map(|text| text.as_ref().to_owned()),
            last_seen: user.last_seen().map(format_timestamp),
            is_self: profile.is_self,
            is_following: profile.is_following,
            followers: profile.followers,
            following: profile.following,
            edit_link: path_link(&["edit_profile", username]),
            follow_link: path_link(&["follow", username]),
            unfollow_link: path_link(&["unfollow", username]),
        }
    }
}

/// Profile page with the owner's posts.
#[derive(Template)]
#[template(path = "user.html")]
pub struct UserPage {
    pub layout: Layout,
    pub profile: ProfileView,
    pub feed: FeedView,
}

/// Edit-profile form.
#[derive(Template)]
#[template(path = "edit_profile.html")]
pub struct EditProfilePage {
    pub layout: Layout,
    pub action: String,
    pub username: String,
    pub about_me: String,
    pub errors: FormErrors,
}

/// Avatar upload form.
#[derive(Template)]
#[template(path = "upload.html")]
pub struct UploadPage {
    pub layout: Layout,
}

/// Error page rendered for domain errors.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub layout: Layout,
    pub status: u16,
    pub message: String,
}

/// Render `page` as an HTML response with `status`.
pub fn render_with_status<T: Template>(page: &T, status: StatusCode) -> Result<HttpResponse, Error> {
    let html = page
        .render()
        .map_err(|err| Error::internal(format!("template rendering failed: {err}")))?;
    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(html))
}

/// Render `page` as a `200 OK` HTML response.
pub fn render<T: Template>(page: &T) -> Result<HttpResponse, Error> {
    render_with_status(page, StatusCode::OK)
}
