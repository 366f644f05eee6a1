//! Feed pages and post mutations.
//!
//! ```text
//! GET|POST / and /index[?page=N]
//! GET /explore[?page=N]
//! GET /del_msg/{username}/{post}
//! ```

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::domain::{Message, PostBody};

use super::auth::{CurrentUser, HOME_PATH};
use super::error::PageResult;
use super::forms::{PageQuery, PostForm, post_error};
use super::locale::RequestLocale;
use super::session::SessionContext;
use super::state::HttpState;
use super::views::{FeedView, IndexPage, Layout, PostFormView, path_link, render, see_other};

const EXPLORE_PATH: &str = "/explore";

async fn home_page(
    state: &HttpState,
    session: &SessionContext,
    locale: RequestLocale,
    current: &CurrentUser,
    page: u32,
    form: PostFormView,
) -> PageResult<HttpResponse> {
    let me = current.user();
    let feed = state.feeds.home_feed(me.id(), page).await?;
    render(&IndexPage {
        layout: Layout::for_request("Home", session, locale, Some(me))?,
        form: Some(form),
        feed: FeedView::new(&feed, HOME_PATH, me.id()),
    })
}

/// Home feed with the post form.
pub async fn index(
    state: web::Data<HttpState>,
    session: SessionContext,
    locale: RequestLocale,
    current: CurrentUser,
    query: web::Query<PageQuery>,
) -> PageResult<HttpResponse> {
    home_page(
        &state,
        &session,
        locale,
        &current,
        query.number(),
        PostFormView::default(),
    )
    .await
}

/// Publish a post, then redirect back to the home feed.
pub async fn publish(
    state: web::Data<HttpState>,
    session: SessionContext,
    locale: RequestLocale,
    current: CurrentUser,
    query: web::Query<PageQuery>,
    form: web::Form<PostForm>,
) -> PageResult<HttpResponse> {
    let PostForm { post } = form.into_inner();
    let body = match PostBody::new(&post) {
        Ok(body) => body,
        Err(err) => {
            let form = PostFormView {
                error: Some(post_error(&err, locale)),
                body: post,
            };
            return home_page(&state, &session, locale, &current, query.number(), form).await;
        }
    };

    let published = state.posts.publish(current.user().id(), &body).await?;
    info!(post_id = %published.id(), author = %current.user().username(), "post published");
    session.flash(locale.text(&Message::PostLive))?;
    Ok(see_other(HOME_PATH))
}

/// Every user's posts, newest first.
pub async fn explore(
    state: web::Data<HttpState>,
    session: SessionContext,
    locale: RequestLocale,
    current: CurrentUser,
    query: web::Query<PageQuery>,
) -> PageResult<HttpResponse> {
    let me = current.user();
    let feed = state.feeds.explore(query.number()).await?;
    render(&IndexPage {
        layout: Layout::for_request("Explore", &session, locale, Some(me))?,
        form: None,
        feed: FeedView::new(&feed, EXPLORE_PATH, me.id()),
    })
}

/// Delete the signed-in user's posts matching `post` exactly.
pub async fn delete_post(
    state: web::Data<HttpState>,
    current: CurrentUser,
    path: web::Path<(String, String)>,
) -> PageResult<HttpResponse> {
    let (username, body) = path.into_inner();
    let removed = state
        .posts
        .delete_matching(current.user().id(), &username, &body)
        .await?;
    info!(%username, removed, "posts deleted");
    Ok(see_other(path_link(&["users", &username])))
}
