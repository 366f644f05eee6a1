//! Profile pages, profile edits and the follow graph.
//!
//! ```text
//! GET /users/{username}[?page=N]
//! GET|POST /edit_profile/{username}
//! GET /follow/{username}
//! GET /unfollow/{username}
//! ```

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::domain::{Error, ErrorCode, Message, ProfileUpdate, User, Username};

use super::auth::{CurrentUser, HOME_PATH};
use super::error::PageResult;
use super::forms::{EditProfileForm, PageQuery, conflict_errors, profile_errors};
use super::locale::RequestLocale;
use super::session::SessionContext;
use super::state::HttpState;
use super::views::{
    EditProfilePage, FeedView, FormErrors, Layout, ProfileView, UserPage, path_link, render,
    see_other,
};

fn profile_path(username: &str) -> String {
    path_link(&["users", username])
}

/// Profile header and the owner's posts.
pub async fn profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    locale: RequestLocale,
    current: CurrentUser,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> PageResult<HttpResponse> {
    let username = path.into_inner();
    let me = current.user();
    let profile = state.profiles.profile(me.id(), &username).await?;
    let feed = state.feeds.user_feed(&username, query.number()).await?;
    render(&UserPage {
        layout: Layout::for_request("Profile", &session, locale, Some(me))?,
        profile: ProfileView::from(&profile),
        feed: FeedView::new(&feed, &profile_path(&username), me.id()),
    })
}

fn ensure_own_profile(me: &User, username: &str) -> Result<(), Error> {
    if me.username().as_ref() == username {
        Ok(())
    } else {
        Err(Error::forbidden("You can only edit your own profile."))
    }
}

fn edit_profile_page(
    session: &SessionContext,
    locale: RequestLocale,
    me: &User,
    form: EditProfileForm,
    errors: FormErrors,
) -> PageResult<HttpResponse> {
    render(&EditProfilePage {
        layout: Layout::for_request("Edit Profile", session, locale, Some(me))?,
        action: path_link(&["edit_profile", me.username().as_ref()]),
        username: form.username,
        about_me: form.about_me,
        errors,
    })
}

fn current_values(user: &User) -> EditProfileForm {
    EditProfileForm {
        username: user.username().as_ref().to_owned(),
        about_me: user
            .about_me()
            .map(|text| text.as_ref().to_owned())
            .unwrap_or_default(),
    }
}

/// Edit-profile form pre-filled with the current values.
pub async fn edit_profile_form(
    session: SessionContext,
    locale: RequestLocale,
    current: CurrentUser,
    path: web::Path<String>,
) -> PageResult<HttpResponse> {
    let me = current.user();
    ensure_own_profile(me, &path)?;
    edit_profile_page(
        &session,
        locale,
        me,
        current_values(me),
        FormErrors::default(),
    )
}

/// Save an edit-profile submission and re-render the form.
pub async fn edit_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    locale: RequestLocale,
    current: CurrentUser,
    path: web::Path<String>,
    form: web::Form<EditProfileForm>,
) -> PageResult<HttpResponse> {
    let me = current.user();
    ensure_own_profile(me, &path)?;
    let form = form.into_inner();
    let update = match ProfileUpdate::try_from_parts(&form.username, &form.about_me) {
        Ok(update) => update,
        Err(err) => {
            let errors = profile_errors(&err, locale);
            return edit_profile_page(&session, locale, me, form, errors);
        }
    };

    match state.accounts.update_profile(me.id(), &update).await {
        Ok(updated) => {
            info!(user_id = %updated.id(), username = %updated.username(), "profile updated");
            session.flash(locale.text(&Message::ChangesSaved))?;
            let values = current_values(&updated);
            edit_profile_page(&session, locale, &updated, values, FormErrors::default())
        }
        Err(err) => match conflict_errors(&err, locale) {
            Some(errors) => edit_profile_page(&session, locale, me, form, errors),
            None => Err(err),
        },
    }
}

#[derive(Debug, Clone, Copy)]
enum FollowAction {
    Follow,
    Unfollow,
}

impl FollowAction {
    fn done(self, username: &Username) -> Message {
        let name = username.as_ref().to_owned();
        match self {
            Self::Follow => Message::Following(name),
            Self::Unfollow => Message::NotFollowing(name),
        }
    }

    fn refused(self) -> Message {
        match self {
            Self::Follow => Message::CannotFollowSelf,
            Self::Unfollow => Message::CannotUnfollowSelf,
        }
    }
}

async fn change_follow(
    state: &HttpState,
    session: &SessionContext,
    locale: RequestLocale,
    current: &CurrentUser,
    username: &str,
    action: FollowAction,
) -> PageResult<HttpResponse> {
    let me = current.user().id();
    let outcome = match action {
        FollowAction::Follow => state.follows.follow(me, username).await,
        FollowAction::Unfollow => state.follows.unfollow(me, username).await,
    };
    match outcome {
        Ok(target) => {
            info!(user_id = %me, target = %target, ?action, "follow graph changed");
            session.flash(locale.text(&action.done(&target)))?;
            Ok(see_other(profile_path(target.as_ref())))
        }
        Err(err) if err.code() == ErrorCode::NotFound => {
            session.flash(locale.text(&Message::UserNotFound(username.to_owned())))?;
            Ok(see_other(HOME_PATH))
        }
        Err(err) if err.code() == ErrorCode::InvalidRequest => {
            session.flash(locale.text(&action.refused()))?;
            Ok(see_other(profile_path(username)))
        }
        Err(err) => Err(err),
    }
}

/// Follow `username`.
pub async fn follow(
    state: web::Data<HttpState>,
    session: SessionContext,
    locale: RequestLocale,
    current: CurrentUser,
    path: web::Path<String>,
) -> PageResult<HttpResponse> {
    change_follow(&state, &session, locale, &current, &path, FollowAction::Follow).await
}

/// Stop following `username`.
pub async fn unfollow(
    state: web::Data<HttpState>,
    session: SessionContext,
    locale: RequestLocale,
    current: CurrentUser,
    path: web::Path<String>,
) -> PageResult<HttpResponse> {
    change_follow(&state, &session, locale, &current, &path, FollowAction::Unfollow).await
}
