//! HTTP inbound adapter serving the server-rendered pages.

pub mod account;
pub mod auth;
pub mod error;
pub mod forms;
pub mod health;
pub mod locale;
pub mod posts;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
#[cfg(test)]
mod tests;
pub mod upload;
pub mod users;
pub mod views;

use actix_web::web;

pub use error::PageResult;

/// Register every page route.
///
/// Handlers expect `web::Data<HttpState>` in the application data.
///
/// # Examples
/// ```no_run
/// use actix_web::App;
/// use microblog::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(["/", "/index"])
            .route(web::get().to(posts::index))
            .route(web::post().to(posts::publish)),
    )
    .service(
        web::resource("/login")
            .route(web::get().to(account::login_form))
            .route(web::post().to(account::login)),
    )
    .route("/logout", web::get().to(account::logout))
    .service(
        web::resource("/register")
            .route(web::get().to(account::register_form))
            .route(web::post().to(account::register)),
    )
    .route("/explore", web::get().to(posts::explore))
    .route("/users/{username}", web::get().to(users::profile))
    .service(
        web::resource("/edit_profile/{username}")
            .route(web::get().to(users::edit_profile_form))
            .route(web::post().to(users::edit_profile)),
    )
    .route("/follow/{username}", web::get().to(users::follow))
    .route("/unfollow/{username}", web::get().to(users::unfollow))
    .route(
        "/del_msg/{username}/{post}",
        web::get().to(posts::delete_post),
    )
    .service(
        web::resource("/upload")
            .route(web::get().to(upload::upload_form))
            .route(web::post().to(upload::upload)),
    );
}
