//! End-to-end page flows over the in-memory adapters.

use actix_http::Request;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{ACCEPT_LANGUAGE, CONTENT_TYPE};
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use chrono::{DateTime, Utc};
use rstest::rstest;

use crate::domain::Username;
use crate::domain::ports::UserRepository;
use crate::outbound::memory::InMemoryStore;

use super::configure;
use super::test_utils::{TEST_PASSWORD, TestApp, location, session_cookie, test_session_middleware};

const BOUNDARY: &str = "microblog-test-boundary";

/// Cookie jar for a single visitor.
#[derive(Default)]
struct Visitor {
    cookie: Option<Cookie<'static>>,
}

impl Visitor {
    async fn send<S>(&mut self, app: &S, request: TestRequest) -> ServiceResponse
    where
        S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    {
        let request = match &self.cookie {
            Some(cookie) => request.cookie(cookie.clone()),
            None => request,
        };
        let response = test::call_service(app, request.to_request()).await;
        if let Some(cookie) = session_cookie(&response) {
            self.cookie = Some(cookie);
        }
        response
    }

    async fn get<S>(&mut self, app: &S, uri: &str) -> ServiceResponse
    where
        S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    {
        self.send(app, TestRequest::get().uri(uri)).await
    }

    async fn post_form<S>(&mut self, app: &S, uri: &str, form: &[(&str, &str)]) -> ServiceResponse
    where
        S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    {
        self.send(app, TestRequest::post().uri(uri).set_form(form))
            .await
    }

    async fn sign_in<S>(&mut self, app: &S, username: &str)
    where
        S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    {
        let res = self
            .post_form(
                app,
                "/login",
                &[("username", username), ("password", TEST_PASSWORD)],
            )
            .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/index");
    }
}

async fn body(res: ServiceResponse) -> String {
    String::from_utf8(test::read_body(res).await.to_vec()).expect("utf8 body")
}

async fn init(
    ctx: &TestApp,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(ctx.state.clone()))
            .wrap(test_session_middleware())
            .configure(configure),
    )
    .await
}

fn multipart_image(content_type: &str, bytes: &[u8]) -> Vec<u8> {
    multipart_field("img", content_type, bytes)
}

fn multipart_field(name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut payload = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"avatar\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    payload.extend_from_slice(bytes);
    payload.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    payload
}

async fn last_seen(store: &InMemoryStore, username: &str) -> Option<DateTime<Utc>> {
    let username = Username::new(username).expect("valid username");
    store
        .find_by_username(&username)
        .await
        .expect("lookup")
        .expect("user exists")
        .last_seen()
}

fn upload_request(payload: Vec<u8>) -> TestRequest {
    TestRequest::post()
        .uri("/upload")
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(payload)
}

#[rstest]
#[case("/index", "/login?next=%2Findex")]
#[case("/explore?page=2", "/login?next=%2Fexplore%3Fpage%3D2")]
#[case("/users/ada", "/login?next=%2Fusers%2Fada")]
#[actix_web::test]
async fn protected_pages_redirect_to_login(#[case] uri: &str, #[case] expected: &str) {
    let ctx = TestApp::new(3);
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();

    let res = visitor.get(&app, uri).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), expected);
    let login = body(visitor.get(&app, expected).await).await;
    assert!(login.contains("Please log in to access this page."));
}

#[rstest]
#[actix_web::test]
async fn login_gate_flash_follows_accept_language() {
    let ctx = TestApp::new(3);
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();

    visitor
        .send(
            &app,
            TestRequest::get()
                .uri("/index")
                .insert_header((ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9")),
        )
        .await;
    let login = body(visitor.get(&app, "/login").await).await;

    assert!(login.contains("请先登录再访问此页面。"));
}

#[rstest]
#[case(Some("/explore"), "/explore")]
#[case(Some("https://evil.example/"), "/index")]
#[case(Some("//evil.example/"), "/index")]
#[case(None, "/index")]
#[actix_web::test]
async fn login_follows_only_local_next(#[case] next: Option<&str>, #[case] expected: &str) {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    let uri = next.map_or_else(
        || "/login".to_owned(),
        |next| {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("next", next)
                .finish();
            format!("/login?{query}")
        },
    );

    let res = visitor
        .post_form(&app, &uri, &[("username", "ada"), ("password", TEST_PASSWORD)])
        .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), expected);
}

#[rstest]
#[actix_web::test]
async fn wrong_password_flashes_and_returns_to_login() {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();

    let res = visitor
        .post_form(&app, "/login", &[("username", "ada"), ("password", "nope")])
        .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
    let page = body(visitor.get(&app, "/login").await).await;
    assert!(page.contains("Invalid username or password"));
}

#[rstest]
#[actix_web::test]
async fn empty_login_fields_rerender_the_form() {
    let ctx = TestApp::new(3);
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();

    let res = visitor
        .post_form(&app, "/login", &[("username", "ada"), ("password", "")])
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(body(res).await.contains("This field is required."));
}

#[rstest]
#[actix_web::test]
async fn signed_in_visitors_skip_login_and_register() {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    visitor.sign_in(&app, "ada").await;

    for uri in ["/login", "/register"] {
        let res = visitor.get(&app, uri).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/index");
    }
}

#[rstest]
#[actix_web::test]
async fn logout_ends_the_session() {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    visitor.sign_in(&app, "ada").await;

    let res = visitor.get(&app, "/logout").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/index");

    let res = visitor.get(&app, "/index").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login?next=%2Findex");
}

#[rstest]
#[actix_web::test]
async fn registration_redirects_to_login_with_flash() {
    let ctx = TestApp::new(3);
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();

    let res = visitor
        .post_form(
            &app,
            "/register",
            &[
                ("username", "ada"),
                ("email", "ada@example.com"),
                ("password", "pw"),
                ("password2", "pw"),
            ],
        )
        .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
    let page = body(visitor.get(&app, "/login").await).await;
    assert!(page.contains("Congratulations, you are now a registered user!"));
}

#[rstest]
#[case("ada", "other@example.com", "Please use a different username.")]
#[case("bob", "ada@example.com", "Please use a different email address.")]
#[actix_web::test]
async fn duplicate_registration_rerenders_with_field_error(
    #[case] username: &str,
    #[case] email: &str,
    #[case] expected: &str,
) {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();

    let res = visitor
        .post_form(
            &app,
            "/register",
            &[
                ("username", username),
                ("email", email),
                ("password", "pw"),
                ("password2", "pw"),
            ],
        )
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(body(res).await.contains(expected));
}

#[rstest]
#[actix_web::test]
async fn mismatched_passwords_rerender_the_form() {
    let ctx = TestApp::new(3);
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();

    let res = visitor
        .post_form(
            &app,
            "/register",
            &[
                ("username", "ada"),
                ("email", "ada@example.com"),
                ("password", "pw"),
                ("password2", "other"),
            ],
        )
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(body(res).await.contains("Field must be equal to password."));
}

#[rstest]
#[actix_web::test]
async fn posting_redirects_and_shows_the_post() {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    visitor.sign_in(&app, "ada").await;

    let res = visitor
        .post_form(&app, "/index", &[("post", "hello world")])
        .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/index");

    let page = body(visitor.get(&app, "/index").await).await;
    assert!(page.contains("Your post is now live!"));
    assert!(page.contains("hello world"));
    assert!(page.contains("/del_msg/ada/hello%20world"));
}

#[rstest]
#[actix_web::test]
async fn empty_post_rerenders_with_error() {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    visitor.sign_in(&app, "ada").await;

    let res = visitor.post_form(&app, "/", &[("post", "   ")]).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(body(res).await.contains("This field is required."));
}

#[rstest]
#[actix_web::test]
async fn home_feed_pages_newest_first() {
    let ctx = TestApp::new(2);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    visitor.sign_in(&app, "ada").await;
    for text in ["first", "second", "third"] {
        visitor.post_form(&app, "/index", &[("post", text)]).await;
    }

    let first = body(visitor.get(&app, "/index").await).await;
    assert!(first.contains("third") && first.contains("second"));
    assert!(!first.contains(">first<"));
    assert!(first.contains("/index?page=2"));

    let second = body(visitor.get(&app, "/index?page=2").await).await;
    assert!(second.contains(">first<"));
    assert!(second.contains("/index?page=1"));
}

#[rstest]
#[actix_web::test]
async fn unknown_profiles_are_not_found() {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    visitor.sign_in(&app, "ada").await;

    let res = visitor.get(&app, "/users/nobody").await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(body(res).await.contains("User nobody not found."));
}

#[rstest]
#[actix_web::test]
async fn follow_and_unfollow_flash_and_redirect() {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    ctx.register("bob").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    visitor.sign_in(&app, "ada").await;

    let res = visitor.get(&app, "/follow/bob").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/users/bob");
    let profile = body(visitor.get(&app, "/users/bob").await).await;
    assert!(profile.contains("You are following bob!"));
    assert!(profile.contains("/unfollow/bob"));

    let res = visitor.get(&app, "/unfollow/bob").await;
    assert_eq!(location(&res), "/users/bob");
    let profile = body(visitor.get(&app, "/users/bob").await).await;
    assert!(profile.contains("You are not following bob."));
    assert!(profile.contains("/follow/bob"));
}

#[rstest]
#[case("/follow/nobody", "/index", "User nobody not found.")]
#[case("/unfollow/nobody", "/index", "User nobody not found.")]
#[case("/follow/ada", "/users/ada", "You cannot follow yourself!")]
#[case("/unfollow/ada", "/users/ada", "You cannot unfollow yourself!")]
#[actix_web::test]
async fn refused_follow_changes_flash(
    #[case] uri: &str,
    #[case] redirect: &str,
    #[case] flash: &str,
) {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    visitor.sign_in(&app, "ada").await;

    let res = visitor.get(&app, uri).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), redirect);

    let page = body(visitor.get(&app, redirect).await).await;
    assert!(page.contains(flash));
}

#[rstest]
#[actix_web::test]
async fn only_the_author_deletes_posts() {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    ctx.register("bob").await;
    let app = init(&ctx).await;
    let mut ada = Visitor::default();
    ada.sign_in(&app, "ada").await;
    ada.post_form(&app, "/index", &[("post", "hello world")]).await;

    let mut bob = Visitor::default();
    bob.sign_in(&app, "bob").await;
    let res = bob.get(&app, "/del_msg/ada/hello%20world").await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = ada.get(&app, "/del_msg/ada/hello%20world").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/users/ada");
    let profile = body(ada.get(&app, "/users/ada").await).await;
    assert!(!profile.contains("hello world"));
}

#[rstest]
#[actix_web::test]
async fn edit_profile_saves_and_rerenders() {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    visitor.sign_in(&app, "ada").await;

    let form = body(visitor.get(&app, "/edit_profile/ada").await).await;
    assert!(form.contains("value=\"ada\""));

    let res = visitor
        .post_form(
            &app,
            "/edit_profile/ada",
            &[("username", "ada"), ("about_me", "Analytical engines")],
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let page = body(res).await;
    assert!(page.contains("Your changes have been saved."));
    assert!(page.contains("Analytical engines"));
}

#[rstest]
#[actix_web::test]
async fn editing_someone_elses_profile_is_forbidden() {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    ctx.register("bob").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    visitor.sign_in(&app, "ada").await;

    let res = visitor.get(&app, "/edit_profile/bob").await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn avatar_upload_returns_the_public_path() {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    visitor.sign_in(&app, "ada").await;

    let res = visitor
        .send(
            &app,
            TestRequest::post()
                .uri("/upload")
                .insert_header((
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                ))
                .set_payload(multipart_image("image/png", b"\x89PNG fake")),
        )
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let path = body(res).await;
    assert!(path.starts_with("/static/upload/"));
    assert!(path.ends_with(".png"));
    let profile = body(visitor.get(&app, "/users/ada").await).await;
    assert!(profile.contains(&path));
}

#[rstest]
#[actix_web::test]
async fn avatar_upload_rejects_other_types() {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    visitor.sign_in(&app, "ada").await;

    let res = visitor
        .send(
            &app,
            TestRequest::post()
                .uri("/upload")
                .insert_header((
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                ))
                .set_payload(multipart_image("image/gif", b"GIF89a")),
        )
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body(res).await.contains("unsupported image type"));
}

#[rstest]
#[actix_web::test]
async fn avatar_upload_rejects_oversized_images() {
    let mut ctx = TestApp::new(3);
    ctx.state = ctx.state.clone().with_max_upload_bytes(8);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    visitor.sign_in(&app, "ada").await;

    let res = visitor
        .send(
            &app,
            upload_request(multipart_image("image/png", b"\x89PNG well past the cap")),
        )
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body(res).await.contains("uploaded image exceeds 8 bytes"));
    let profile = body(visitor.get(&app, "/users/ada").await).await;
    assert!(!profile.contains("/static/upload/"));
}

#[rstest]
#[actix_web::test]
async fn avatar_upload_requires_the_image_field() {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    visitor.sign_in(&app, "ada").await;

    let res = visitor
        .send(
            &app,
            upload_request(multipart_field("picture", "image/png", b"\x89PNG fake")),
        )
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body(res).await.contains("no image was uploaded"));
}

#[rstest]
#[actix_web::test]
async fn explore_lists_everyone_without_the_post_form() {
    let ctx = TestApp::new(2);
    ctx.register("ada").await;
    ctx.register("bob").await;
    let app = init(&ctx).await;
    let mut bob = Visitor::default();
    bob.sign_in(&app, "bob").await;
    bob.post_form(&app, "/index", &[("post", "from bob")]).await;
    let mut ada = Visitor::default();
    ada.sign_in(&app, "ada").await;
    for text in ["ada one", "ada two"] {
        ada.post_form(&app, "/index", &[("post", text)]).await;
    }

    let home = body(ada.get(&app, "/index").await).await;
    assert!(!home.contains("from bob"));

    let first = body(ada.get(&app, "/explore").await).await;
    assert!(!first.contains("name=\"post\""));
    assert!(first.contains("ada two") && first.contains("ada one"));
    assert!(!first.contains("from bob"));
    assert!(first.contains("/explore?page=2"));

    let second = body(ada.get(&app, "/explore?page=2").await).await;
    assert!(second.contains("from bob"));
    assert!(second.contains("/explore?page=1"));
}

#[rstest]
#[actix_web::test]
async fn protected_requests_record_last_seen() {
    let ctx = TestApp::new(3);
    ctx.register("ada").await;
    let app = init(&ctx).await;
    let mut visitor = Visitor::default();
    visitor.sign_in(&app, "ada").await;
    let before = last_seen(&ctx.store, "ada").await;

    let res = visitor.get(&app, "/index").await;
    assert_eq!(res.status(), StatusCode::OK);

    let after = last_seen(&ctx.store, "ada").await;
    assert!(after.is_some());
    assert!(after > before);
}
