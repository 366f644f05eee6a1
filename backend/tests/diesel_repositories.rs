//! Integration tests for the Diesel repositories against PostgreSQL.
//!
//! Set `MICROBLOG_TEST_DATABASE_URL` to a disposable database to run them;
//! without it each test prints a skip marker and returns. Migrations are
//! applied once per test binary and every test works on freshly named users
//! so runs can share one database.

use chrono::{TimeZone, Utc};
use pagination::PageRequest;
use rstest::rstest;
use tokio::sync::OnceCell;
use uuid::Uuid;

use microblog::domain::ports::{
    FollowRepository, NewPost, PostRepository, UserPersistenceError, UserRepository,
};
use microblog::domain::{
    AboutMe, AvatarPath, EmailAddress, PasswordHash, PostBody, PostId, User, UserId, Username,
};
use microblog::outbound::persistence::{
    DbPool, DieselFollowRepository, DieselPostRepository, DieselUserRepository, PoolConfig,
    run_pending_migrations,
};

const DATABASE_URL_VAR: &str = "MICROBLOG_TEST_DATABASE_URL";

static MIGRATED: OnceCell<()> = OnceCell::const_new();

async fn test_pool() -> Option<DbPool> {
    let Ok(url) = std::env::var(DATABASE_URL_VAR) else {
        eprintln!("SKIP-TEST-DATABASE: {DATABASE_URL_VAR} is not set");
        return None;
    };
    MIGRATED
        .get_or_init(|| async {
            run_pending_migrations(&url)
                .await
                .expect("migrations apply");
        })
        .await;
    Some(
        DbPool::new(PoolConfig::new(url))
            .await
            .expect("pool connects"),
    )
}

fn fresh_user(prefix: &str) -> User {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(12).collect();
    let name = format!("{prefix}_{suffix}");
    User::new(
        UserId::random(),
        Username::new(&name).expect("valid username"),
        EmailAddress::new(format!("{name}@example.com")).expect("valid email"),
    )
}

fn hash() -> PasswordHash {
    PasswordHash::new("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA")
}

async fn insert(users: &DieselUserRepository, prefix: &str) -> User {
    let user = fresh_user(prefix);
    users.create(&user, &hash()).await.expect("user inserted");
    user
}

async fn publish(posts: &DieselPostRepository, author: &User, body: &str, secs: i64) {
    posts
        .create(&NewPost {
            id: PostId::random(),
            author: author.id().clone(),
            body: PostBody::new(body).expect("valid body"),
            created_at: Utc
                .timestamp_opt(1_700_000_000 + secs, 0)
                .single()
                .expect("valid timestamp"),
        })
        .await
        .expect("post inserted");
}

fn bodies(page: &pagination::Page<microblog::domain::Post>) -> Vec<String> {
    page.items()
        .iter()
        .map(|post| post.body().as_ref().to_owned())
        .collect()
}

#[rstest]
#[tokio::test]
async fn users_round_trip_through_lookups() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let users = DieselUserRepository::new(pool);
    let user = insert(&users, "alice").await;

    let by_id = users.find_by_id(user.id()).await.expect("lookup");
    let by_name = users
        .find_by_username(user.username())
        .await
        .expect("lookup");
    let credentials = users
        .find_credentials(user.username())
        .await
        .expect("lookup")
        .expect("credentials exist");

    assert_eq!(by_id.as_ref(), Some(&user));
    assert_eq!(by_name.as_ref(), Some(&user));
    assert_eq!(credentials.password_hash, hash());
    assert!(users.username_taken(user.username()).await.expect("check"));
    assert!(users.email_taken(user.email()).await.expect("check"));
}

#[rstest]
#[tokio::test]
async fn duplicate_username_and_email_are_distinguished() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let users = DieselUserRepository::new(pool);
    let existing = insert(&users, "dup").await;

    let same_name = User::new(
        UserId::random(),
        existing.username().clone(),
        fresh_user("other").email().clone(),
    );
    let same_email = User::new(
        UserId::random(),
        fresh_user("other").username().clone(),
        existing.email().clone(),
    );

    assert_eq!(
        users.create(&same_name, &hash()).await,
        Err(UserPersistenceError::DuplicateUsername)
    );
    assert_eq!(
        users.create(&same_email, &hash()).await,
        Err(UserPersistenceError::DuplicateEmail)
    );
}

#[rstest]
#[tokio::test]
async fn profile_last_seen_and_avatar_updates_persist() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let users = DieselUserRepository::new(pool);
    let user = insert(&users, "editor").await;
    let renamed = fresh_user("renamed").username().clone();
    let about = AboutMe::parse("hello there").expect("valid about me");
    let seen = Utc
        .timestamp_opt(1_700_000_100, 0)
        .single()
        .expect("valid timestamp");
    let avatar = AvatarPath::for_file_name("abc.png").expect("valid avatar");

    users
        .update_profile(user.id(), &renamed, about.clone())
        .await
        .expect("profile updated");
    users
        .touch_last_seen(user.id(), seen)
        .await
        .expect("last seen updated");
    users
        .set_avatar(user.id(), &avatar)
        .await
        .expect("avatar updated");

    let stored = users
        .find_by_id(user.id())
        .await
        .expect("lookup")
        .expect("user exists");
    assert_eq!(stored.username(), &renamed);
    assert_eq!(stored.about_me(), about.as_ref());
    assert_eq!(stored.last_seen(), Some(seen));
    assert_eq!(stored.avatar(), Some(&avatar));
}

#[rstest]
#[tokio::test]
async fn follow_relation_is_idempotent_and_counted() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let users = DieselUserRepository::new(pool.clone());
    let follows = DieselFollowRepository::new(pool);
    let ada = insert(&users, "ada").await;
    let bob = insert(&users, "bob").await;

    follows.follow(ada.id(), bob.id()).await.expect("follow");
    follows.follow(ada.id(), bob.id()).await.expect("follow again");

    assert!(follows.is_following(ada.id(), bob.id()).await.expect("check"));
    assert!(!follows.is_following(bob.id(), ada.id()).await.expect("check"));
    assert_eq!(follows.count_followers(bob.id()).await.expect("count"), 1);
    assert_eq!(follows.count_following(ada.id()).await.expect("count"), 1);

    follows.unfollow(ada.id(), bob.id()).await.expect("unfollow");
    follows.unfollow(ada.id(), bob.id()).await.expect("unfollow again");

    assert!(!follows.is_following(ada.id(), bob.id()).await.expect("check"));
    assert_eq!(follows.count_followers(bob.id()).await.expect("count"), 0);
}

#[rstest]
#[tokio::test]
async fn followed_feed_pages_newest_first() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let users = DieselUserRepository::new(pool.clone());
    let posts = DieselPostRepository::new(pool.clone());
    let follows = DieselFollowRepository::new(pool);
    let ada = insert(&users, "ada").await;
    let bob = insert(&users, "bob").await;
    let eve = insert(&users, "eve").await;
    follows.follow(ada.id(), bob.id()).await.expect("follow");

    publish(&posts, &ada, "ada one", 1).await;
    publish(&posts, &bob, "bob one", 2).await;
    publish(&posts, &eve, "eve one", 3).await;
    publish(&posts, &ada, "ada two", 4).await;

    let first = posts
        .followed_feed(ada.id(), PageRequest::new(1, 2).expect("valid page"))
        .await
        .expect("feed");
    let second = posts
        .followed_feed(ada.id(), PageRequest::new(2, 2).expect("valid page"))
        .await
        .expect("feed");

    assert_eq!(first.total(), 3);
    assert_eq!(bodies(&first), ["ada two", "bob one"]);
    assert_eq!(bodies(&second), ["ada one"]);
    assert!(first.has_next());
    assert!(!second.has_next());
}

#[rstest]
#[tokio::test]
async fn delete_by_body_removes_only_exact_matches() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let users = DieselUserRepository::new(pool.clone());
    let posts = DieselPostRepository::new(pool);
    let ada = insert(&users, "ada").await;
    let bob = insert(&users, "bob").await;
    publish(&posts, &ada, "same text", 1).await;
    publish(&posts, &ada, "same text", 2).await;
    publish(&posts, &ada, "same text!", 3).await;
    publish(&posts, &bob, "same text", 4).await;

    let removed = posts
        .delete_by_body(ada.id(), "same text")
        .await
        .expect("delete");

    let page = PageRequest::new(1, 10).expect("valid page");
    let remaining = posts.by_author(ada.id(), page).await.expect("feed");
    let untouched = posts.by_author(bob.id(), page).await.expect("feed");
    assert_eq!(removed, 2);
    assert_eq!(bodies(&remaining), ["same text!"]);
    assert_eq!(untouched.total(), 1);
}
