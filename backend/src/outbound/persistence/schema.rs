//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after adding a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique, case-sensitive handle (max 64 characters).
        username -> Varchar,
        /// Unique, lower-cased contact address (max 120 characters).
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Biography (max 140 characters).
        about_me -> Nullable<Varchar>,
        /// Time of the latest authenticated request.
        last_seen -> Nullable<Timestamptz>,
        /// Public path of the uploaded avatar.
        icon_path -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Published posts.
    posts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Post text (max 140 characters).
        body -> Varchar,
        /// Publication time.
        created_at -> Timestamptz,
        /// Author; cascades on account deletion.
        user_id -> Uuid,
    }
}

diesel::table! {
    /// Follower relation; a user never follows themself.
    followers (follower_id, followed_id) {
        /// The following user.
        follower_id -> Uuid,
        /// The followed user.
        followed_id -> Uuid,
    }
}

diesel::joinable!(posts -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(followers, posts, users);
