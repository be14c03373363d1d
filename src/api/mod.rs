//! API layer
//!
//! HTTP handlers for:
//! - Accounts and sessions (`/api/v1/users`)
//! - Follow graph (`/api/v1/follows`)
//! - Posts (`/api/v1/posts`)
//! - Media uploads (`/api/v1/media`)
//! - Metrics (Prometheus)

mod envelope;
mod extract;
mod follows;
mod media;
pub mod metrics;
mod posts;
mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};

use crate::AppState;
use crate::service::{MAX_FILES_PER_UPLOAD, max_file_bytes};

pub use metrics::{metrics_router, track_http_metrics};

/// Multipart framing on top of the largest allowed batch
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create the `/api/v1` router
///
/// JSON routes share `json_body_limit`; media routes accept a full batch
/// of the largest kind.
pub fn api_router(json_body_limit: usize) -> Router<AppState> {
    let media_body_limit = MAX_FILES_PER_UPLOAD * max_file_bytes(crate::data::MediaKind::Video)
        + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .nest("/users", users_router())
        .nest("/follows", follows_router())
        .nest("/posts", posts_router())
        .layer(DefaultBodyLimit::max(json_body_limit))
        .nest(
            "/media",
            media_router().layer(DefaultBodyLimit::max(media_body_limit)),
        )
}

fn users_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/logout", post(users::logout))
        .route("/refresh-token", post(users::refresh_token))
        .route("/change-password", post(users::change_password))
        .route("/update-profile", post(users::update_profile))
        .route("/update-privacy", post(users::update_privacy))
        .route("/profile", get(users::my_profile))
        .route("/profile/:id", get(users::profile))
        .route("/search", get(users::search))
}

fn follows_router() -> Router<AppState> {
    Router::new()
        .route("/follow", post(follows::follow))
        .route("/unfollow", post(follows::unfollow))
        .route("/requests/respond", post(follows::respond_to_request))
        .route("/check", post(follows::check_status))
        .route("/block", post(follows::block))
        .route("/unblock", post(follows::unblock))
        .route("/me/followers", get(follows::my_followers))
        .route("/me/following", get(follows::my_following))
        .route("/me/stats", get(follows::my_stats))
        .route("/requests", get(follows::pending_requests))
        .route("/blocked", get(follows::blocked_accounts))
        .route("/recommended", get(follows::recommended))
        .route("/users/:userId/followers", get(follows::user_followers))
        .route("/users/:userId/following", get(follows::user_following))
        .route("/users/:userId/stats", get(follows::user_stats))
        .route("/users/:userId/mutual", get(follows::mutual_followers))
}

fn posts_router() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::my_posts).post(posts::create_post))
        .route("/search", get(posts::search_posts))
        .route(
            "/:id",
            get(posts::get_post)
                .patch(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/users/:userId", get(posts::user_posts))
}

fn media_router() -> Router<AppState> {
    Router::new()
        .route("/single/:kind", post(media::upload_single))
        .route("/multiple/:kind", post(media::upload_multiple))
        .route("/", delete(media::delete_media))
}
