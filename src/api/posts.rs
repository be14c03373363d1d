//! Post endpoints

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use super::envelope::ApiResponse;
use super::extract::{ValidJson, parse_id};
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::{NewPost, PostPatch, PostService, PostUpdate};

fn post_service(state: &AppState) -> PostService {
    PostService::new(state.db.clone())
}

#[derive(Debug, Deserialize)]
pub struct PostSearchParams {
    pub search: Option<String>,
}

/// GET /api/v1/posts
pub async fn my_posts(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let posts = post_service(&state).my_posts(&account).await?;
    let message = if posts.is_empty() {
        "No posts found"
    } else {
        "Posts fetched successfully"
    };
    Ok(ApiResponse::ok(posts, message))
}

/// POST /api/v1/posts
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ValidJson(input): ValidJson<NewPost>,
) -> Result<impl IntoResponse, AppError> {
    let post = post_service(&state).create(&account, input).await?;
    Ok(ApiResponse::created(post, "Post uploaded successfully"))
}

/// GET /api/v1/posts/search?search=
pub async fn search_posts(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Query(params): Query<PostSearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let posts = post_service(&state)
        .search(&account, params.search.as_deref().unwrap_or(""))
        .await?;
    Ok(ApiResponse::ok(posts, "Posts fetched successfully"))
}

/// GET /api/v1/posts/:id
pub async fn get_post(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "postId")?;
    let post = post_service(&state).detail(&account, &id).await?;
    Ok(ApiResponse::ok(post, "Post fetched successfully"))
}

/// PATCH /api/v1/posts/:id
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<PostPatch>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "postId")?;
    let response = match post_service(&state).update(&account, &id, patch).await? {
        PostUpdate::Unchanged(post) => ApiResponse::ok(post, "No changes detected"),
        PostUpdate::Updated(post) => ApiResponse::ok(post, "Post updated successfully"),
    };
    Ok(response)
}

/// DELETE /api/v1/posts/:id
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "postId")?;
    post_service(&state).delete(&account, &id).await?;
    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Post deleted successfully",
    ))
}

/// GET /api/v1/posts/users/:userId
pub async fn user_posts(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_id(&user_id, "userId")?;
    let posts = post_service(&state).user_posts(&account, &user_id).await?;
    Ok(ApiResponse::ok(posts, "Posts fetched successfully"))
}
