//! Relationship endpoints

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;

use super::envelope::ApiResponse;
use super::extract::{ValidJson, parse_id};
use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::FollowStatus;
use crate::error::AppError;
use crate::service::{RelationshipService, RequestAction};

fn relationship_service(state: &AppState) -> RelationshipService {
    RelationshipService::new(state.db.clone())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FollowingTarget {
    pub following_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserTarget {
    pub user_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RespondRequest {
    pub follower_id: String,
    pub action: String,
}

/// POST /api/v1/follows/follow
pub async fn follow(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ValidJson(req): ValidJson<FollowingTarget>,
) -> Result<impl IntoResponse, AppError> {
    let target_id = parse_id(&req.following_id, "followingId")?;
    let edge = relationship_service(&state)
        .follow(&account, &target_id)
        .await?;

    let message = match edge.status {
        FollowStatus::Pending => "Follow request sent.",
        _ => "You are now following this user.",
    };
    Ok(ApiResponse::created(edge, message))
}

/// POST /api/v1/follows/unfollow
pub async fn unfollow(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ValidJson(req): ValidJson<FollowingTarget>,
) -> Result<impl IntoResponse, AppError> {
    let target_id = parse_id(&req.following_id, "followingId")?;
    relationship_service(&state)
        .unfollow(&account, &target_id)
        .await?;

    Ok(ApiResponse::ok(
        serde_json::Value::Null,
        "Unfollowed successfully.",
    ))
}

/// POST /api/v1/follows/requests/respond
pub async fn respond_to_request(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ValidJson(req): ValidJson<RespondRequest>,
) -> Result<impl IntoResponse, AppError> {
    let follower_id = parse_id(&req.follower_id, "followerId")?;
    let action = RequestAction::parse(&req.action)?;

    relationship_service(&state)
        .respond_to_request(&account, &follower_id, action)
        .await?;

    let message = match action {
        RequestAction::Approve => "Follow request approved!",
        RequestAction::Reject => "Follow request rejected!",
    };
    Ok(ApiResponse::ok(serde_json::json!({}), message))
}

/// POST /api/v1/follows/check
pub async fn check_status(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ValidJson(req): ValidJson<FollowingTarget>,
) -> Result<impl IntoResponse, AppError> {
    let target_id = parse_id(&req.following_id, "followingId")?;
    let follow_status = relationship_service(&state)
        .check_status(&account, &target_id)
        .await?;

    Ok(ApiResponse::ok(
        serde_json::json!({ "followStatus": follow_status }),
        "Follow status checked successfully.",
    ))
}

/// POST /api/v1/follows/block
pub async fn block(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ValidJson(req): ValidJson<UserTarget>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_id(&req.user_id, "userId")?;
    relationship_service(&state).block(&account, &user_id).await?;

    Ok(ApiResponse::ok(
        serde_json::json!({ "blocked": true }),
        "User blocked successfully.",
    ))
}

/// POST /api/v1/follows/unblock
pub async fn unblock(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ValidJson(req): ValidJson<UserTarget>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_id(&req.user_id, "userId")?;
    let edge = relationship_service(&state)
        .unblock(&account, &user_id)
        .await?;

    Ok(ApiResponse::ok(
        serde_json::json!({ "blocked": false, "status": edge.status }),
        "User unblocked successfully.",
    ))
}

/// GET /api/v1/follows/me/followers
pub async fn my_followers(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let followers = relationship_service(&state).my_followers(&account).await?;
    Ok(ApiResponse::ok(
        serde_json::json!({ "followers": followers }),
        "Your followers list.",
    ))
}

/// GET /api/v1/follows/me/following
pub async fn my_following(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let following = relationship_service(&state).my_following(&account).await?;
    Ok(ApiResponse::ok(
        serde_json::json!({ "following": following }),
        "Your following list.",
    ))
}

/// GET /api/v1/follows/me/stats
pub async fn my_stats(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let stats = relationship_service(&state).stats(&account.id).await?;
    Ok(ApiResponse::ok(stats, "Fetched successfully"))
}

/// GET /api/v1/follows/requests
pub async fn pending_requests(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let requests = relationship_service(&state)
        .pending_requests(&account)
        .await?;
    Ok(ApiResponse::ok(
        serde_json::json!({ "pendingRequests": requests }),
        "Pending follow requests fetched.",
    ))
}

/// GET /api/v1/follows/blocked
pub async fn blocked_accounts(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let blocked = relationship_service(&state)
        .blocked_accounts(&account)
        .await?;
    Ok(ApiResponse::ok(
        serde_json::json!({ "blockedRequests": blocked }),
        "Blocked follow requests fetched.",
    ))
}

/// GET /api/v1/follows/recommended
pub async fn recommended(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let users = relationship_service(&state).recommended(&account).await?;
    Ok(ApiResponse::ok(
        serde_json::json!({ "recommendedUsers": users }),
        "Recommended users list.",
    ))
}

/// GET /api/v1/follows/users/:userId/followers
pub async fn user_followers(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_id(&user_id, "userId")?;
    let followers = relationship_service(&state)
        .user_followers(&account, &user_id)
        .await?;
    Ok(ApiResponse::ok(
        serde_json::json!({ "followers": followers }),
        "Followers fetched successfully.",
    ))
}

/// GET /api/v1/follows/users/:userId/following
pub async fn user_following(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_id(&user_id, "userId")?;
    let following = relationship_service(&state)
        .user_following(&account, &user_id)
        .await?;
    Ok(ApiResponse::ok(
        serde_json::json!({ "following": following }),
        "Following list fetched successfully.",
    ))
}

/// GET /api/v1/follows/users/:userId/stats
pub async fn user_stats(
    State(state): State<AppState>,
    CurrentUser(_account): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_id(&user_id, "userId")?;
    let stats = relationship_service(&state).stats(&user_id).await?;
    Ok(ApiResponse::ok(stats, "Fetched successfully"))
}

/// GET /api/v1/follows/users/:userId/mutual
pub async fn mutual_followers(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_id(&user_id, "userId")?;
    let mutual = relationship_service(&state)
        .mutual_followers(&account, &user_id)
        .await?;
    Ok(ApiResponse::ok(
        serde_json::json!({ "mutualFollowers": mutual }),
        "Mutual followers list.",
    ))
}
