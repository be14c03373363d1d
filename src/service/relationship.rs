//! Relationship service
//!
//! Follow edges move through `pending -> accepted`, either of those can be
//! blocked by the followee, and unblocking restores the status the edge had
//! before. Every guard is evaluated by the database statement that performs
//! the transition.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::data::{
    Account, AccountPrivacy, AccountSummary, Database, EntityId, Follow, FollowEntry, FollowStats,
    FollowStatus,
};
use crate::error::AppError;
use crate::metrics::record_transition;

const RECOMMENDATION_LIMIT: usize = 10;

/// How much of an account a viewer may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    /// Private account, owner only
    OwnerOnly,
    /// Followers-only account and the viewer has no accepted edge into it
    FollowersOnly,
}

/// Apply the account privacy rule for `viewer_id` looking at `target`
pub(crate) async fn account_visibility(
    db: &Database,
    viewer_id: &str,
    target: &Account,
) -> Result<Visibility, AppError> {
    if target.id == viewer_id {
        return Ok(Visibility::Visible);
    }

    Ok(match target.privacy {
        AccountPrivacy::Public => Visibility::Visible,
        AccountPrivacy::Private => Visibility::OwnerOnly,
        AccountPrivacy::Followers => {
            if db.has_accepted_follow(viewer_id, &target.id).await? {
                Visibility::Visible
            } else {
                Visibility::FollowersOnly
            }
        }
    })
}

/// Caller's view of their outgoing edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowState {
    NotFollowing,
    Pending,
    Accepted,
}

/// Answer to a follow request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Approve,
    Reject,
}

impl RequestAction {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim() {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            _ => Err(AppError::validation("Invalid action")),
        }
    }
}

/// Relationship service
pub struct RelationshipService {
    db: Arc<Database>,
}

impl RelationshipService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn require_account(&self, account_id: &str) -> Result<Account, AppError> {
        self.db
            .get_account(account_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Start following `target_id`
    ///
    /// The edge starts pending when the target's privacy requires approval,
    /// accepted otherwise.
    pub async fn follow(&self, follower: &Account, target_id: &str) -> Result<Follow, AppError> {
        if follower.id == target_id {
            return Err(AppError::validation("You cannot follow yourself"));
        }

        let target = self.require_account(target_id).await?;
        let status = if target.privacy.requires_approval() {
            FollowStatus::Pending
        } else {
            FollowStatus::Accepted
        };

        let now = Utc::now();
        let follow = Follow {
            id: EntityId::new().0,
            follower_id: follower.id.clone(),
            followee_id: target.id.clone(),
            status,
            blocked: false,
            status_before_block: None,
            created_at: now,
            updated_at: now,
        };

        if !self.db.insert_follow_if_absent(&follow).await? {
            let existing = self
                .db
                .get_follow(&follower.id, &target.id)
                .await?
                .map(|edge| edge.status.as_str())
                .unwrap_or("unknown");
            return Err(AppError::conflict(format!(
                "You are already following this user (status: {})",
                existing
            )));
        }

        record_transition(match status {
            FollowStatus::Pending => "request",
            _ => "follow",
        });
        tracing::info!(
            follower = %follow.follower_id,
            followee = %follow.followee_id,
            status = status.as_str(),
            "Follow edge created"
        );
        Ok(follow)
    }

    /// Remove the caller's own pending or accepted edge
    pub async fn unfollow(&self, follower: &Account, target_id: &str) -> Result<(), AppError> {
        if !self.db.delete_unblocked_follow(&follower.id, target_id).await? {
            return Err(AppError::validation("You are not following this user."));
        }

        record_transition("unfollow");
        Ok(())
    }

    /// Approve or reject a pending request addressed to the caller
    pub async fn respond_to_request(
        &self,
        followee: &Account,
        follower_id: &str,
        action: RequestAction,
    ) -> Result<(), AppError> {
        let handled = match action {
            RequestAction::Approve => self
                .db
                .accept_pending_follow(follower_id, &followee.id, Utc::now())
                .await?
                .is_some(),
            RequestAction::Reject => {
                self.db
                    .delete_pending_follow(follower_id, &followee.id)
                    .await?
            }
        };

        if !handled {
            return Err(AppError::not_found("Follow request not found"));
        }

        record_transition(match action {
            RequestAction::Approve => "approve",
            RequestAction::Reject => "reject",
        });
        Ok(())
    }

    /// Block an account that follows, or asked to follow, the caller
    pub async fn block(&self, actor: &Account, user_id: &str) -> Result<Follow, AppError> {
        if actor.id == user_id {
            return Err(AppError::validation("You cannot block yourself."));
        }

        if let Some(edge) = self.db.block_follow(user_id, &actor.id, Utc::now()).await? {
            record_transition("block");
            tracing::info!(blocker = %actor.id, blocked = %user_id, "Follower blocked");
            return Ok(edge);
        }

        match self.db.get_follow(user_id, &actor.id).await? {
            Some(edge) if edge.blocked => Err(AppError::conflict("User is already blocked")),
            _ => Err(AppError::not_found("User not found in your followers")),
        }
    }

    /// Lift a block, restoring the status held before it
    pub async fn unblock(&self, actor: &Account, user_id: &str) -> Result<Follow, AppError> {
        let edge = self
            .db
            .unblock_follow(user_id, &actor.id, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("User not found in your blocked list"))?;

        record_transition("unblock");
        Ok(edge)
    }

    pub async fn check_status(
        &self,
        follower: &Account,
        target_id: &str,
    ) -> Result<FollowState, AppError> {
        self.require_account(target_id).await?;

        let state = match self.db.get_follow(&follower.id, target_id).await? {
            Some(edge) if !edge.blocked => match edge.status {
                FollowStatus::Pending => FollowState::Pending,
                FollowStatus::Accepted => FollowState::Accepted,
                FollowStatus::Blocked => FollowState::NotFollowing,
            },
            _ => FollowState::NotFollowing,
        };

        Ok(state)
    }

    pub async fn my_followers(&self, account: &Account) -> Result<Vec<FollowEntry>, AppError> {
        self.db
            .list_inbound_follows(&account.id, FollowStatus::Accepted)
            .await
    }

    pub async fn my_following(&self, account: &Account) -> Result<Vec<FollowEntry>, AppError> {
        self.db.list_outbound_follows(&account.id).await
    }

    async fn authorize_listing(
        &self,
        viewer: &Account,
        target_id: &str,
        listing: &str,
    ) -> Result<(), AppError> {
        let target = self.require_account(target_id).await?;

        match account_visibility(&self.db, &viewer.id, &target).await? {
            Visibility::Visible => Ok(()),
            Visibility::OwnerOnly => Err(AppError::forbidden(format!(
                "You do not have permission to view this user's {}.",
                listing
            ))),
            Visibility::FollowersOnly => Err(AppError::forbidden(format!(
                "Only followers can see this user's {}.",
                listing
            ))),
        }
    }

    pub async fn user_followers(
        &self,
        viewer: &Account,
        target_id: &str,
    ) -> Result<Vec<FollowEntry>, AppError> {
        self.authorize_listing(viewer, target_id, "followers").await?;
        self.db
            .list_inbound_follows(target_id, FollowStatus::Accepted)
            .await
    }

    pub async fn user_following(
        &self,
        viewer: &Account,
        target_id: &str,
    ) -> Result<Vec<FollowEntry>, AppError> {
        self.authorize_listing(viewer, target_id, "following list")
            .await?;
        self.db.list_outbound_follows(target_id).await
    }

    /// Inbound requests waiting for the caller's answer
    pub async fn pending_requests(&self, account: &Account) -> Result<Vec<FollowEntry>, AppError> {
        self.db
            .list_inbound_follows(&account.id, FollowStatus::Pending)
            .await
    }

    /// Edges the caller has blocked
    pub async fn blocked_accounts(&self, account: &Account) -> Result<Vec<FollowEntry>, AppError> {
        self.db
            .list_inbound_follows(&account.id, FollowStatus::Blocked)
            .await
    }

    pub async fn stats(&self, account_id: &str) -> Result<FollowStats, AppError> {
        self.require_account(account_id).await?;
        self.db.follow_stats(account_id).await
    }

    /// Accounts following both the caller and `other_id`
    pub async fn mutual_followers(
        &self,
        account: &Account,
        other_id: &str,
    ) -> Result<Vec<AccountSummary>, AppError> {
        if account.id == other_id {
            return Err(AppError::validation(
                "You cannot perform this action on yourself.",
            ));
        }
        self.require_account(other_id).await?;

        self.db.mutual_followers(&account.id, other_id).await
    }

    /// Friends of friends, at most ten
    pub async fn recommended(&self, account: &Account) -> Result<Vec<AccountSummary>, AppError> {
        self.db
            .followed_by_followings(&account.id, RECOMMENDATION_LIMIT)
            .await
    }
}
