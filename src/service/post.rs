//! Post service
//!
//! Owner-only mutation of posts, and reads filtered by post privacy and
//! by the owner's account visibility.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use super::relationship::{Visibility, account_visibility};
use crate::data::{Account, Database, EntityId, MediaRef, Post, PostPrivacy, normalize_tags};
use crate::error::AppError;

const SEARCH_LIMIT: usize = 50;

/// Payload for a new post
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub media: Vec<MediaRef>,
    pub privacy: PostPrivacy,
    pub tags: Vec<String>,
}

/// Partial post edit; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub media: Option<Vec<MediaRef>>,
    pub privacy: Option<PostPrivacy>,
    pub tags: Option<Vec<String>>,
}

/// Result of an update
#[derive(Debug, Clone)]
pub enum PostUpdate {
    /// The patch matched the stored post; nothing was written
    Unchanged(Post),
    Updated(Post),
}

fn metric(operation: &str) {
    crate::metrics::POSTS_TOTAL
        .with_label_values(&[operation])
        .inc();
}

/// Post service
pub struct PostService {
    db: Arc<Database>,
}

impl PostService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn require_post(&self, post_id: &str) -> Result<Post, AppError> {
        self.db
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post not found"))
    }

    async fn require_owned_post(&self, owner: &Account, post_id: &str) -> Result<Post, AppError> {
        let post = self.require_post(post_id).await?;
        if post.owner_id != owner.id {
            return Err(AppError::forbidden("You are not authorized to modify this post"));
        }
        Ok(post)
    }

    pub async fn create(&self, owner: &Account, input: NewPost) -> Result<Post, AppError> {
        let title = input.title.trim();
        let description = input.description.trim();
        if title.is_empty() || description.is_empty() {
            return Err(AppError::validation("Title and description are required"));
        }

        if self
            .db
            .has_similar_post(&owner.id, title, description, None)
            .await?
        {
            return Err(AppError::conflict(
                "Similar post already exists with same title or description",
            ));
        }

        let now = Utc::now();
        let post = Post {
            id: EntityId::new().0,
            owner_id: owner.id.clone(),
            title: title.to_string(),
            description: description.to_string(),
            media: input.media,
            privacy: input.privacy,
            tags: normalize_tags(input.tags),
            created_at: now,
            updated_at: now,
        };
        self.db.insert_post(&post).await?;

        metric("create");
        tracing::info!(post_id = %post.id, owner_id = %owner.id, "Post created");
        Ok(post)
    }

    /// Apply a patch, skipping the write when nothing differs
    pub async fn update(
        &self,
        owner: &Account,
        post_id: &str,
        patch: PostPatch,
    ) -> Result<PostUpdate, AppError> {
        let current = self.require_owned_post(owner, post_id).await?;

        let mut next = current.clone();
        if let Some(title) = patch.title {
            next.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            next.description = description.trim().to_string();
        }
        if let Some(media) = patch.media {
            next.media = media;
        }
        if let Some(privacy) = patch.privacy {
            next.privacy = privacy;
        }
        if let Some(tags) = patch.tags {
            next.tags = normalize_tags(tags);
        }

        if next == current {
            return Ok(PostUpdate::Unchanged(current));
        }

        if next.title.is_empty() || next.description.is_empty() {
            return Err(AppError::validation("Title and description are required"));
        }

        let text_changed = next.title != current.title || next.description != current.description;
        if text_changed
            && self
                .db
                .has_similar_post(&owner.id, &next.title, &next.description, Some(&current.id))
                .await?
        {
            return Err(AppError::conflict(
                "Similar post already exists with same title or description",
            ));
        }

        next.updated_at = Utc::now();
        self.db.update_post(&next).await?;

        metric("update");
        Ok(PostUpdate::Updated(next))
    }

    pub async fn delete(&self, owner: &Account, post_id: &str) -> Result<(), AppError> {
        let post = self.require_owned_post(owner, post_id).await?;
        self.db.delete_post(&post.id).await?;

        metric("delete");
        tracing::info!(post_id = %post.id, "Post deleted");
        Ok(())
    }

    /// A single post, if the viewer may see it
    pub async fn detail(&self, viewer: &Account, post_id: &str) -> Result<Post, AppError> {
        let post = self.require_post(post_id).await?;
        if post.owner_id == viewer.id {
            return Ok(post);
        }

        let denied = || AppError::forbidden("You are not allowed to view this post");
        if post.privacy == PostPrivacy::Private {
            return Err(denied());
        }

        let owner = self
            .db
            .get_account(&post.owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post not found"))?;
        if account_visibility(&self.db, &viewer.id, &owner).await? != Visibility::Visible {
            return Err(denied());
        }

        Ok(post)
    }

    /// Posts of one account, newest first
    ///
    /// Empty when the account is hidden from the viewer; private posts are
    /// shown to their owner only.
    pub async fn user_posts(&self, viewer: &Account, user_id: &str) -> Result<Vec<Post>, AppError> {
        let owner = self
            .db
            .get_account(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if account_visibility(&self.db, &viewer.id, &owner).await? != Visibility::Visible {
            return Ok(Vec::new());
        }

        self.db
            .list_posts_by_owner(&owner.id, owner.id == viewer.id)
            .await
    }

    pub async fn my_posts(&self, owner: &Account) -> Result<Vec<Post>, AppError> {
        self.db.list_posts_by_owner(&owner.id, true).await
    }

    /// Tag-prefix or title-substring search
    pub async fn search(&self, viewer: &Account, query: &str) -> Result<Vec<Post>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::validation("Search query is required"));
        }

        self.db.search_posts(query, &viewer.id, SEARCH_LIMIT).await
    }
}
