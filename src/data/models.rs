//! Data models
//!
//! Rust structs representing database entities and their API projections.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Parse a client-supplied id, naming the offending field on failure
    pub fn parse(raw: &str, field: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        ulid::Ulid::from_string(trimmed)
            .map(|id| Self(id.to_string()))
            .map_err(|_| AppError::Validation(format!("Invalid {} provided.", field)))
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Account
// =============================================================================

/// Who may see an account's relationships and content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AccountPrivacy {
    #[default]
    Public,
    /// Only accounts with an accepted follow edge
    Followers,
    /// Only the owner
    Private,
}

impl AccountPrivacy {
    /// Whether a follow request to this account starts out pending
    pub fn requires_approval(self) -> bool {
        matches!(self, Self::Followers | Self::Private)
    }
}

/// A registered user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub bio: String,
    pub profile_pic: String,
    pub privacy: AccountPrivacy,
    /// `sha256:` digest of the current refresh token
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account as returned to clients (no credential fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub profile_pic: String,
    pub privacy: AccountPrivacy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            username: account.username.clone(),
            email: account.email.clone(),
            bio: account.bio.clone(),
            profile_pic: account.profile_pic.clone(),
            privacy: account.privacy,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Minimal account projection used inside relationship listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: String,
    pub username: String,
    pub profile_pic: String,
}

// =============================================================================
// Follow edges
// =============================================================================

/// State of a directed follow edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum FollowStatus {
    Pending,
    Accepted,
    Blocked,
}

impl FollowStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Blocked => "blocked",
        }
    }
}

/// A directed edge `follower -> followee`
///
/// At most one edge exists per ordered pair (unique index).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub id: String,
    pub follower_id: String,
    pub followee_id: String,
    pub status: FollowStatus,
    pub blocked: bool,
    /// Status the edge held when it was blocked; restored on unblock
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_before_block: Option<FollowStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An edge joined with the account on the other end
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEntry {
    pub id: String,
    pub status: FollowStatus,
    pub account: AccountSummary,
    pub created_at: DateTime<Utc>,
}

/// Row shape for [`FollowEntry`] queries
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct FollowEntryRow {
    pub id: String,
    pub status: FollowStatus,
    pub account_id: String,
    pub username: String,
    pub profile_pic: String,
    pub created_at: DateTime<Utc>,
}

impl From<FollowEntryRow> for FollowEntry {
    fn from(row: FollowEntryRow) -> Self {
        Self {
            id: row.id,
            status: row.status,
            account: AccountSummary {
                id: row.account_id,
                username: row.username,
                profile_pic: row.profile_pic,
            },
            created_at: row.created_at,
        }
    }
}

/// Relationship counts for one account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStats {
    pub followers: i64,
    pub following: i64,
    pub pending_followers: i64,
    pub pending_following: i64,
    /// Edges this account has blocked
    pub blocked: i64,
}

// =============================================================================
// Posts
// =============================================================================

/// Kind of an uploaded media object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            _ => Err(AppError::Validation(
                "Invalid file type. Use 'image' or 'video'".to_string(),
            )),
        }
    }
}

/// Media reference embedded in a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    pub url: String,
    pub public_id: String,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PostPrivacy {
    #[default]
    Public,
    Private,
}

/// A post owned by one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub media: Vec<MediaRef>,
    pub privacy: PostPrivacy,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of the `posts` table; list columns are JSON text
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct PostRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub media: String,
    pub privacy: PostPrivacy,
    pub tags: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = AppError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let media = serde_json::from_str(&row.media)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt media column: {e}")))?;
        let tags = serde_json::from_str(&row.tags)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt tags column: {e}")))?;

        Ok(Self {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            media,
            privacy: row.privacy,
            tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Trim tags and drop the blank ones
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

// =============================================================================
// Media objects
// =============================================================================

/// Uploaded file record
///
/// Bytes live in the media backend; this row remembers who uploaded them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MediaObject {
    pub id: String,
    pub owner_id: String,
    pub storage_key: String,
    pub url: String,
    pub kind: MediaKind,
    pub content_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

impl MediaObject {
    pub fn to_media_ref(&self) -> MediaRef {
        MediaRef {
            url: self.url.clone(),
            public_id: self.storage_key.clone(),
            kind: self.kind,
        }
    }
}
