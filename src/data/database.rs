//! SQLite database operations
//!
//! All database access goes through this module.
//! Relationship transitions are single conditional statements so that the
//! guard and the write cannot be separated by a concurrent request.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::Duration;

use super::models::*;
use crate::error::AppError;

const POST_COLUMNS: &str =
    "p.id, p.owner_id, p.title, p.description, p.media, p.privacy, p.tags, p.created_at, p.updated_at";

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db_error| db_error.is_unique_violation())
        .unwrap_or(false)
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|e| AppError::Internal(e.into()))
}

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to the SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Insert a new account
    ///
    /// # Returns
    /// `false` when the username or email is already taken.
    pub async fn insert_account(&self, account: &Account) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (
                id, username, email, password_hash, bio, profile_pic, privacy,
                refresh_token_hash, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.bio)
        .bind(&account.profile_pic)
        .bind(account.privacy)
        .bind(&account.refresh_token_hash)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_account(&self, id: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    pub async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE email = ? COLLATE NOCASE",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Find another account already using `username` or `email`
    pub async fn find_account_conflict(
        &self,
        username: &str,
        email: &str,
        exclude_id: Option<&str>,
    ) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT * FROM accounts
            WHERE (username = ? COLLATE NOCASE OR email = ? COLLATE NOCASE)
              AND id <> ?
            LIMIT 1
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(exclude_id.unwrap_or(""))
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    pub async fn account_exists(&self, id: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Persist the profile fields of an account
    ///
    /// # Returns
    /// `false` when the new username or email collides with another account.
    pub async fn update_account_profile(&self, account: &Account) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET username = ?, email = ?, bio = ?, profile_pic = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.bio)
        .bind(&account.profile_pic)
        .bind(account.updated_at)
        .bind(&account.id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(error) if is_unique_violation(&error) => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    pub async fn update_account_privacy(
        &self,
        id: &str,
        privacy: AccountPrivacy,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE accounts SET privacy = ?, updated_at = ? WHERE id = ?")
            .bind(privacy)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_password_hash(
        &self,
        id: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE accounts SET password_hash = ?, refresh_token_hash = NULL, updated_at = ? WHERE id = ?",
        )
        .bind(password_hash)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn set_refresh_token_hash(
        &self,
        id: &str,
        refresh_token_hash: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE accounts SET refresh_token_hash = ? WHERE id = ?")
            .bind(refresh_token_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Replace the stored refresh token hash only if it still equals `expected`
    ///
    /// # Returns
    /// `false` when another request rotated the token first.
    pub async fn rotate_refresh_token_hash(
        &self,
        id: &str,
        expected: &str,
        replacement: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE accounts SET refresh_token_hash = ? WHERE id = ? AND refresh_token_hash = ?",
        )
        .bind(replacement)
        .bind(id)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Prefix search over username and email
    ///
    /// SQLite's LIKE folds case for ASCII letters only, so "ALI" finds
    /// "alice" while non-ASCII letters must match exactly.
    pub async fn search_accounts(&self, prefix: &str, limit: usize) -> Result<Vec<Account>, AppError> {
        let pattern = format!("{}%", escape_like(prefix));
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT * FROM accounts
            WHERE username LIKE ? ESCAPE '\' OR email LIKE ? ESCAPE '\'
            ORDER BY username
            LIMIT ?
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    // =========================================================================
    // Follow edges
    // =========================================================================

    /// Insert a follow edge unless one already exists for the pair
    ///
    /// Relies on the unique `(follower_id, followee_id)` index, so two
    /// concurrent requests for the same pair cannot both insert.
    pub async fn insert_follow_if_absent(&self, follow: &Follow) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO follows (
                id, follower_id, followee_id, status, blocked, status_before_block,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            "#,
        )
        .bind(&follow.id)
        .bind(&follow.follower_id)
        .bind(&follow.followee_id)
        .bind(follow.status)
        .bind(follow.blocked)
        .bind(follow.status_before_block)
        .bind(follow.created_at)
        .bind(follow.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_follow(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<Option<Follow>, AppError> {
        let follow = sqlx::query_as::<_, Follow>(
            "SELECT * FROM follows WHERE follower_id = ? AND followee_id = ?",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(follow)
    }

    /// pending -> accepted
    pub async fn accept_pending_follow(
        &self,
        follower_id: &str,
        followee_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Follow>, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE follows SET status = 'accepted', updated_at = ?
            WHERE follower_id = ? AND followee_id = ? AND status = 'pending' AND blocked = 0
            "#,
        )
        .bind(now)
        .bind(follower_id)
        .bind(followee_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_follow(follower_id, followee_id).await
    }

    /// pending -> none
    pub async fn delete_pending_follow(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM follows
            WHERE follower_id = ? AND followee_id = ? AND status = 'pending' AND blocked = 0
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// pending | accepted -> none
    pub async fn delete_unblocked_follow(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM follows WHERE follower_id = ? AND followee_id = ? AND blocked = 0",
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// pending | accepted -> blocked, remembering the previous status
    pub async fn block_follow(
        &self,
        follower_id: &str,
        followee_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Follow>, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE follows
            SET status_before_block = status, status = 'blocked', blocked = 1, updated_at = ?
            WHERE follower_id = ? AND followee_id = ?
              AND blocked = 0 AND status IN ('pending', 'accepted')
            "#,
        )
        .bind(now)
        .bind(follower_id)
        .bind(followee_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_follow(follower_id, followee_id).await
    }

    /// blocked -> previous status
    pub async fn unblock_follow(
        &self,
        follower_id: &str,
        followee_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Follow>, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE follows
            SET status = COALESCE(status_before_block, 'pending'),
                blocked = 0,
                status_before_block = NULL,
                updated_at = ?
            WHERE follower_id = ? AND followee_id = ? AND blocked = 1
            "#,
        )
        .bind(now)
        .bind(follower_id)
        .bind(followee_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_follow(follower_id, followee_id).await
    }

    /// Whether `follower_id` has an accepted, unblocked edge into `followee_id`
    pub async fn has_accepted_follow(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM follows
                WHERE follower_id = ? AND followee_id = ? AND status = 'accepted' AND blocked = 0
            )
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Edges pointing at `account_id` in `status`, joined with the follower
    ///
    /// Blocked edges are only returned when asking for [`FollowStatus::Blocked`].
    pub async fn list_inbound_follows(
        &self,
        account_id: &str,
        status: FollowStatus,
    ) -> Result<Vec<FollowEntry>, AppError> {
        let rows = sqlx::query_as::<_, FollowEntryRow>(
            r#"
            SELECT f.id, f.status, a.id AS account_id, a.username, a.profile_pic, f.created_at
            FROM follows f
            JOIN accounts a ON a.id = f.follower_id
            WHERE f.followee_id = ? AND f.status = ? AND f.blocked = ?
            ORDER BY f.created_at DESC, f.id DESC
            "#,
        )
        .bind(account_id)
        .bind(status)
        .bind(status == FollowStatus::Blocked)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FollowEntry::from).collect())
    }

    /// Accepted, unblocked edges leaving `account_id`, joined with the followee
    pub async fn list_outbound_follows(
        &self,
        account_id: &str,
    ) -> Result<Vec<FollowEntry>, AppError> {
        let rows = sqlx::query_as::<_, FollowEntryRow>(
            r#"
            SELECT f.id, f.status, a.id AS account_id, a.username, a.profile_pic, f.created_at
            FROM follows f
            JOIN accounts a ON a.id = f.followee_id
            WHERE f.follower_id = ? AND f.status = 'accepted' AND f.blocked = 0
            ORDER BY f.created_at DESC, f.id DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FollowEntry::from).collect())
    }

    /// All relationship counts of an account in one pass over its edges
    pub async fn follow_stats(&self, account_id: &str) -> Result<FollowStats, AppError> {
        let (followers, following, pending_followers, pending_following, blocked) =
            sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
                r#"
                SELECT
                    COALESCE(SUM(CASE WHEN followee_id = ? AND status = 'accepted' AND blocked = 0 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN follower_id = ? AND status = 'accepted' AND blocked = 0 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN followee_id = ? AND status = 'pending' AND blocked = 0 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN follower_id = ? AND status = 'pending' AND blocked = 0 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN followee_id = ? AND blocked = 1 THEN 1 ELSE 0 END), 0)
                FROM follows
                WHERE followee_id = ? OR follower_id = ?
                "#,
            )
            .bind(account_id)
            .bind(account_id)
            .bind(account_id)
            .bind(account_id)
            .bind(account_id)
            .bind(account_id)
            .bind(account_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(FollowStats {
            followers,
            following,
            pending_followers,
            pending_following,
            blocked,
        })
    }

    /// Accounts with accepted, unblocked edges into both `first` and `second`
    pub async fn mutual_followers(
        &self,
        first: &str,
        second: &str,
    ) -> Result<Vec<AccountSummary>, AppError> {
        let accounts = sqlx::query_as::<_, AccountSummary>(
            r#"
            SELECT a.id, a.username, a.profile_pic
            FROM follows f1
            JOIN follows f2 ON f2.follower_id = f1.follower_id
            JOIN accounts a ON a.id = f1.follower_id
            WHERE f1.followee_id = ? AND f1.status = 'accepted' AND f1.blocked = 0
              AND f2.followee_id = ? AND f2.status = 'accepted' AND f2.blocked = 0
            ORDER BY f1.created_at, a.id
            "#,
        )
        .bind(first)
        .bind(second)
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    /// Accounts followed by the accounts `account_id` follows (two hops)
    pub async fn followed_by_followings(
        &self,
        account_id: &str,
        limit: usize,
    ) -> Result<Vec<AccountSummary>, AppError> {
        let accounts = sqlx::query_as::<_, AccountSummary>(
            r#"
            SELECT DISTINCT a.id, a.username, a.profile_pic
            FROM follows f1
            JOIN follows f2 ON f2.follower_id = f1.followee_id
            JOIN accounts a ON a.id = f2.followee_id
            WHERE f1.follower_id = ? AND f1.status = 'accepted' AND f1.blocked = 0
              AND f2.status = 'accepted' AND f2.blocked = 0
              AND f2.followee_id <> ?
            LIMIT ?
            "#,
        )
        .bind(account_id)
        .bind(account_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    // =========================================================================
    // Posts
    // =========================================================================

    pub async fn insert_post(&self, post: &Post) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO posts (
                id, owner_id, title, description, media, privacy, tags, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.owner_id)
        .bind(&post.title)
        .bind(&post.description)
        .bind(encode_json(&post.media)?)
        .bind(post.privacy)
        .bind(encode_json(&post.tags)?)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, AppError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Post::try_from).transpose()
    }

    /// Whether the owner already has another post with this title or description
    pub async fn has_similar_post(
        &self,
        owner_id: &str,
        title: &str,
        description: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM posts
                WHERE owner_id = ? AND (title = ? OR description = ?) AND id <> ?
            )
            "#,
        )
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .bind(exclude_id.unwrap_or(""))
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn update_post(&self, post: &Post) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, description = ?, media = ?, privacy = ?, tags = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.description)
        .bind(encode_json(&post.media)?)
        .bind(post.privacy)
        .bind(encode_json(&post.tags)?)
        .bind(post.updated_at)
        .bind(&post.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_post(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Posts of one owner, newest first
    pub async fn list_posts_by_owner(
        &self,
        owner_id: &str,
        include_private: bool,
    ) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts p
            WHERE p.owner_id = ? AND (? OR p.privacy = 'public')
            ORDER BY p.created_at DESC, p.id DESC
            "#
        ))
        .bind(owner_id)
        .bind(include_private)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Post::try_from).collect()
    }

    /// Tag-prefix or title-substring search over posts visible to `viewer_id`
    ///
    /// A post is searchable when the viewer owns it, or when it is public
    /// and its owner's account is public or followers-only with an accepted,
    /// unblocked edge from the viewer. Matching folds ASCII case only.
    pub async fn search_posts(
        &self,
        query: &str,
        viewer_id: &str,
        limit: usize,
    ) -> Result<Vec<Post>, AppError> {
        let escaped = escape_like(query);
        let title_pattern = format!("%{}%", escaped);
        let tag_pattern = format!("{}%", escaped);

        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts p
            JOIN accounts a ON a.id = p.owner_id
            WHERE (
                p.owner_id = ?
                OR (
                  p.privacy = 'public'
                  AND (
                    a.privacy = 'public'
                    OR (
                      a.privacy = 'followers'
                      AND EXISTS (
                        SELECT 1 FROM follows f
                        WHERE f.follower_id = ? AND f.followee_id = p.owner_id
                          AND f.status = 'accepted' AND f.blocked = 0
                      )
                    )
                  )
                )
              )
              AND (
                p.title LIKE ? ESCAPE '\'
                OR EXISTS (SELECT 1 FROM json_each(p.tags) t WHERE t.value LIKE ? ESCAPE '\')
              )
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ?
            "#
        ))
        .bind(viewer_id)
        .bind(viewer_id)
        .bind(&title_pattern)
        .bind(&tag_pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Post::try_from).collect()
    }

    // =========================================================================
    // Media objects
    // =========================================================================

    pub async fn insert_media(&self, media: &MediaObject) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO media (
                id, owner_id, storage_key, url, kind, content_type, file_size, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&media.id)
        .bind(&media.owner_id)
        .bind(&media.storage_key)
        .bind(&media.url)
        .bind(media.kind)
        .bind(&media.content_type)
        .bind(media.file_size)
        .bind(media.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_media_by_key(&self, storage_key: &str) -> Result<Option<MediaObject>, AppError> {
        let media = sqlx::query_as::<_, MediaObject>("SELECT * FROM media WHERE storage_key = ?")
            .bind(storage_key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(media)
    }

    pub async fn delete_media(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM media WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
