//! Account service
//!
//! Handles registration, credentials and profile management.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::auth::{TokenKind, TokenPair, hash_refresh_token, issue_token_pair, verify_token};
use crate::config::AuthConfig;
use crate::data::{Account, AccountPrivacy, Database, EntityId};
use crate::error::AppError;

const SEARCH_LIMIT: usize = 20;

/// Registration payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_pic: String,
    pub bio: String,
    pub privacy: AccountPrivacy,
}

/// Profile edit; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile_pic: Option<String>,
    pub bio: Option<String>,
}

async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || crate::auth::hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
}

async fn verify_password_blocking(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || crate::auth::verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
}

/// Account service
pub struct AccountService {
    db: Arc<Database>,
    auth: AuthConfig,
}

impl AccountService {
    /// Create new account service
    pub fn new(db: Arc<Database>, auth: AuthConfig) -> Self {
        Self { db, auth }
    }

    /// Register a new account
    ///
    /// # Errors
    /// Validation for blank fields, Conflict if the username or email is taken
    pub async fn register(&self, input: NewAccount) -> Result<Account, AppError> {
        let username = input.username.trim();
        let email = input.email.trim();
        if username.is_empty() || email.is_empty() || input.password.trim().is_empty() {
            return Err(AppError::validation("All fields are required"));
        }

        if self
            .db
            .find_account_conflict(username, email, None)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("User already exists"));
        }

        let password_hash = hash_password_blocking(input.password).await?;
        let now = Utc::now();
        let account = Account {
            id: EntityId::new().0,
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            bio: input.bio.trim().to_string(),
            profile_pic: input.profile_pic.trim().to_string(),
            privacy: input.privacy,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        };

        // The unique indexes catch a registration racing this one
        if !self.db.insert_account(&account).await? {
            return Err(AppError::conflict("User already exists"));
        }

        crate::metrics::ACCOUNTS_REGISTERED_TOTAL.inc();
        tracing::info!(account_id = %account.id, username = %account.username, "Account registered");
        Ok(account)
    }

    /// Check credentials and issue a fresh token pair
    pub async fn login(&self, email: &str, password: &str) -> Result<(Account, TokenPair), AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::validation("Email is required"));
        }

        let account = self
            .db
            .get_account_by_email(email)
            .await?
            .ok_or_else(|| AppError::validation("User does not exist"))?;

        if !verify_password_blocking(password.to_string(), account.password_hash.clone()).await? {
            tracing::debug!(account_id = %account.id, "Rejected login with wrong password");
            return Err(AppError::unauthorized("Invalid user credentials"));
        }

        let tokens = issue_token_pair(&account.id, &self.auth)?;
        self.db
            .set_refresh_token_hash(&account.id, Some(&hash_refresh_token(&tokens.refresh_token)))
            .await?;

        tracing::info!(account_id = %account.id, "Account logged in");
        Ok((account, tokens))
    }

    /// Forget the stored refresh token
    pub async fn logout(&self, account_id: &str) -> Result<(), AppError> {
        self.db.set_refresh_token_hash(account_id, None).await
    }

    /// Exchange a refresh token for a new pair
    ///
    /// The presented token must be the one most recently issued to the
    /// account; an older token means it was replayed after rotation.
    pub async fn refresh(&self, refresh_token: &str) -> Result<(Account, TokenPair), AppError> {
        let claims = verify_token(refresh_token, TokenKind::Refresh, &self.auth.token_secret)?;

        let account = self
            .db
            .get_account(&claims.account_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

        let presented = hash_refresh_token(refresh_token);
        if account.refresh_token_hash.as_deref() != Some(presented.as_str()) {
            tracing::warn!(account_id = %account.id, "Refresh token reuse detected");
            return Err(AppError::forbidden("Refresh token reuse detected, login again"));
        }

        let tokens = issue_token_pair(&account.id, &self.auth)?;
        let rotated = self
            .db
            .rotate_refresh_token_hash(
                &account.id,
                &presented,
                &hash_refresh_token(&tokens.refresh_token),
            )
            .await?;
        if !rotated {
            return Err(AppError::forbidden("Refresh token reuse detected, login again"));
        }

        Ok((account, tokens))
    }

    /// Replace the password; existing refresh tokens stop working
    pub async fn change_password(
        &self,
        account: &Account,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if new_password.trim().is_empty() {
            return Err(AppError::validation("New password is required"));
        }

        if !verify_password_blocking(old_password.to_string(), account.password_hash.clone()).await? {
            return Err(AppError::validation("Old password did not match"));
        }

        let password_hash = hash_password_blocking(new_password.to_string()).await?;
        self.db
            .update_password_hash(&account.id, &password_hash, Utc::now())
            .await?;

        tracing::info!(account_id = %account.id, "Password changed");
        Ok(())
    }

    pub async fn update_profile(
        &self,
        account: &Account,
        update: ProfileUpdate,
    ) -> Result<Account, AppError> {
        let username = update.username.as_deref().map(str::trim);
        let email = update.email.as_deref().map(str::trim);
        if username == Some("") || email == Some("") {
            return Err(AppError::validation("Name and Email fields are mandatory"));
        }

        let mut updated = account.clone();
        if let Some(username) = username {
            updated.username = username.to_string();
        }
        if let Some(email) = email {
            updated.email = email.to_string();
        }
        if let Some(profile_pic) = update.profile_pic {
            updated.profile_pic = profile_pic.trim().to_string();
        }
        if let Some(bio) = update.bio {
            updated.bio = bio.trim().to_string();
        }

        let taken = || AppError::conflict("Username or Email is already taken. Try other");
        if self
            .db
            .find_account_conflict(&updated.username, &updated.email, Some(&account.id))
            .await?
            .is_some()
        {
            return Err(taken());
        }

        updated.updated_at = Utc::now();
        if !self.db.update_account_profile(&updated).await? {
            return Err(taken());
        }

        Ok(updated)
    }

    pub async fn update_privacy(
        &self,
        account_id: &str,
        privacy: AccountPrivacy,
    ) -> Result<Account, AppError> {
        if !self
            .db
            .update_account_privacy(account_id, privacy, Utc::now())
            .await?
        {
            return Err(AppError::not_found("User not found"));
        }

        tracing::info!(account_id, privacy = ?privacy, "Account privacy changed");
        self.get_profile(account_id).await
    }

    pub async fn get_profile(&self, account_id: &str) -> Result<Account, AppError> {
        self.db
            .get_account(account_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Prefix search over usernames and emails
    pub async fn search(&self, query: &str) -> Result<Vec<Account>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::validation("Search query is required"));
        }

        let accounts = self.db.search_accounts(query, SEARCH_LIMIT).await?;
        if accounts.is_empty() {
            return Err(AppError::not_found("No matching users found"));
        }

        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_service() -> (AccountService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("service-account.db");
        let db = Database::connect(&db_path).await.unwrap();
        let auth = AuthConfig {
            token_secret: "account-service-test-secret-32-bytes!".to_string(),
            access_token_max_age: 600,
            refresh_token_max_age: 3600,
        };
        (AccountService::new(Arc::new(db), auth), temp_dir)
    }

    fn new_account(username: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "hunter22".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn register_rejects_blank_fields() {
        let (service, _temp_dir) = create_test_service().await;

        let mut input = new_account("alice");
        input.password = "   ".to_string();
        let error = service.register(input).await.unwrap_err();
        assert!(matches!(error, AppError::Validation(msg) if msg == "All fields are required"));
    }

    #[tokio::test]
    async fn register_rejects_existing_user() {
        let (service, _temp_dir) = create_test_service().await;
        service.register(new_account("alice")).await.unwrap();

        let mut input = new_account("bob");
        input.email = "alice@example.com".to_string();
        let error = service.register(input).await.unwrap_err();
        assert!(matches!(error, AppError::Conflict(msg) if msg == "User already exists"));
    }

    #[tokio::test]
    async fn login_checks_credentials() {
        let (service, _temp_dir) = create_test_service().await;
        service.register(new_account("alice")).await.unwrap();

        let error = service
            .login("nobody@example.com", "hunter22")
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));

        let error = service
            .login("alice@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Unauthorized(_)));

        let (account, tokens) = service.login("alice@example.com", "hunter22").await.unwrap();
        assert_eq!(account.username, "alice");
        assert!(!tokens.access_token.is_empty());
    }

    #[tokio::test]
    async fn refresh_rotates_and_rejects_reuse() {
        let (service, _temp_dir) = create_test_service().await;
        service.register(new_account("alice")).await.unwrap();
        let (_, first) = service.login("alice@example.com", "hunter22").await.unwrap();

        let (_, second) = service.refresh(&first.refresh_token).await.unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);

        let error = service.refresh(&first.refresh_token).await.unwrap_err();
        assert!(matches!(error, AppError::Forbidden(_)));

        // An access token is not accepted as a refresh token
        let error = service.refresh(&second.access_token).await.unwrap_err();
        assert!(matches!(error, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn logout_invalidates_refresh_token() {
        let (service, _temp_dir) = create_test_service().await;
        let account = service.register(new_account("alice")).await.unwrap();
        let (_, tokens) = service.login("alice@example.com", "hunter22").await.unwrap();

        service.logout(&account.id).await.unwrap();
        assert!(service.refresh(&tokens.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn change_password_requires_old_password() {
        let (service, _temp_dir) = create_test_service().await;
        let account = service.register(new_account("alice")).await.unwrap();

        let error = service
            .change_password(&account, "wrong", "new-secret")
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));

        service
            .change_password(&account, "hunter22", "new-secret")
            .await
            .unwrap();
        assert!(service.login("alice@example.com", "new-secret").await.is_ok());
    }

    #[tokio::test]
    async fn update_profile_detects_collisions() {
        let (service, _temp_dir) = create_test_service().await;
        let alice = service.register(new_account("alice")).await.unwrap();
        service.register(new_account("bob")).await.unwrap();

        let error = service
            .update_profile(
                &alice,
                ProfileUpdate {
                    username: Some("bob".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Conflict(_)));

        let error = service
            .update_profile(
                &alice,
                ProfileUpdate {
                    email: Some(" ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));

        let updated = service
            .update_profile(
                &alice,
                ProfileUpdate {
                    bio: Some("hello".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.bio, "hello");
        assert_eq!(updated.username, "alice");
    }

    #[tokio::test]
    async fn search_requires_query_and_results() {
        let (service, _temp_dir) = create_test_service().await;
        service.register(new_account("alice")).await.unwrap();

        assert!(matches!(
            service.search("  ").await.unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(matches!(
            service.search("zed").await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert_eq!(service.search("AL").await.unwrap().len(), 1);
    }
}
