//! Authentication extractor
//!
//! Protected handlers take a [`CurrentUser`] argument; requests without a
//! valid access token are rejected before the handler runs.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use axum_extra::extract::CookieJar;

use super::ACCESS_TOKEN_COOKIE;
use super::token::{TokenKind, verify_token};
use crate::AppState;
use crate::data::Account;
use crate::error::AppError;

/// Bearer header first, then the `accessToken` cookie
pub(crate) fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_owned())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            let jar = CookieJar::from_headers(headers);
            jar.get(ACCESS_TOKEN_COOKIE)
                .map(|cookie| cookie.value().to_owned())
        })
}

async fn authenticate(token: &str, state: &AppState) -> Result<Account, AppError> {
    let claims = verify_token(token, TokenKind::Access, &state.config.auth.token_secret)?;

    state
        .db
        .get_account(&claims.account_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid access token"))
}

/// Extractor for the authenticated account
///
/// The account is re-read from the database on every request, so profile
/// and privacy changes are visible immediately.
///
/// # Usage
/// ```ignore
/// async fn handler(CurrentUser(account): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}", account.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Account);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(account) = parts.extensions.get::<Account>().cloned() {
            return Ok(CurrentUser(account));
        }

        let state = AppState::from_ref(state);
        let token = extract_access_token(&parts.headers)
            .ok_or_else(|| AppError::unauthorized("Unauthorized request"))?;
        let account = authenticate(&token, &state).await?;
        parts.extensions.insert(account.clone());

        Ok(CurrentUser(account))
    }
}
