//! Access and refresh tokens
//!
//! Uses HMAC-signed tokens. Access tokens are stateless; the hash of the
//! current refresh token is kept on the account so a rotated token cannot
//! be replayed.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::AuthConfig;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const REFRESH_TOKEN_HASH_PREFIX: &str = "sha256:";

/// Which cookie/slot a token is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Signed token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub account_id: String,
    pub kind: TokenKind,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Makes two tokens issued in the same instant distinct
    pub nonce: String,
}

impl TokenClaims {
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Freshly issued access/refresh pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn mac_for(secret: &str) -> Result<HmacSha256, AppError> {
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| AppError::Encryption(e.to_string()))
}

/// Create a signed token
///
/// Token format: base64url(payload).base64url(hmac_sha256(payload))
pub fn create_token(
    account_id: &str,
    kind: TokenKind,
    max_age_secs: i64,
    secret: &str,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = TokenClaims {
        account_id: account_id.to_string(),
        kind,
        issued_at: now,
        expires_at: now + Duration::seconds(max_age_secs),
        nonce: ulid::Ulid::new().to_string(),
    };

    let payload = serde_json::to_string(&claims).map_err(|e| AppError::Internal(e.into()))?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload.as_bytes());

    let mut mac = mac_for(secret)?;
    mac.update(payload_b64.as_bytes());
    let signature_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", payload_b64, signature_b64))
}

/// Verify a token's signature, kind and expiry
///
/// # Errors
/// `Unauthorized` for every kind of failure; the caller never learns which
/// check rejected the token.
pub fn verify_token(token: &str, expected: TokenKind, secret: &str) -> Result<TokenClaims, AppError> {
    let unauthorized = || AppError::unauthorized("Invalid or expired token");

    let (payload_b64, signature_b64) = token.split_once('.').ok_or_else(unauthorized)?;

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| unauthorized())?;
    let mut mac = mac_for(secret)?;
    mac.update(payload_b64.as_bytes());
    mac.verify_slice(&signature).map_err(|_| unauthorized())?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| unauthorized())?;
    let claims: TokenClaims = serde_json::from_slice(&payload).map_err(|_| unauthorized())?;

    if claims.kind != expected || claims.is_expired() {
        return Err(unauthorized());
    }

    Ok(claims)
}

/// Issue both tokens for an account using the configured lifetimes
pub fn issue_token_pair(account_id: &str, auth: &AuthConfig) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access_token: create_token(
            account_id,
            TokenKind::Access,
            auth.access_token_max_age,
            &auth.token_secret,
        )?,
        refresh_token: create_token(
            account_id,
            TokenKind::Refresh,
            auth.refresh_token_max_age,
            &auth.token_secret,
        )?,
    })
}

/// Digest stored in place of the refresh token itself
pub fn hash_refresh_token(refresh_token: &str) -> String {
    let digest = Sha256::digest(refresh_token.as_bytes());
    format!("{}{}", REFRESH_TOKEN_HASH_PREFIX, URL_SAFE_NO_PAD.encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-bytes!";

    #[test]
    fn roundtrip_access_token() {
        let token = create_token("01ARZ3NDEKTSV4RRFFQ69G5FAV", TokenKind::Access, 60, SECRET).unwrap();
        let claims = verify_token(&token, TokenKind::Access, SECRET).unwrap();
        assert_eq!(claims.account_id, "01ARZ3NDEKTSV4RRFFQ69G5FAV");
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let token = create_token("acct", TokenKind::Refresh, 60, SECRET).unwrap();
        assert!(matches!(
            verify_token(&token, TokenKind::Access, SECRET),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = create_token("acct", TokenKind::Access, 60, SECRET).unwrap();
        let other = create_token("other", TokenKind::Access, 60, SECRET).unwrap();
        let (payload, _) = other.split_once('.').unwrap();
        let (_, signature) = token.split_once('.').unwrap();
        let forged = format!("{payload}.{signature}");
        assert!(verify_token(&forged, TokenKind::Access, SECRET).is_err());
        assert!(verify_token(&token, TokenKind::Access, "another-secret-of-32-bytes-length!").is_err());
        assert!(verify_token("garbage", TokenKind::Access, SECRET).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = create_token("acct", TokenKind::Access, -1, SECRET).unwrap();
        assert!(verify_token(&token, TokenKind::Access, SECRET).is_err());
    }

    #[test]
    fn tokens_issued_together_differ() {
        let first = create_token("acct", TokenKind::Refresh, 60, SECRET).unwrap();
        let second = create_token("acct", TokenKind::Refresh, 60, SECRET).unwrap();
        assert_ne!(first, second);
        assert_ne!(hash_refresh_token(&first), hash_refresh_token(&second));
        assert!(hash_refresh_token(&first).starts_with("sha256:"));
    }
}
