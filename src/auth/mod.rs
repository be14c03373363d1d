//! Authentication
//!
//! Handles:
//! - Password hashing
//! - Access/refresh token issuance and verification
//! - The authenticated-account extractor

mod middleware;
pub mod password;
pub mod token;

pub use middleware::CurrentUser;
pub use password::{hash_password, verify_password};
pub use token::{TokenKind, TokenPair, hash_refresh_token, issue_token_pair, verify_token};

/// Cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
/// Cookie carrying the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";
