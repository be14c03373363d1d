//! Account endpoints

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

use super::envelope::ApiResponse;
use super::extract::{ValidJson, parse_id};
use crate::AppState;
use crate::auth::{ACCESS_TOKEN_COOKIE, CurrentUser, REFRESH_TOKEN_COOKIE, TokenPair};
use crate::data::{AccountPrivacy, AccountView};
use crate::error::AppError;
use crate::service::{AccountService, NewAccount, ProfileUpdate};

fn account_service(state: &AppState) -> AccountService {
    AccountService::new(state.db.clone(), state.config.auth.clone())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct PrivacyRequest {
    pub privacy: AccountPrivacy,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// Login and refresh payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub account: AccountView,
    pub access_token: String,
    pub refresh_token: String,
}

fn token_cookie(name: &'static str, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

fn with_token_cookies(jar: CookieJar, state: &AppState, tokens: &TokenPair) -> CookieJar {
    let secure = state.config.should_use_secure_cookies();
    let auth = &state.config.auth;

    jar.add(token_cookie(
        ACCESS_TOKEN_COOKIE,
        tokens.access_token.clone(),
        auth.access_token_max_age,
        secure,
    ))
    .add(token_cookie(
        REFRESH_TOKEN_COOKIE,
        tokens.refresh_token.clone(),
        auth.refresh_token_max_age,
        secure,
    ))
}

/// POST /api/v1/users/register
pub async fn register(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<NewAccount>,
) -> Result<impl IntoResponse, AppError> {
    let account = account_service(&state).register(input).await?;
    Ok(ApiResponse::created(
        AccountView::from(&account),
        "User registered successfully",
    ))
}

/// POST /api/v1/users/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (account, tokens) = account_service(&state)
        .login(&req.email, &req.password)
        .await?;

    let jar = with_token_cookies(jar, &state, &tokens);
    let body = SessionResponse {
        account: AccountView::from(&account),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    };

    Ok((jar, ApiResponse::ok(body, "User logged in successfully")))
}

/// POST /api/v1/users/logout
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    account_service(&state).logout(&account.id).await?;

    let jar = jar
        .remove(removal_cookie(ACCESS_TOKEN_COOKIE))
        .remove(removal_cookie(REFRESH_TOKEN_COOKIE));

    Ok((
        jar,
        ApiResponse::ok(serde_json::json!({}), "User logged out successfully"),
    ))
}

/// POST /api/v1/users/refresh-token
///
/// The refresh token comes from the cookie, or from the body when the
/// client does not keep cookies.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<ValidJson<RefreshRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let presented = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| body.and_then(|ValidJson(req)| req.refresh_token))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("Unauthorized request"))?;

    let (account, tokens) = account_service(&state).refresh(&presented).await?;

    let jar = with_token_cookies(jar, &state, &tokens);
    let body = SessionResponse {
        account: AccountView::from(&account),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    };

    Ok((jar, ApiResponse::ok(body, "Access token refreshed successfully")))
}

/// POST /api/v1/users/change-password
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    account_service(&state)
        .change_password(&account, &req.old_password, &req.new_password)
        .await?;

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Password changed successfully",
    ))
}

/// POST /api/v1/users/update-profile
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ValidJson(update): ValidJson<ProfileUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let updated = account_service(&state)
        .update_profile(&account, update)
        .await?;

    Ok(ApiResponse::ok(
        AccountView::from(&updated),
        "User updated successfully",
    ))
}

/// POST /api/v1/users/update-privacy
pub async fn update_privacy(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    ValidJson(req): ValidJson<PrivacyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = account_service(&state)
        .update_privacy(&account.id, req.privacy)
        .await?;

    Ok(ApiResponse::ok(
        AccountView::from(&updated),
        "Privacy updated successfully",
    ))
}

/// GET /api/v1/users/profile
pub async fn my_profile(CurrentUser(account): CurrentUser) -> impl IntoResponse {
    ApiResponse::ok(
        AccountView::from(&account),
        "User profile fetched successfully",
    )
}

/// GET /api/v1/users/profile/:id
pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(_viewer): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "id")?;
    let account = account_service(&state).get_profile(&id).await?;

    Ok(ApiResponse::ok(
        AccountView::from(&account),
        "User profile fetched successfully",
    ))
}

/// GET /api/v1/users/search?query=
pub async fn search(
    State(state): State<AppState>,
    CurrentUser(_viewer): CurrentUser,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let accounts = account_service(&state)
        .search(params.query.as_deref().unwrap_or(""))
        .await?;

    let views: Vec<AccountView> = accounts.iter().map(AccountView::from).collect();
    Ok(ApiResponse::ok(views, "Users fetched successfully"))
}
