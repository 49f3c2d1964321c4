use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::BackendError;
use crate::identity::password::{
    hash_password_blocking, validate_email, validate_password, verify_password_blocking,
};
use crate::middleware::RequireUser;
use crate::router::BackendState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginQuery {
    pub use_cookies: Option<bool>,
    pub use_session_cookies: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub email: String,
    pub is_email_confirmed: bool,
}

/// POST /register -> creates a user with the given e-mail as user name.
pub async fn register(
    State(state): State<BackendState>,
    Json(req): Json<RegisterRequest>,
) -> Result<StatusCode, BackendError> {
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    if state.storage.find_user_by_email(&req.email).await?.is_some() {
        return Err(BackendError::validation(
            "DuplicateUserName",
            format!("Username '{}' is already taken.", req.email.trim()),
        ));
    }

    // a concurrent registration can still win the race; create_user maps the
    // unique violation to DuplicateUserName
    let hash = hash_password_blocking(req.password).await?;
    let user = state.storage.create_user(&req.email, hash, false).await?;
    info!(user_id = %user.id, "user registered");
    Ok(StatusCode::OK)
}

/// POST /login -> verifies credentials and issues the session cookie.
///
/// Only cookie sign-in is supported, so `useCookies` is accepted but always
/// treated as set. `useSessionCookies=true` drops the cookie's `Max-Age`.
pub async fn login(
    State(state): State<BackendState>,
    Query(query): Query<LoginQuery>,
    jar: PrivateCookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, BackendError> {
    let user = state.storage.find_user_by_email(&req.email).await?;
    let hash = user.as_ref().map(|u| u.password_hash.clone());
    let verified = verify_password_blocking(hash, req.password).await?;
    let Some(user) = user.filter(|_| verified) else {
        return Err(BackendError::InvalidCredentials);
    };

    let expires_at = state.cookies.expires_at(Utc::now());
    let session = state.storage.create_session(&user.id, expires_at).await?;

    let persistent = !query.use_session_cookies.unwrap_or(false);
    let jar = jar.add(state.cookies.session_cookie(session.id, persistent));

    info!(
        user_id = %user.id,
        persistent,
        use_cookies = query.use_cookies.unwrap_or(true),
        "user signed in"
    );
    Ok((jar, StatusCode::OK))
}

/// GET /manage/info -> e-mail and confirmation state of the caller.
pub async fn manage_info(RequireUser(user): RequireUser) -> Json<InfoResponse> {
    Json(InfoResponse {
        email: user.email,
        is_email_confirmed: user.email_confirmed,
    })
}
