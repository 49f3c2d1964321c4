use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::debug;

use crate::error::BackendError;
use crate::identity::claims::ClaimsPrincipal;
use crate::router::BackendState;

/// Resolve the caller from the encrypted session cookie.
///
/// Returns `Ok(None)` for anonymous callers: no cookie, a cookie that fails
/// decryption, or a session that was signed out or has expired.
pub async fn authenticate(
    parts: &Parts,
    state: &BackendState,
) -> Result<Option<ClaimsPrincipal>, BackendError> {
    let jar = PrivateCookieJar::from_headers(&parts.headers, state.key.clone());
    let Some(session_id) = jar.get(&state.cookies.name).map(|c| c.value().to_owned()) else {
        return Ok(None);
    };

    let Some(session) = state.storage.find_active_session(&session_id).await? else {
        debug!("session cookie does not match an active session");
        return Ok(None);
    };

    let Some(user) = state.storage.get_user(&session.user_id).await? else {
        state.storage.delete_session(&session.id).await?;
        return Ok(None);
    };

    let roles = state.storage.roles_for_user(&user.id).await?;
    Ok(Some(ClaimsPrincipal::new(&user, session.id, &roles)))
}

/// Extractor that only lets authenticated callers through; 401 otherwise.
#[derive(Debug, Clone)]
pub struct RequireUser(pub ClaimsPrincipal);

impl FromRequestParts<BackendState> for RequireUser {
    type Rejection = BackendError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &BackendState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state)
            .await?
            .map(RequireUser)
            .ok_or(BackendError::Unauthorized)
    }
}
