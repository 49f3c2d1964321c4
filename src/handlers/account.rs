use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde_json::Value;
use tracing::info;

use crate::error::BackendError;
use crate::identity::claims::Claim;
use crate::middleware::RequireUser;
use crate::router::BackendState;

/// POST /Logout -> ends the caller's session and clears the cookie.
///
/// The body must be a JSON value other than `null` (clients send `{}`). A
/// plain cross-site form post cannot produce one, so a foreign page cannot
/// sign the user out. Missing, empty or `null` bodies get 401; a body sent as
/// anything but `application/json` (e.g. a `text/plain` form) gets 415.
pub async fn logout(
    State(state): State<BackendState>,
    RequireUser(user): RequireUser,
    jar: PrivateCookieJar,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, BackendError> {
    if body.trim_ascii().is_empty() {
        return Err(BackendError::Unauthorized);
    }
    if !is_json_content_type(&headers) {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("<none>")
            .to_string();
        return Err(BackendError::UnsupportedMediaType(content_type));
    }
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| BackendError::MalformedBody(e.to_string()))?;
    if payload.is_null() {
        return Err(BackendError::Unauthorized);
    }

    state.storage.delete_session(&user.session_id).await?;
    let jar = jar.remove(state.cookies.removal_cookie());

    info!(user_id = %user.user_id, "user signed out");
    Ok((jar, StatusCode::OK))
}

/// GET /roles -> the caller's role claims.
pub async fn roles(RequireUser(user): RequireUser) -> Json<Vec<Claim>> {
    Json(user.roles().cloned().collect())
}

/// `application/json` or an `application/*+json` subtype, parameters ignored.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_content_type(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn only_json_media_types_are_accepted() {
        assert!(is_json_content_type(&with_content_type("application/json")));
        assert!(is_json_content_type(&with_content_type("Application/JSON; charset=utf-8")));
        assert!(is_json_content_type(&with_content_type("application/problem+json")));
        assert!(!is_json_content_type(&with_content_type("text/plain")));
        assert!(!is_json_content_type(&with_content_type("application/x-www-form-urlencoded")));
        assert!(!is_json_content_type(&with_content_type("multipart/form-data; boundary=x")));
        assert!(!is_json_content_type(&HeaderMap::new()));
    }
}
