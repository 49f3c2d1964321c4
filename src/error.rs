use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum BackendError {
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid user name or password")]
    InvalidCredentials,

    #[error("Validation failed: {0:?}")]
    Validation(BTreeMap<String, Vec<String>>),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedMediaType(String),
}

impl From<password_hash::Error> for BackendError {
    fn from(e: password_hash::Error) -> Self {
        BackendError::PasswordHash(e.to_string())
    }
}

impl BackendError {
    /// Single-entry validation failure keyed by an identity error code.
    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(code.into(), vec![message.into()]);
        BackendError::Validation(errors)
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> axum::response::Response {
        match self {
            BackendError::InvalidCredentials => {
                let body = ProblemDetails {
                    kind: "https://tools.ietf.org/html/rfc9110#section-15.5.2",
                    title: "Unauthorized",
                    status: StatusCode::UNAUTHORIZED.as_u16(),
                    detail: Some("Failed".to_string()),
                    errors: None,
                };
                (StatusCode::UNAUTHORIZED, Json(body)).into_response()
            }
            BackendError::Validation(errors) => {
                let body = ProblemDetails {
                    kind: "https://tools.ietf.org/html/rfc9110#section-15.5.1",
                    title: "One or more validation errors occurred.",
                    status: StatusCode::BAD_REQUEST.as_u16(),
                    detail: None,
                    errors: Some(errors),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            BackendError::Unauthorized => {
                let body = ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "Authentication required.".to_string(),
                };
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ApiErrorResponse { error: body }),
                )
                    .into_response()
            }
            BackendError::MalformedBody(reason) => {
                let body = ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message: reason,
                };
                (StatusCode::BAD_REQUEST, Json(ApiErrorResponse { error: body })).into_response()
            }
            BackendError::UnsupportedMediaType(content_type) => {
                let body = ApiErrorBody {
                    code: "UNSUPPORTED_MEDIA_TYPE".to_string(),
                    message: format!("expected application/json, got `{content_type}`"),
                };
                (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    Json(ApiErrorResponse { error: body }),
                )
                    .into_response()
            }
            err => {
                error!(error = %err, "request failed");
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiErrorResponse { error: body }),
                )
                    .into_response()
            }
        }
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// RFC 9457 problem body returned by the identity endpoints.
#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}
