use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::auth::AuthError;
use service::post::PostError;
use thiserror::Error;
use tracing::error;

/// JSON error response: `{"error": <reason>, "message": <detail>}`.
#[derive(Debug)]
pub struct JsonApiError {
    status: StatusCode,
    error: String,
    message: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &str, message: Option<String>) -> Self {
        Self { status, error: error.to_string(), message }
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", Some(message.to_string()))
    }

    pub fn not_found(message: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", Some(message.to_string()))
    }

    fn internal(error: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error, Some("internal server error".into()))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: &self.error, message: self.message.as_deref() };
        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let msg = Some(e.to_string());
        match e {
            AuthError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, "validation_error", msg),
            AuthError::Conflict => Self::new(StatusCode::CONFLICT, "conflict", msg),
            AuthError::InvalidCredentials => Self::new(StatusCode::UNAUTHORIZED, "invalid_credentials", msg),
            AuthError::Unauthorized(_) => Self::new(StatusCode::UNAUTHORIZED, "unauthorized", msg),
            AuthError::NotFound => Self::new(StatusCode::NOT_FOUND, "not_found", msg),
            AuthError::HashError(_) | AuthError::TokenError(_) => {
                error!(code = e.code(), error = %e, "auth internal failure");
                Self::internal("internal_error")
            }
            AuthError::Storage(ref source) => {
                error!(code = e.code(), error = %source, "auth storage failure");
                Self::internal("storage_error")
            }
        }
    }
}

impl From<PostError> for JsonApiError {
    fn from(e: PostError) -> Self {
        let msg = Some(e.to_string());
        match e {
            PostError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, "validation_error", msg),
            PostError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "not_found", msg),
            PostError::Forbidden(_) => Self::new(StatusCode::FORBIDDEN, "forbidden", msg),
            PostError::Storage(ref source) => {
                error!(code = e.code(), error = %source, "post storage failure");
                Self::internal("storage_error")
            }
        }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_body", Some(rejection.body_text()))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
