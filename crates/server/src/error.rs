//! Error type for the HTTP layer.
//!
//! [`ApiError`] converts into a JSON body of the form
//! `{"error": "...", "status": 404}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use services::{LearnServiceError, MetricsError, ProfileLookupError};
use storage::repository::StorageError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound("resource".into()),
            StorageError::Conflict => Self::BadRequest("conflict".into()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ProfileLookupError> for ApiError {
    fn from(err: ProfileLookupError) -> Self {
        match err {
            ProfileLookupError::NotFound => Self::NotFound("profile".into()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<LearnServiceError> for ApiError {
    fn from(err: LearnServiceError) -> Self {
        match err {
            LearnServiceError::NotFound(id) => Self::NotFound(format!("study set {id}")),
            LearnServiceError::Storage(err) => err.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<MetricsError> for ApiError {
    fn from(err: MetricsError) -> Self {
        Self::Internal(err.to_string())
    }
}
