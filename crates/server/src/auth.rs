//! Identity forwarded by the upstream auth proxy.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, MatchedPath, Request, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use services::USER_ID_HEADER;
use storage::repository::{StorageError, UserRepository};
use study_core::model::UserId;

use crate::error::ApiError;
use crate::state::AppState;

fn user_from_headers(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// The signed-in user; rejects with 401 when absent.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_headers(&parts.headers)
            .map(Self)
            .ok_or(ApiError::Unauthorized)
    }
}

/// The signed-in user, if any.
#[derive(Debug, Clone, Copy)]
pub struct Viewer(pub Option<UserId>);

impl<S: Send + Sync> FromRequestParts<S> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(user_from_headers(&parts.headers)))
    }
}

/// Count authenticated requests by method and route template, and mark the user as seen.
pub async fn track_authed_requests(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(user_id) = user_from_headers(req.headers()) {
        let path = req
            .extensions()
            .get::<MatchedPath>()
            .map_or_else(|| req.uri().path().to_owned(), |p| p.as_str().to_owned());
        state
            .services
            .metrics()
            .record_authed_request(req.method().as_str(), &path);

        let now = state.services.clock().now();
        let users = &state.services.storage().users;
        match users.touch_last_seen(user_id, now).await {
            Ok(()) | Err(StorageError::NotFound) => {}
            Err(err) => {
                tracing::warn!(user = %user_id, error = %err, "could not update last seen");
            }
        }
    }
    next.run(req).await
}
