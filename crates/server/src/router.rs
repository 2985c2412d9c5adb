//! Axum router construction.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;

use crate::auth::track_authed_requests;
use crate::handlers;
use crate::state::AppState;

/// Build the complete router.
///
/// - `GET /healthz` -- liveness
/// - `GET /metrics` -- Prometheus text exposition
/// - `GET /api/profiles/{username}` -- profile, `@` marker allowed
/// - `GET /api/study-sets/{id}` -- study set with terms
/// - `POST /api/study-sets/{id}/complete-round` -- record a finished round
/// - `PUT /api/terms/{id}/star` -- star or unstar a term
///
/// The auth counter is a route layer so it sees the matched route template.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/metrics", get(handlers::metrics))
        .route("/api/profiles/{username}", get(handlers::get_profile))
        .route("/api/study-sets/{id}", get(handlers::get_study_set))
        .route(
            "/api/study-sets/{id}/complete-round",
            post(handlers::complete_round),
        )
        .route("/api/terms/{id}/star", put(handlers::set_star))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            track_authed_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
