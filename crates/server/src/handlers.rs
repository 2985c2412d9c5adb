//! Request handlers for the HTTP API.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::Deserialize;
use services::LearnMaterial;
use services::learn::StudySetSource;
use services::profile::ProfileSource;
use storage::repository::{ExperienceRepository, StudySetRepository};
use study_core::model::{Profile, StudySetId, TermId, UserId, Username};

use crate::auth::{CurrentUser, Viewer};
use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /healthz
// ---------------------------------------------------------------------------

pub async fn healthz() -> &'static str {
    "ok"
}

// ---------------------------------------------------------------------------
// GET /metrics
// ---------------------------------------------------------------------------

/// Prometheus scrape: process metrics, static collectors and fresh domain gauges.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let registry = state.services.metrics();
    let body = registry.render().await?;
    Ok(([(header::CONTENT_TYPE, registry.content_type())], body))
}

// ---------------------------------------------------------------------------
// GET /api/profiles/{username}
// ---------------------------------------------------------------------------

/// Look up a profile; the route segment may carry the `@` marker.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Viewer(viewer): Viewer,
    Path(raw): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let username =
        Username::from_route(&raw).map_err(|_| ApiError::NotFound(format!("profile {raw}")))?;

    let profile = state
        .services
        .profile_source()
        .profile(&username, viewer)
        .await?;
    Ok(Json(profile))
}

// ---------------------------------------------------------------------------
// GET /api/study-sets/{id}
// ---------------------------------------------------------------------------

/// A study set with its terms and the viewer's stars. Private sets are
/// only visible to their creator.
pub async fn get_study_set(
    State(state): State<Arc<AppState>>,
    Viewer(viewer): Viewer,
    Path(id): Path<u64>,
) -> Result<Json<LearnMaterial>, ApiError> {
    let id = StudySetId::new(id);
    let material = state
        .services
        .study_set_source()
        .material(id, viewer)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("study set {id}")))?;
    Ok(Json(material))
}

/// Fail with 404 unless `viewer` may see the study set.
async fn ensure_visible(state: &AppState, id: StudySetId, viewer: UserId) -> Result<(), ApiError> {
    state
        .services
        .study_set_source()
        .material(id, Some(viewer))
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound(format!("study set {id}")))
}

// ---------------------------------------------------------------------------
// POST /api/study-sets/{id}/complete-round
// ---------------------------------------------------------------------------

pub async fn complete_round(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let id = StudySetId::new(id);
    ensure_visible(&state, id, user_id).await?;

    let now = state.services.clock().now();
    let experience = state
        .services
        .storage()
        .experiences
        .complete_round(user_id, id, now)
        .await?;

    tracing::info!(
        user = %user_id,
        study_set = %id,
        rounds = experience.rounds_completed,
        "round completed"
    );
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// PUT /api/terms/{id}/star
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StarRequest {
    pub starred: bool,
}

pub async fn set_star(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<u64>,
    Json(body): Json<StarRequest>,
) -> Result<StatusCode, ApiError> {
    let term_id = TermId::new(id);
    let study_sets = &state.services.storage().study_sets;
    let study_set_id = study_sets
        .term_study_set(term_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("term {term_id}")))?;
    ensure_visible(&state, study_set_id, user_id).await?;

    study_sets.set_starred(user_id, term_id, body.starred).await?;
    Ok(StatusCode::NO_CONTENT)
}
