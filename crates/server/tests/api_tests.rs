//! Integration tests for the HTTP API.
//!
//! Requests go straight into the `Router` via `tower::ServiceExt`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use server::{AppState, build_router};
use services::{AppServices, Clock, MetricsConfig};
use storage::repository::{
    ExperienceRepository, Storage, StudySetRepository, UserRepository,
};
use study_core::model::{StudySet, StudySetId, Term, TermId, User, UserId, Username, Visibility};
use study_core::time::fixed_now;
use tower::ServiceExt;

const ALICE: UserId = UserId::new(1);
const BOB: UserId = UserId::new(2);

async fn make_storage() -> Storage {
    let storage = Storage::in_memory();
    for (id, name) in [(ALICE, "alice"), (BOB, "bob")] {
        storage
            .users
            .upsert_user(&User {
                id,
                username: Username::new(name).unwrap(),
                name: None,
                image: None,
                verified: false,
                last_seen_at: fixed_now() - chrono::Duration::days(1),
            })
            .await
            .unwrap();
    }

    for (id, visibility) in [(10, Visibility::Public), (11, Visibility::Private)] {
        let set_id = StudySetId::new(id);
        let terms = vec![
            Term::new(TermId::new(id * 10), set_id, "Hallo", "Hello", 0).unwrap(),
            Term::new(TermId::new(id * 10 + 1), set_id, "Danke", "Thanks", 1).unwrap(),
        ];
        let set = StudySet::new(
            set_id,
            ALICE,
            format!("Set {id}"),
            "",
            fixed_now(),
            visibility,
            terms,
        )
        .unwrap();
        storage.study_sets.upsert_study_set(&set).await.unwrap();
    }
    storage
}

fn make_router(storage: Storage) -> Router {
    let services = AppServices::new(
        storage,
        Clock::fixed(fixed_now()),
        &MetricsConfig::new("test", "1.4.2"),
    )
    .unwrap();
    build_router(Arc::new(AppState::new(services)))
}

fn request(method: &str, uri: &str, user: Option<UserId>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn healthz_is_ok() {
    let app = make_router(make_storage().await);
    let response = app.oneshot(request("GET", "/healthz", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn profile_lookup_strips_marker() {
    let app = make_router(make_storage().await);
    let response = app
        .oneshot(request("GET", "/api/profiles/@alice", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["username"], "alice");
    assert_eq!(json["id"], 1);
    // Anonymous viewers only see public sets.
    assert_eq!(json["study_sets"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_profile_is_a_json_404() {
    let app = make_router(make_storage().await);
    let response = app
        .oneshot(request("GET", "/api/profiles/@ghost", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["status"], 404);
    assert!(json["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn private_sets_are_hidden_from_other_users() {
    let storage = make_storage().await;

    let owner = make_router(storage.clone())
        .oneshot(request("GET", "/api/study-sets/11", Some(ALICE)))
        .await
        .unwrap();
    assert_eq!(owner.status(), StatusCode::OK);
    let json = body_json(owner).await;
    assert_eq!(json["set"]["terms"].as_array().unwrap().len(), 2);

    let other = make_router(storage.clone())
        .oneshot(request("GET", "/api/study-sets/11", Some(BOB)))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::NOT_FOUND);

    let missing = make_router(storage)
        .oneshot(request("GET", "/api/study-sets/99", None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn complete_round_requires_a_user() {
    let storage = make_storage().await;

    let anonymous = make_router(storage.clone())
        .oneshot(request("POST", "/api/study-sets/10/complete-round", None))
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let ok = make_router(storage.clone())
        .oneshot(request("POST", "/api/study-sets/10/complete-round", Some(BOB)))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::NO_CONTENT);

    let experience = storage
        .experiences
        .get_experience(BOB, StudySetId::new(10))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(experience.rounds_completed, 1);

    let unknown = make_router(storage)
        .oneshot(request("POST", "/api/study-sets/99/complete-round", Some(BOB)))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn star_route_persists_toggles() {
    let storage = make_storage().await;
    let request = Request::builder()
        .method("PUT")
        .uri("/api/terms/101/star")
        .header("x-user-id", "2")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"starred":true}"#))
        .unwrap();

    let response = make_router(storage.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let starred = storage
        .study_sets
        .list_starred(BOB, StudySetId::new(10))
        .await
        .unwrap();
    assert_eq!(starred, vec![TermId::new(101)]);
}

fn star_request(term: u64, user: UserId) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/api/terms/{term}/star"))
        .header("x-user-id", user.to_string())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"starred":true}"#))
        .unwrap()
}

#[tokio::test]
async fn writes_to_private_sets_are_limited_to_the_owner() {
    let storage = make_storage().await;

    let round = make_router(storage.clone())
        .oneshot(request("POST", "/api/study-sets/11/complete-round", Some(BOB)))
        .await
        .unwrap();
    assert_eq!(round.status(), StatusCode::NOT_FOUND);
    assert!(
        storage
            .experiences
            .get_experience(BOB, StudySetId::new(11))
            .await
            .unwrap()
            .is_none()
    );

    let star = make_router(storage.clone())
        .oneshot(star_request(110, BOB))
        .await
        .unwrap();
    assert_eq!(star.status(), StatusCode::NOT_FOUND);
    assert!(
        storage
            .study_sets
            .list_starred(BOB, StudySetId::new(11))
            .await
            .unwrap()
            .is_empty()
    );

    let owner = make_router(storage.clone())
        .oneshot(star_request(110, ALICE))
        .await
        .unwrap();
    assert_eq!(owner.status(), StatusCode::NO_CONTENT);

    let unknown_term = make_router(storage)
        .oneshot(star_request(999, ALICE))
        .await
        .unwrap();
    assert_eq!(unknown_term.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_count_authed_requests_by_route_template() {
    let storage = make_storage().await;
    let app = make_router(storage.clone());

    let response = app
        .clone()
        .oneshot(request("GET", "/api/profiles/@alice", Some(BOB)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(request("GET", "/metrics", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));

    let text = body_text(response).await;
    let counter = text
        .lines()
        .find(|line| line.starts_with("authed_api_requests_total{"))
        .expect("counter sample");
    assert!(counter.contains(r#"path="/api/profiles/{username}""#));
    assert!(counter.contains(r#"method="GET""#));
    assert!(counter.ends_with(" 1"));

    assert!(text.contains(r#"version="v1.4.2""#));
    assert!(text.contains(r#"users{server="test"} 2"#));
    // Bob was marked as seen by the authenticated request.
    assert!(text.contains(r#"active_users{server="test"} 1"#));

    let bob = storage.users.get_user(BOB).await.unwrap().unwrap();
    assert_eq!(bob.last_seen_at, fixed_now());
}
