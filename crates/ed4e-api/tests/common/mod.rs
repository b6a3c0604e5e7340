//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use ed4e_core::clock::Clock;
use ed4e_core::rng::DeterministicRng;
use ed4e_rules::domain::config::RulesConfig;
use ed4e_test_support::{FixedClock, SequenceRng};
use tower::ServiceExt;

use ed4e_api::routes;
use ed4e_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock + Send + Sync> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app router with deterministic Clock/RNG and no dice
/// scripted. Uses the same route structure as `main.rs`.
pub fn build_test_app() -> Router {
    build_test_app_with_rng(SequenceRng::new(vec![]))
}

/// Build the full app router with a custom `SequenceRng` for tests that
/// roll dice.
pub fn build_test_app_with_rng(rng: SequenceRng) -> Router {
    build_test_app_with(RulesConfig::default(), rng)
}

/// Build the full app router with a custom rules configuration.
pub fn build_test_app_with(config: RulesConfig, rng: SequenceRng) -> Router {
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    let app_state = AppState::new(Arc::new(config), fixed_clock(), rng);

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/steps", routes::steps::router())
        .nest("/api/v1/tests", routes::resolution::router())
        .with_state(app_state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
