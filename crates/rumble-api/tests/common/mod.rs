//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rumble_gateway::BroadcastGateway;
use rumble_round::{Collaborators, RoundHandle, RoundService, RoundTimings};
use rumble_test_support::{FixedClock, MockRng, ScriptedNarrator};
use tokio::task::JoinHandle;
use tower::ServiceExt;

use rumble_api::build_router;
use rumble_api::state::AppState;

/// A running round service with the router in front of it.
pub struct TestApp {
    pub router: Router,
    pub round: RoundHandle,
    pub gateway: Arc<BroadcastGateway>,
    pub service: JoinHandle<()>,
}

/// Spawns a round service with deterministic collaborators and builds the
/// full app router over it. Uses the same route structure as `main.rs`.
pub fn spawn_test_app() -> TestApp {
    let gateway = Arc::new(BroadcastGateway::new());
    let clock = FixedClock::at_hour(2026, 1, 15, 10);
    let (round, service) = RoundService::spawn(
        RoundTimings::default(),
        Collaborators {
            sink: gateway.clone(),
            narrator: Arc::new(ScriptedNarrator::new("")),
            clock: Arc::new(clock),
            rng: Box::new(MockRng),
        },
    );
    let router = build_router(AppState::new(round.clone(), gateway.clone()));

    TestApp {
        router,
        round,
        gateway,
        service,
    }
}

/// Builds the app router alone.
pub fn build_test_app() -> Router {
    spawn_test_app().router
}

/// Send a POST request with an empty body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
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
