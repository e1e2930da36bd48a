//! Rumble arena — HTTP and WebSocket surface.
//!
//! Exposes the router and its building blocks so integration tests can
//! drive the full stack without binding a socket.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the application router over `state`.
pub fn build_router(state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    Router::new()
        .merge(routes::health::router())
        .merge(routes::ws::router())
        .merge(routes::round::router())
        .nest("/admin", routes::admin::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
