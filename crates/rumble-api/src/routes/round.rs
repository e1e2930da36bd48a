//! Round status query.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use rumble_round::RoundStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/round
async fn round_status(State(state): State<AppState>) -> Result<Json<RoundStatus>, ApiError> {
    let status = state.round.status().await?;
    Ok(Json(status))
}

/// Returns the router for round queries.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/round", get(round_status))
}
