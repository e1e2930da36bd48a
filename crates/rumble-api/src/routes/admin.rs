//! Administrative control routes.
//!
//! Every command is always accepted by the round service; the outcome
//! carries whether it took effect. Only the service being gone is an
//! error.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use rumble_round::{AdminCommand, AdminOutcome};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

type AdminResponse = Result<(StatusCode, Json<AdminOutcome>), ApiError>;

async fn run(state: &AppState, command: AdminCommand) -> AdminResponse {
    let outcome = state.round.admin(command).await?;
    info!(%command, success = outcome.success, "admin command handled");

    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(outcome)))
}

/// POST /admin/force-end
#[instrument(skip(state))]
async fn force_end(State(state): State<AppState>) -> AdminResponse {
    run(&state, AdminCommand::ForceEnd).await
}

/// POST /admin/reset
#[instrument(skip(state))]
async fn reset(State(state): State<AppState>) -> AdminResponse {
    run(&state, AdminCommand::Reset).await
}

/// POST /admin/kick-all
#[instrument(skip(state))]
async fn kick_all(State(state): State<AppState>) -> AdminResponse {
    run(&state, AdminCommand::KickAll).await
}

/// POST /admin/start-round
#[instrument(skip(state))]
async fn start_round(State(state): State<AppState>) -> AdminResponse {
    run(&state, AdminCommand::StartNow).await
}

/// Returns the router for admin commands.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/force-end", post(force_end))
        .route("/reset", post(reset))
        .route("/kick-all", post(kick_all))
        .route("/start-round", post(start_round))
}
