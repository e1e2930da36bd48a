//! WebSocket observer endpoints.
//!
//! `/ws` serves participants, `/admin/ws` serves privileged observers. The
//! capability comes from the route alone.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use futures_util::{SinkExt, StreamExt};
use rumble_core::error::RoundError;
use rumble_core::participant::ParticipantId;
use rumble_gateway::Capability;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Messages a participant may send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Enroll in the next round under `name`.
    Enroll { name: String },
    /// Withdraw from the next round.
    Unenroll,
}

/// Messages sent to one connection only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DirectReply {
    /// First message on every connection.
    Welcome { identity: ParticipantId },
    /// A request from this connection was refused.
    Rejected { code: String, message: String },
}

impl From<&RoundError> for DirectReply {
    fn from(err: &RoundError) -> Self {
        Self::Rejected {
            code: err.code().to_owned(),
            message: err.to_string(),
        }
    }
}

/// GET /ws
async fn participant_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_observer(socket, state, Capability::Participant))
}

/// GET /admin/ws
async fn admin_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_observer(socket, state, Capability::Admin))
}

async fn serve_observer(socket: WebSocket, state: AppState, capability: Capability) {
    let id = ParticipantId::new();
    let (mut sender, mut receiver) = socket.split();

    let welcome = match serde_json::to_string(&DirectReply::Welcome { identity: id }) {
        Ok(json) => json,
        Err(e) => {
            warn!(observer = %id, error = %e, "failed to serialize welcome");
            return;
        }
    };
    if sender.send(Message::Text(welcome.into())).await.is_err() {
        return;
    }

    let mut outbound = state.gateway.attach(id, capability);
    if capability == Capability::Participant {
        if let Err(err) = state.round.connect(id).await {
            warn!(observer = %id, error = %err, "participant could not be registered");
            state.gateway.detach(id);
            return;
        }
    }
    info!(observer = %id, ?capability, "observer connected");

    let mut writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            if sender.send(Message::Text(String::clone(&message).into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    loop {
        tokio::select! {
            _ = &mut writer => break,
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    handle_client_message(&state, id, capability, &text).await;
                }
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    writer.abort();
    state.gateway.detach(id);
    if capability == Capability::Participant {
        let _ = state.round.disconnect(id);
    }
    info!(observer = %id, ?capability, "observer disconnected");
}

async fn handle_client_message(state: &AppState, id: ParticipantId, capability: Capability, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            debug!(observer = %id, error = %e, "ignoring malformed client message");
            return;
        }
    };

    if capability != Capability::Participant {
        debug!(observer = %id, "admin observers cannot enroll");
        return;
    }

    match message {
        ClientMessage::Enroll { name } => {
            if let Err(err) = state.round.enroll(id, name).await {
                state.gateway.send_json(id, &DirectReply::from(&err));
            }
        }
        ClientMessage::Unenroll => {
            let _ = state.round.unenroll(id);
        }
    }
}

/// Returns the router for WebSocket endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ws", get(participant_socket))
        .route("/admin/ws", get(admin_socket))
}
