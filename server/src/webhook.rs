//! Media Engine Webhook
//!
//! The engine reports room and participant lifecycle over HTTP; these events
//! are the registry's only source of participant counts. Unknown events are
//! ignored so engine upgrades cannot break the directory.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::api::AppState;

/// Webhook payload from the media engine.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    /// Event name, e.g. `participant_joined`.
    pub event: String,
    /// Room the event concerns.
    pub room: WebhookRoom,
    /// Participant, present on participant events.
    pub participant: Option<WebhookParticipant>,
}

/// Room reference inside a webhook payload.
#[derive(Debug, Deserialize)]
pub struct WebhookRoom {
    pub name: String,
}

/// Participant reference inside a webhook payload.
#[derive(Debug, Deserialize)]
pub struct WebhookParticipant {
    pub identity: String,
}

/// Handler for `POST /webhook`.
pub async fn handler(
    State(state): State<AppState>,
    Json(event): Json<WebhookEvent>,
) -> StatusCode {
    let room_id = event.room.name.as_str();
    let identity = event.participant.as_ref().map(|p| p.identity.as_str());
    debug!(event = %event.event, room_id = %room_id, identity = ?identity, "Engine webhook");

    match event.event.as_str() {
        "room_started" => state.registry.room_started(room_id).await,
        "room_finished" => state.registry.room_finished(room_id).await,
        "participant_joined" => state.registry.participant_joined(room_id).await,
        "participant_left" => state.registry.participant_left(room_id).await,
        other => {
            debug!(event = %other, "Ignoring unknown webhook event");
        }
    }

    StatusCode::OK
}
