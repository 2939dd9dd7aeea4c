//! Wire Protocol
//!
//! Directory push frames and the token exchange bodies.

use serde::{Deserialize, Serialize};

use crate::types::RoomSummary;

/// Server-to-client frames on the directory WebSocket.
///
/// Every frame is a full snapshot, not a delta; clients replace their local
/// list wholesale. Unrecognized frame types are ignored on the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DirectoryMessage {
    /// Full snapshot of currently-tracked rooms.
    Rooms { rooms: Vec<RoomSummary> },
}

/// Request body for `POST /get-token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    /// The joiner's chosen display name.
    pub username: String,
    /// Target room id; empty means "host a new room".
    pub room: String,
    /// Set when no room was selected; the server allocates one.
    pub is_host: bool,
}

/// Success body for `POST /get-token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Opaque session token for the media engine.
    pub token: String,
    /// The room to join; server-assigned on the host path.
    pub room: String,
    /// Display name echoed back to the client.
    pub display_name: String,
}

/// Error body returned on non-success responses, for user display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::{DirectoryMessage, TokenRequest};
    use crate::types::RoomSummary;

    #[test]
    fn rooms_frame_matches_wire_format() {
        let msg = DirectoryMessage::Rooms {
            rooms: vec![RoomSummary {
                room_id: "r1".into(),
                display_name: "r1".into(),
                participant_count: 1,
            }],
        };

        let json = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(json["type"], "rooms");
        assert_eq!(json["rooms"][0]["roomId"], "r1");
    }

    #[test]
    fn token_request_uses_is_host_wire_name() {
        let req = TokenRequest {
            username: "alice".into(),
            room: String::new(),
            is_host: true,
        };

        let json = serde_json::to_value(&req).expect("serialize");
        assert_eq!(json["isHost"], true);
        assert_eq!(json["room"], "");
    }

    #[test]
    fn unknown_frame_type_fails_to_decode() {
        let err = serde_json::from_str::<DirectoryMessage>(r#"{"type":"heartbeat"}"#);
        assert!(err.is_err());
    }
}
