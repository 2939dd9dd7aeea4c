//! Token Endpoint
//!
//! Exchanges a chosen identity plus an optional target room for a signed
//! session credential. When no room is supplied the caller becomes a host and
//! the server allocates the room id.

pub mod jwt;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sr_common::{ErrorBody, TokenRequest, TokenResponse};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::api::AppState;

/// Errors returned by the token endpoint.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Username was missing or blank.
    #[error("Please enter your username.")]
    MissingUsername,

    /// Token minting failed.
    #[error("Internal server error")]
    Internal(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingUsername => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Handler for `POST /get-token`.
pub async fn handler(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, TokenError> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(TokenError::MissingUsername);
    }

    let hosting = req.is_host || req.room.trim().is_empty();
    let room_id = if hosting {
        format!("room-{}", Uuid::new_v4())
    } else {
        req.room.trim().to_owned()
    };

    let token = jwt::mint(
        username,
        &room_id,
        hosting,
        &state.config.token_secret,
        state.config.token_ttl,
    )?;

    if hosting {
        // Visible in the directory (at zero participants) as soon as it exists.
        state
            .registry
            .register_room(&room_id, &format!("{username}'s room"))
            .await;
    }

    info!(username = %username, room_id = %room_id, hosting, "Issued session token");

    Ok(Json(TokenResponse {
        token,
        room: room_id,
        display_name: username.to_owned(),
    }))
}
