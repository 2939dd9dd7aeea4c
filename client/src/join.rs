//! Join Coordinator
//!
//! Exchanges a chosen identity plus an optional target room for a session
//! credential. One request per join attempt, no directory or session state
//! touched.

use std::time::Duration;

use sr_common::{ErrorBody, TokenRequest, TokenResponse};
use thiserror::Error;
use tracing::{info, warn};

use crate::storage::PreferenceStore;

/// Bound on the credential request round-trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A signed credential for one join attempt. Immutable, consumed exactly
/// once to initialize a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredential {
    /// Opaque token for the media engine.
    pub token: String,
    /// Room to join; server-assigned on the host path.
    pub room_id: String,
    /// Display name echoed by the server.
    pub display_name: String,
}

/// Errors from the credential exchange.
#[derive(Debug, Error)]
pub enum JoinError {
    /// Display name missing; caught before any network call.
    #[error("Please enter your username.")]
    Validation,

    /// No response within the request bound.
    #[error("The request timed out")]
    Timeout,

    /// Transport unreachable or closed unexpectedly.
    #[error("Network error: {0}")]
    Network(String),

    /// The server explicitly rejected the request.
    #[error("Server rejected the request (status {status})")]
    Server {
        status: u16,
        /// Server-supplied message for user display, when present.
        message: Option<String>,
    },
}

impl JoinError {
    /// The message shown to the user. Prefers server-supplied text and never
    /// leaks a raw transport error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation => "Please enter your username.".into(),
            Self::Timeout => "The server took too long to respond. Please try again.".into(),
            Self::Server {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Network(_) | Self::Server { message: None, .. } => {
                "Unable to connect to the server. Please try again later.".into()
            }
        }
    }
}

/// Turns identity + optional room into a [`SessionCredential`].
pub struct JoinCoordinator {
    http: reqwest::Client,
    server_url: String,
    timeout: Duration,
    preferences: Option<PreferenceStore>,
}

impl JoinCoordinator {
    /// Create a coordinator for the given server base URL.
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            server_url: server_url.into(),
            timeout: REQUEST_TIMEOUT,
            preferences: None,
        }
    }

    /// Remember the display name in this store after a successful join.
    #[must_use]
    pub fn with_preferences(mut self, preferences: PreferenceStore) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Request a credential. Empty `room` signals "host a new room"; the
    /// server allocates and returns the room id.
    pub async fn request_credential(
        &self,
        display_name: &str,
        room: &str,
    ) -> Result<SessionCredential, JoinError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(JoinError::Validation);
        }
        let room = room.trim();

        let request = TokenRequest {
            username: display_name.to_owned(),
            room: room.to_owned(),
            is_host: room.is_empty(),
        };

        let url = format!("{}/get-token", self.server_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.json::<ErrorBody>().await.ok().map(|b| b.message);
            return Err(JoinError::Server { status, message });
        }

        let body: TokenResponse = response.json().await.map_err(map_transport_error)?;
        info!(room = %body.room, "Session credential issued");

        // Best-effort; a broken preference file must not block joining.
        if let Some(preferences) = &self.preferences {
            if let Err(e) = preferences.remember_display_name(display_name).await {
                warn!(error = %e, "Failed to save display name");
            }
        }

        Ok(SessionCredential {
            token: body.token,
            room_id: body.room,
            display_name: body.display_name,
        })
    }
}

fn map_transport_error(e: reqwest::Error) -> JoinError {
    if e.is_timeout() {
        JoinError::Timeout
    } else {
        JoinError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{JoinCoordinator, JoinError};

    #[tokio::test]
    async fn blank_display_name_fails_before_any_network_call() {
        // Port 9 is discard; if validation ever reached the network this
        // would hang or fail differently.
        let coordinator = JoinCoordinator::new("http://127.0.0.1:9");

        let err = coordinator
            .request_credential("   ", "room-1")
            .await
            .expect_err("must fail");
        assert!(matches!(err, JoinError::Validation));
    }

    #[test]
    fn user_message_prefers_server_text() {
        let err = JoinError::Server {
            status: 403,
            message: Some("Room is full".into()),
        };
        assert_eq!(err.user_message(), "Room is full");
    }

    #[test]
    fn user_message_never_leaks_transport_errors() {
        let err = JoinError::Network("connection refused (os error 111)".into());
        assert_eq!(
            err.user_message(),
            "Unable to connect to the server. Please try again later."
        );
    }

    #[test]
    fn timeout_gets_its_own_message() {
        assert!(JoinError::Timeout.user_message().contains("too long"));
    }
}
