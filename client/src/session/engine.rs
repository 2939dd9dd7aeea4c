//! Media Engine Boundary
//!
//! The external real-time engine is consumed behind this trait: one event
//! stream in, enable/disable commands out. Nothing in the session layer
//! touches capture, encoding, or transport directly.

use std::future::Future;

use thiserror::Error;
use tokio::sync::mpsc;

/// Media kinds a participant can publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Microphone,
    Camera,
    ScreenShare,
}

/// Discrete connection-quality tiers for presentation.
///
/// No numeric scale is retained; the engine's raw signal is mapped to one of
/// these before it reaches state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionQuality {
    #[default]
    Unknown,
    Poor,
    Good,
    Excellent,
    Lost,
}

/// Events emitted by the media engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine acknowledged the connection.
    Connected,
    /// A remote participant joined the room.
    ParticipantJoined { identity: String },
    /// A remote participant left the room.
    ParticipantLeft { identity: String },
    /// A participant's track went live.
    TrackPublished { identity: String, kind: TrackKind },
    /// A participant's track went away.
    TrackUnpublished { identity: String, kind: TrackKind },
    /// Local connection quality changed.
    ConnectionQualityChanged { quality: ConnectionQuality },
    /// The engine disconnected (remote close or transport failure).
    Disconnected,
}

/// A media-engine command failed. Logged, never shown as a blocking dialog.
#[derive(Debug, Clone, Error)]
#[error("Engine command failed: {0}")]
pub struct EngineCommandError(pub String);

/// The consumed engine surface.
///
/// Commands are asynchronous round-trips; callers await completion before
/// mutating dependent local state. Last write wins, no queuing.
pub trait MediaEngine: Send + 'static {
    /// Connect to a room and return the engine's event stream.
    fn connect(
        &mut self,
        server_url: &str,
        token: &str,
    ) -> impl Future<Output = Result<mpsc::Receiver<EngineEvent>, EngineCommandError>> + Send;

    /// Enable or disable the local microphone.
    fn set_microphone_enabled(
        &mut self,
        enabled: bool,
    ) -> impl Future<Output = Result<(), EngineCommandError>> + Send;

    /// Enable or disable the local camera.
    fn set_camera_enabled(
        &mut self,
        enabled: bool,
    ) -> impl Future<Output = Result<(), EngineCommandError>> + Send;

    /// Start or stop the local screen share.
    fn set_screen_share_enabled(
        &mut self,
        enabled: bool,
    ) -> impl Future<Output = Result<(), EngineCommandError>> + Send;

    /// Enable or disable a remote participant's published track.
    ///
    /// Host privilege; enforcement belongs to the engine and the server, not
    /// this layer.
    fn set_remote_track_enabled(
        &mut self,
        identity: &str,
        kind: TrackKind,
        enabled: bool,
    ) -> impl Future<Output = Result<(), EngineCommandError>> + Send;

    /// Tear down the connection.
    fn disconnect(&mut self) -> impl Future<Output = Result<(), EngineCommandError>> + Send;
}
