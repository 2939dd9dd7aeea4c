//! Live Session
//!
//! Owns the lifecycle of one active call. A spawned task holds the media
//! engine and the state, processes engine events and user commands one at a
//! time, and publishes every transition on a watch channel the presentation
//! layer renders from. No two handlers for the same session ever interleave.

pub mod engine;
pub mod state;

pub use engine::{ConnectionQuality, EngineCommandError, EngineEvent, MediaEngine, TrackKind};
pub use state::{ConnectionPhase, Participant, SessionEvent, SessionState, TrackSlot};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::join::SessionCredential;

/// User commands into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    ToggleMicrophone,
    ToggleCamera,
    ToggleScreenShare,
    /// Host control: mute/unmute a remote participant's microphone.
    ToggleRemoteMicrophone { identity: String },
    /// Host control: disable/enable a remote participant's camera.
    ToggleRemoteCamera { identity: String },
    ToggleParticipantPanel,
    Hangup,
}

/// Handle to a running session.
///
/// Dropping the handle hangs the session up: the engine connection is an
/// exclusively-owned resource, released unconditionally on exit.
pub struct Session {
    cmd_tx: mpsc::Sender<SessionCommand>,
    state_rx: watch::Receiver<SessionState>,
}

impl Session {
    /// Connect the engine with a credential and start the session task.
    ///
    /// The credential is consumed; rejoining requires a fresh one.
    pub async fn connect<E: MediaEngine>(
        credential: SessionCredential,
        server_url: &str,
        mut engine: E,
    ) -> Result<Self, EngineCommandError> {
        let events = engine.connect(server_url, &credential.token).await?;
        info!(room = %credential.room_id, "Session connecting");

        let initial = SessionState::connecting(&credential.display_name);
        let (state_tx, state_rx) = watch::channel(initial.clone());
        let (cmd_tx, cmd_rx) = mpsc::channel(16);

        tokio::spawn(run_session(engine, events, cmd_rx, state_tx, initial));

        Ok(Self { cmd_tx, state_rx })
    }

    /// Subscribe to state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    /// Send a command. Ignored if the session already ended.
    pub async fn command(&self, command: SessionCommand) {
        if self.cmd_tx.send(command).await.is_err() {
            debug!("Session task gone, command dropped");
        }
    }

    /// Toggle the local microphone.
    pub async fn toggle_microphone(&self) {
        self.command(SessionCommand::ToggleMicrophone).await;
    }

    /// Toggle the local camera.
    pub async fn toggle_camera(&self) {
        self.command(SessionCommand::ToggleCamera).await;
    }

    /// Toggle the local screen share.
    pub async fn toggle_screen_share(&self) {
        self.command(SessionCommand::ToggleScreenShare).await;
    }

    /// Leave the call. Always reaches `Disconnected`.
    pub async fn hangup(&self) {
        self.command(SessionCommand::Hangup).await;
    }
}

/// The session task: one loop, events and commands to completion.
async fn run_session<E: MediaEngine>(
    mut engine: E,
    mut events: mpsc::Receiver<EngineEvent>,
    mut commands: mpsc::Receiver<SessionCommand>,
    state_tx: watch::Sender<SessionState>,
    mut session_state: SessionState,
) {
    loop {
        tokio::select! {
            event = events.recv() => {
                let event = event.unwrap_or(EngineEvent::Disconnected);
                debug!(?event, "Engine event");
                let ended = matches!(event, EngineEvent::Disconnected);
                session_state = session_state.apply(&SessionEvent::Engine(event));
                let _ = state_tx.send(session_state.clone());
                if ended {
                    break;
                }
            }

            command = commands.recv() => {
                match command {
                    Some(SessionCommand::Hangup) | None => {
                        shutdown(&mut engine).await;
                        session_state = session_state
                            .apply(&SessionEvent::Engine(EngineEvent::Disconnected));
                        let _ = state_tx.send(session_state.clone());
                        break;
                    }
                    Some(command) => {
                        session_state = handle_command(&mut engine, session_state, command).await;
                        let _ = state_tx.send(session_state.clone());
                    }
                }
            }
        }
    }

    info!("Session ended");
}

/// Execute one user command against the engine, then fold the effect into
/// state. A failed engine call leaves state exactly as it was.
async fn handle_command<E: MediaEngine>(
    engine: &mut E,
    session_state: SessionState,
    command: SessionCommand,
) -> SessionState {
    match command {
        SessionCommand::ToggleMicrophone => {
            let enabled = !local_enabled(&session_state, TrackKind::Microphone);
            match engine.set_microphone_enabled(enabled).await {
                Ok(()) => session_state.apply(&SessionEvent::LocalTrack {
                    kind: TrackKind::Microphone,
                    enabled,
                }),
                Err(e) => {
                    warn!(error = %e, "Microphone toggle failed");
                    session_state
                }
            }
        }

        SessionCommand::ToggleCamera => {
            let enabled = !local_enabled(&session_state, TrackKind::Camera);
            match engine.set_camera_enabled(enabled).await {
                Ok(()) => session_state.apply(&SessionEvent::LocalTrack {
                    kind: TrackKind::Camera,
                    enabled,
                }),
                Err(e) => {
                    warn!(error = %e, "Camera toggle failed");
                    session_state
                }
            }
        }

        SessionCommand::ToggleScreenShare => {
            let enabled = !local_enabled(&session_state, TrackKind::ScreenShare);
            match engine.set_screen_share_enabled(enabled).await {
                Ok(()) => session_state.apply(&SessionEvent::LocalTrack {
                    kind: TrackKind::ScreenShare,
                    enabled,
                }),
                Err(e) => {
                    warn!(error = %e, "Screen share toggle failed");
                    session_state
                }
            }
        }

        SessionCommand::ToggleRemoteMicrophone { identity } => {
            toggle_remote(engine, session_state, &identity, TrackKind::Microphone).await
        }

        SessionCommand::ToggleRemoteCamera { identity } => {
            toggle_remote(engine, session_state, &identity, TrackKind::Camera).await
        }

        SessionCommand::ToggleParticipantPanel => session_state.apply(&SessionEvent::PanelToggled),

        // Handled by the caller; unreachable here but harmless.
        SessionCommand::Hangup => session_state,
    }
}

/// Flip a remote participant's published track. No track, no call: toggling
/// something that was never published is a silent no-op.
async fn toggle_remote<E: MediaEngine>(
    engine: &mut E,
    session_state: SessionState,
    identity: &str,
    kind: TrackKind,
) -> SessionState {
    let Some(target) = session_state
        .participant(identity)
        .filter(|p| !p.is_local && p.has_track(kind))
    else {
        debug!(identity, ?kind, "Remote toggle ignored, no such track");
        return session_state;
    };

    let enabled = !target.track_enabled(kind);
    match engine.set_remote_track_enabled(identity, kind, enabled).await {
        Ok(()) => session_state.apply(&SessionEvent::RemoteTrack {
            identity: identity.to_owned(),
            kind,
            enabled,
        }),
        Err(e) => {
            warn!(error = %e, identity, "Remote toggle failed");
            session_state
        }
    }
}

fn local_enabled(session_state: &SessionState, kind: TrackKind) -> bool {
    session_state
        .local()
        .is_some_and(|p| p.track_enabled(kind))
}

/// Teardown never blocks leaving: every failure is logged and swallowed.
async fn shutdown<E: MediaEngine>(engine: &mut E) {
    if let Err(e) = engine.set_camera_enabled(false).await {
        warn!(error = %e, "Failed to disable camera during hangup");
    }
    if let Err(e) = engine.set_microphone_enabled(false).await {
        warn!(error = %e, "Failed to disable microphone during hangup");
    }
    if let Err(e) = engine.disconnect().await {
        warn!(error = %e, "Failed to disconnect engine during hangup");
    }
}
