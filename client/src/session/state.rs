//! Session State
//!
//! The rendering model for one live call, derived from engine events and
//! command effects by a pure reducer. The presentation layer reads this and
//! nothing else.

use std::collections::HashMap;

use super::engine::{ConnectionQuality, EngineEvent, TrackKind};

/// Connection phase of the session. `Disconnected` is terminal; rejoining
/// means constructing a fresh session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Connecting,
    Connected,
    Disconnected,
}

/// One participant in the call.
///
/// Tracks are keyed by kind; presence in the map means the track is
/// published, the value is its enabled state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Unique identity within the room.
    pub identity: String,
    /// Whether this is the local participant.
    pub is_local: bool,
    tracks: HashMap<TrackKind, bool>,
    /// Connection-quality tier; only maintained for the local participant.
    pub connection_quality: ConnectionQuality,
}

impl Participant {
    fn new(identity: impl Into<String>, is_local: bool) -> Self {
        Self {
            identity: identity.into(),
            is_local,
            tracks: HashMap::new(),
            connection_quality: ConnectionQuality::default(),
        }
    }

    /// Whether the participant currently publishes a track of this kind.
    #[must_use]
    pub fn has_track(&self, kind: TrackKind) -> bool {
        self.tracks.contains_key(&kind)
    }

    /// Whether a track of this kind is published and enabled.
    #[must_use]
    pub fn track_enabled(&self, kind: TrackKind) -> bool {
        self.tracks.get(&kind).copied().unwrap_or(false)
    }

    /// Microphone published and live.
    #[must_use]
    pub fn microphone_enabled(&self) -> bool {
        self.track_enabled(TrackKind::Microphone)
    }

    /// Camera published and live.
    #[must_use]
    pub fn camera_enabled(&self) -> bool {
        self.track_enabled(TrackKind::Camera)
    }

    /// Screen share published and live.
    #[must_use]
    pub fn screen_share_enabled(&self) -> bool {
        self.track_enabled(TrackKind::ScreenShare)
    }
}

/// One renderable grid cell: a live track or a placeholder for a camera
/// that is expected but not yet available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSlot {
    /// A live media track.
    Live { identity: String, kind: TrackKind },
    /// Participant present, camera not yet available. Keeps the grid from
    /// jittering on enable races. Screen shares never get placeholders.
    Placeholder { identity: String },
}

impl TrackSlot {
    /// The participant this slot belongs to.
    #[must_use]
    pub fn identity(&self) -> &str {
        match self {
            Self::Live { identity, .. } | Self::Placeholder { identity } => identity,
        }
    }
}

/// Everything the session reducer reacts to: engine events plus the local
/// effects of completed user commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// An event from the media engine's stream.
    Engine(EngineEvent),
    /// A local toggle completed against the engine.
    LocalTrack { kind: TrackKind, enabled: bool },
    /// A remote track's enablement was flipped (host control).
    RemoteTrack {
        identity: String,
        kind: TrackKind,
        enabled: bool,
    },
    /// The participant panel was toggled.
    PanelToggled,
}

/// Aggregate session state. Mutated only through [`SessionState::apply`];
/// read-only everywhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Current connection phase.
    pub phase: ConnectionPhase,
    participants: Vec<Participant>,
    slots: Vec<TrackSlot>,
    /// Whether the participant side panel is open.
    pub show_participant_panel: bool,
}

impl SessionState {
    /// Initial state for a fresh session: connecting, local participant
    /// present, nothing published yet.
    #[must_use]
    pub fn connecting(local_identity: &str) -> Self {
        let participants = vec![Participant::new(local_identity, true)];
        let slots = derive_slots(&participants);
        Self {
            phase: ConnectionPhase::Connecting,
            participants,
            slots,
            show_participant_panel: false,
        }
    }

    /// Participants in join order; the local participant is always first.
    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Look up a participant by identity.
    #[must_use]
    pub fn participant(&self, identity: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.identity == identity)
    }

    /// The local participant. Present for the session's whole lifetime.
    #[must_use]
    pub fn local(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.is_local)
    }

    /// The ordered grid: camera slots before screen-share slots, each kind
    /// in participant-join order. Never reordered by quality or activity.
    #[must_use]
    pub fn slots(&self) -> &[TrackSlot] {
        &self.slots
    }

    /// Reduce one event into the next state.
    ///
    /// `Disconnected` is terminal: every later event is ignored.
    #[must_use]
    pub fn apply(mut self, event: &SessionEvent) -> Self {
        if self.phase == ConnectionPhase::Disconnected {
            return self;
        }

        match event {
            SessionEvent::Engine(engine_event) => self.apply_engine(engine_event),
            SessionEvent::LocalTrack { kind, enabled } => {
                if let Some(local) = self.participants.iter_mut().find(|p| p.is_local) {
                    set_track(local, *kind, *enabled);
                }
            }
            SessionEvent::RemoteTrack {
                identity,
                kind,
                enabled,
            } => {
                // Only flips an existing published track; never conjures one.
                if let Some(p) = self
                    .participants
                    .iter_mut()
                    .find(|p| &p.identity == identity && p.has_track(*kind))
                {
                    set_track(p, *kind, *enabled);
                }
            }
            SessionEvent::PanelToggled => {
                self.show_participant_panel = !self.show_participant_panel;
            }
        }

        self.slots = derive_slots(&self.participants);
        self
    }

    fn apply_engine(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::Connected => {
                self.phase = ConnectionPhase::Connected;
            }
            EngineEvent::Disconnected => {
                self.phase = ConnectionPhase::Disconnected;
            }
            EngineEvent::ParticipantJoined { identity } => {
                if self.participant(identity).is_none() {
                    self.participants.push(Participant::new(identity, false));
                }
            }
            EngineEvent::ParticipantLeft { identity } => {
                self.participants
                    .retain(|p| p.is_local || &p.identity != identity);
            }
            EngineEvent::TrackPublished { identity, kind } => {
                let participant = self.participant_mut_or_insert(identity);
                participant.tracks.insert(*kind, true);
            }
            EngineEvent::TrackUnpublished { identity, kind } => {
                if let Some(p) = self.participants.iter_mut().find(|p| &p.identity == identity) {
                    p.tracks.remove(kind);
                }
            }
            EngineEvent::ConnectionQualityChanged { quality } => {
                if let Some(local) = self.participants.iter_mut().find(|p| p.is_local) {
                    local.connection_quality = *quality;
                }
            }
        }
    }

    /// A publish for an unseen identity still creates the participant, so an
    /// out-of-order join/publish pair cannot drop a track.
    fn participant_mut_or_insert(&mut self, identity: &str) -> &mut Participant {
        let index = match self.participants.iter().position(|p| p.identity == identity) {
            Some(index) => index,
            None => {
                self.participants.push(Participant::new(identity, false));
                self.participants.len() - 1
            }
        };
        &mut self.participants[index]
    }
}

fn set_track(participant: &mut Participant, kind: TrackKind, enabled: bool) {
    // Stopping a screen share unpublishes it; its slot disappears outright.
    // Camera and microphone stay published-but-disabled so the grid holds.
    if kind == TrackKind::ScreenShare && !enabled {
        participant.tracks.remove(&kind);
    } else {
        participant.tracks.insert(kind, enabled);
    }
}

/// Recompute the grid from scratch. Cameras first (live or placeholder, one
/// per participant), then screen shares, each in join order.
fn derive_slots(participants: &[Participant]) -> Vec<TrackSlot> {
    let mut slots = Vec::with_capacity(participants.len());

    for p in participants {
        if p.has_track(TrackKind::Camera) {
            slots.push(TrackSlot::Live {
                identity: p.identity.clone(),
                kind: TrackKind::Camera,
            });
        } else {
            slots.push(TrackSlot::Placeholder {
                identity: p.identity.clone(),
            });
        }
    }

    for p in participants {
        if p.has_track(TrackKind::ScreenShare) {
            slots.push(TrackSlot::Live {
                identity: p.identity.clone(),
                kind: TrackKind::ScreenShare,
            });
        }
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::super::engine::{ConnectionQuality, EngineEvent, TrackKind};
    use super::{ConnectionPhase, SessionEvent, SessionState, TrackSlot};

    fn engine(event: EngineEvent) -> SessionEvent {
        SessionEvent::Engine(event)
    }

    fn connected_with_remote(remote: &str) -> SessionState {
        SessionState::connecting("alice")
            .apply(&engine(EngineEvent::Connected))
            .apply(&engine(EngineEvent::ParticipantJoined {
                identity: remote.into(),
            }))
    }

    #[test]
    fn connecting_state_has_a_local_placeholder() {
        let state = SessionState::connecting("alice");

        assert_eq!(state.phase, ConnectionPhase::Connecting);
        assert_eq!(state.participants().len(), 1);
        assert!(state.local().is_some_and(|p| p.is_local));
        assert_eq!(
            state.slots(),
            &[TrackSlot::Placeholder {
                identity: "alice".into()
            }]
        );
    }

    #[test]
    fn cameras_order_before_screen_shares_in_join_order() {
        let state = connected_with_remote("bob")
            .apply(&engine(EngineEvent::TrackPublished {
                identity: "bob".into(),
                kind: TrackKind::ScreenShare,
            }))
            .apply(&engine(EngineEvent::TrackPublished {
                identity: "bob".into(),
                kind: TrackKind::Camera,
            }))
            .apply(&engine(EngineEvent::TrackPublished {
                identity: "alice".into(),
                kind: TrackKind::Camera,
            }));

        assert_eq!(
            state.slots(),
            &[
                TrackSlot::Live {
                    identity: "alice".into(),
                    kind: TrackKind::Camera
                },
                TrackSlot::Live {
                    identity: "bob".into(),
                    kind: TrackKind::Camera
                },
                TrackSlot::Live {
                    identity: "bob".into(),
                    kind: TrackKind::ScreenShare
                },
            ]
        );
    }

    #[test]
    fn quality_change_does_not_reorder_or_resize_the_grid() {
        let state = connected_with_remote("bob")
            .apply(&engine(EngineEvent::TrackPublished {
                identity: "alice".into(),
                kind: TrackKind::Camera,
            }))
            .apply(&engine(EngineEvent::TrackPublished {
                identity: "bob".into(),
                kind: TrackKind::Camera,
            }));
        let slots_before = state.slots().to_vec();
        assert_eq!(slots_before.len(), 2);

        let state = state.apply(&engine(EngineEvent::ConnectionQualityChanged {
            quality: ConnectionQuality::Poor,
        }));

        assert_eq!(state.slots(), slots_before.as_slice());
        assert_eq!(
            state.local().map(|p| p.connection_quality),
            Some(ConnectionQuality::Poor)
        );
    }

    #[test]
    fn quality_updates_touch_only_the_local_participant() {
        let state = connected_with_remote("bob").apply(&engine(
            EngineEvent::ConnectionQualityChanged {
                quality: ConnectionQuality::Excellent,
            },
        ));

        assert_eq!(
            state.participant("bob").map(|p| p.connection_quality),
            Some(ConnectionQuality::Unknown)
        );
    }

    #[test]
    fn leaving_removes_exactly_that_participants_slots() {
        let state = connected_with_remote("bob")
            .apply(&engine(EngineEvent::ParticipantJoined {
                identity: "carol".into(),
            }))
            .apply(&engine(EngineEvent::TrackPublished {
                identity: "bob".into(),
                kind: TrackKind::Camera,
            }))
            .apply(&engine(EngineEvent::TrackPublished {
                identity: "bob".into(),
                kind: TrackKind::ScreenShare,
            }))
            .apply(&engine(EngineEvent::TrackPublished {
                identity: "carol".into(),
                kind: TrackKind::Camera,
            }))
            .apply(&engine(EngineEvent::ParticipantLeft {
                identity: "bob".into(),
            }));

        assert!(state.slots().iter().all(|slot| slot.identity() != "bob"));
        assert!(state.slots().iter().any(|slot| slot.identity() == "carol"));
        assert_eq!(state.participants().len(), 2);
    }

    #[test]
    fn unpublished_camera_becomes_a_placeholder_not_a_gap() {
        let state = connected_with_remote("bob")
            .apply(&engine(EngineEvent::TrackPublished {
                identity: "bob".into(),
                kind: TrackKind::Camera,
            }))
            .apply(&engine(EngineEvent::TrackUnpublished {
                identity: "bob".into(),
                kind: TrackKind::Camera,
            }));

        assert_eq!(state.slots().len(), 2);
        assert_eq!(
            state.slots()[1],
            TrackSlot::Placeholder {
                identity: "bob".into()
            }
        );
    }

    #[test]
    fn unpublished_screen_share_slot_disappears() {
        let state = connected_with_remote("bob")
            .apply(&engine(EngineEvent::TrackPublished {
                identity: "bob".into(),
                kind: TrackKind::ScreenShare,
            }))
            .apply(&engine(EngineEvent::TrackUnpublished {
                identity: "bob".into(),
                kind: TrackKind::ScreenShare,
            }));

        // two camera placeholders, no screen-share slot
        assert_eq!(state.slots().len(), 2);
        assert!(state
            .slots()
            .iter()
            .all(|slot| matches!(slot, TrackSlot::Placeholder { .. })));
    }

    #[test]
    fn publish_before_join_still_creates_the_participant() {
        let state = SessionState::connecting("alice")
            .apply(&engine(EngineEvent::Connected))
            .apply(&engine(EngineEvent::TrackPublished {
                identity: "bob".into(),
                kind: TrackKind::Camera,
            }));

        assert!(state.participant("bob").is_some());
        assert_eq!(state.slots().len(), 2);
    }

    #[test]
    fn remote_track_event_without_published_track_is_a_noop() {
        let before = connected_with_remote("bob");
        let after = before.clone().apply(&SessionEvent::RemoteTrack {
            identity: "bob".into(),
            kind: TrackKind::Camera,
            enabled: false,
        });

        assert_eq!(before, after);
    }

    #[test]
    fn remote_track_event_flips_an_existing_track() {
        let state = connected_with_remote("bob")
            .apply(&engine(EngineEvent::TrackPublished {
                identity: "bob".into(),
                kind: TrackKind::Microphone,
            }))
            .apply(&SessionEvent::RemoteTrack {
                identity: "bob".into(),
                kind: TrackKind::Microphone,
                enabled: false,
            });

        let bob = state.participant("bob").expect("bob");
        assert!(bob.has_track(TrackKind::Microphone));
        assert!(!bob.microphone_enabled());
    }

    #[test]
    fn local_left_event_does_not_remove_the_local_participant() {
        let state = connected_with_remote("bob").apply(&engine(EngineEvent::ParticipantLeft {
            identity: "alice".into(),
        }));

        assert!(state.local().is_some());
    }

    #[test]
    fn disconnected_is_terminal() {
        let state = connected_with_remote("bob")
            .apply(&engine(EngineEvent::Disconnected))
            .apply(&engine(EngineEvent::ParticipantJoined {
                identity: "carol".into(),
            }))
            .apply(&engine(EngineEvent::Connected));

        assert_eq!(state.phase, ConnectionPhase::Disconnected);
        assert!(state.participant("carol").is_none());
    }

    #[test]
    fn panel_toggle_flips_and_flips_back() {
        let state = SessionState::connecting("alice");
        assert!(!state.show_participant_panel);

        let state = state.apply(&SessionEvent::PanelToggled);
        assert!(state.show_participant_panel);

        let state = state.apply(&SessionEvent::PanelToggled);
        assert!(!state.show_participant_panel);
    }

    #[test]
    fn local_toggle_effects_update_flags() {
        let state = SessionState::connecting("alice")
            .apply(&engine(EngineEvent::Connected))
            .apply(&SessionEvent::LocalTrack {
                kind: TrackKind::Microphone,
                enabled: true,
            })
            .apply(&SessionEvent::LocalTrack {
                kind: TrackKind::Camera,
                enabled: true,
            });

        let local = state.local().expect("local");
        assert!(local.microphone_enabled());
        assert!(local.camera_enabled());
        assert_eq!(
            state.slots(),
            &[TrackSlot::Live {
                identity: "alice".into(),
                kind: TrackKind::Camera
            }]
        );
    }
}
