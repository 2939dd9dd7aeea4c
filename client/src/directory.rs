//! Directory Client
//!
//! Keeps one persistent WebSocket open to the room directory, decodes
//! snapshots, and publishes the display-filtered room list. Single attempt
//! per instance: any transport failure surfaces as `Unavailable` and the
//! caller decides whether to construct a new client.

use futures::{SinkExt, StreamExt};
use sr_common::{DirectoryMessage, RoomSummary};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

/// Updates published to the join screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEvent {
    /// Filtered room list (zero-participant rooms dropped), snapshot order.
    Rooms(Vec<RoomSummary>),
    /// The connection failed or closed; the room picker should go inert.
    Unavailable,
}

/// Errors opening the directory connection.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Could not reach the directory endpoint.
    #[error("Failed to connect to directory: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Handle for one directory connection.
pub struct DirectoryClient {
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl DirectoryClient {
    /// Open the connection and start publishing filtered room lists.
    pub async fn connect(
        server_url: &str,
    ) -> Result<(Self, mpsc::Receiver<DirectoryEvent>), DirectoryError> {
        let ws_url = build_ws_url(server_url);
        info!(url = %ws_url, "Connecting to room directory");

        let (ws_stream, _) = connect_async(&ws_url).await?;

        let (event_tx, event_rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        tokio::spawn(read_loop(ws_stream, event_tx, shutdown_rx));

        Ok((
            Self {
                shutdown_tx: Some(shutdown_tx),
            },
            event_rx,
        ))
    }

    /// Release the transport. Idempotent.
    pub async fn close(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
    }
}

/// Decode frames until the socket dies or the client is closed.
async fn read_loop(
    ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    tx: mpsc::Sender<DirectoryEvent>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(rooms) = decode_rooms(text.as_str()) {
                            let active: Vec<RoomSummary> = rooms
                                .into_iter()
                                .filter(|room| room.participant_count > 0)
                                .collect();
                            if tx.send(DirectoryEvent::Rooms(active)).await.is_err() {
                                return;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = write.send(Message::Pong(data)).await {
                            warn!(error = %e, "Failed to send pong");
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Directory connection closed");
                        let _ = tx.send(DirectoryEvent::Unavailable).await;
                        return;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Directory WebSocket error");
                        let _ = tx.send(DirectoryEvent::Unavailable).await;
                        return;
                    }
                    Some(Ok(_)) => {} // Ignore other frame types
                }
            }

            _ = shutdown_rx.recv() => {
                debug!("Directory client closed by caller");
                let _ = write.send(Message::Close(None)).await;
                return;
            }
        }
    }
}

/// Decode a `rooms` frame; anything else is ignored.
fn decode_rooms(text: &str) -> Option<Vec<RoomSummary>> {
    match serde_json::from_str::<DirectoryMessage>(text) {
        Ok(DirectoryMessage::Rooms { rooms }) => Some(rooms),
        Err(e) => {
            debug!(error = %e, "Ignoring unrecognized directory frame");
            None
        }
    }
}

/// Build the WebSocket URL from the server base URL.
fn build_ws_url(server_url: &str) -> String {
    let base = server_url
        .replace("http://", "ws://")
        .replace("https://", "wss://");
    format!("{}/ws", base.trim_end_matches('/'))
}

/// The join screen's room choice, kept consistent with the live list.
///
/// No selection means the next join hosts a fresh room.
#[derive(Debug, Clone, Default)]
pub struct RoomSelection {
    rooms: Vec<RoomSummary>,
    selected: Option<String>,
}

impl RoomSelection {
    /// Rooms currently offered by the picker.
    #[must_use]
    pub fn rooms(&self) -> &[RoomSummary] {
        &self.rooms
    }

    /// The selected room id, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Whether the next join will host a new room.
    #[must_use]
    pub const fn is_hosting(&self) -> bool {
        self.selected.is_none()
    }

    /// Pick a room from the list; `None` switches back to hosting.
    pub fn select(&mut self, room_id: Option<String>) {
        self.selected = room_id.filter(|id| !id.is_empty());
    }

    /// Replace the list with a new filtered snapshot.
    ///
    /// A selection that vanished from the list (room emptied or closed)
    /// resets to "no room chosen".
    pub fn apply(&mut self, rooms: Vec<RoomSummary>) {
        if let Some(selected) = &self.selected {
            if !rooms.iter().any(|room| &room.room_id == selected) {
                self.selected = None;
            }
        }
        self.rooms = rooms;
    }
}
