//! Directory WebSocket Handler
//!
//! Pushes full room snapshots to every connected client. The connection is
//! one-way for basic operation: no client frame is required, and anything the
//! client does send is ignored.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use sr_common::{DirectoryMessage, RoomSummary};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::api::AppState;

/// WebSocket upgrade handler for `GET /ws`.
pub async fn handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Push snapshots until the client goes away.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut updates = state.registry.subscribe();

    info!("Directory client connected");

    // A client joining mid-stream still needs current truth immediately.
    let initial = state.registry.snapshot().await;
    if send_snapshot(&mut sender, initial).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            update = updates.recv() => {
                let snapshot = match update {
                    Ok(snapshot) => snapshot,
                    Err(RecvError::Lagged(skipped)) => {
                        // Skipped generations are fine; resync from current state.
                        warn!(skipped, "Directory subscriber lagged, resyncing");
                        state.registry.snapshot().await
                    }
                    Err(RecvError::Closed) => break,
                };
                if send_snapshot(&mut sender, snapshot).await.is_err() {
                    break;
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(error = %e, "Directory WebSocket error");
                        break;
                    }
                    Some(Ok(other)) => {
                        debug!(?other, "Ignoring client frame");
                    }
                }
            }
        }
    }

    info!("Directory client disconnected");
}

/// Serialize and send one `rooms` frame. Best-effort, at-most-once.
async fn send_snapshot(
    sender: &mut SplitSink<WebSocket, Message>,
    rooms: Vec<RoomSummary>,
) -> Result<(), axum::Error> {
    let frame = DirectoryMessage::Rooms { rooms };
    let json = match serde_json::to_string(&frame) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Failed to serialize snapshot");
            return Ok(());
        }
    };
    sender.send(Message::Text(json.into())).await
}
