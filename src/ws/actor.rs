use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::message::ChatMessage;
use crate::relay::error::RelayError;
use crate::relay::ConnectionId;
use crate::state::AppState;

/// Run the actor-per-connection pattern for an established WebSocket.
///
/// Splits the WebSocket into reader and writer halves:
/// - Writer task: owns the sink, forwards frames from an mpsc channel
/// - Reader loop (the ingress loop): decodes incoming chat messages and
///   pushes them onto the dispatch queue
///
/// The mpsc sender is what the broadcaster holds via the registry; it
/// outlives the socket, so a broadcast racing this connection's teardown
/// observes a closed channel rather than a half-dead socket.
pub async fn run_connection(socket: WebSocket, state: AppState) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    let id = ConnectionId::next();
    state.registry.register(id, tx.clone());

    tracing::info!(connection = %id, "connection actor started");

    // Spawn writer task: forwards mpsc frames to the WebSocket sink
    let writer_handle = tokio::spawn(writer_task(ws_sender, rx));

    // Ingress loop: every decoded message goes onto the dispatch queue;
    // the first read failure (transport or decode) is terminal.
    loop {
        match ws_receiver.next().await {
            Some(Ok(msg)) => match msg {
                Message::Text(text) => {
                    if !ingest(&state, id, text.as_bytes()) {
                        break;
                    }
                }
                Message::Binary(data) => {
                    // Clients are expected to send text frames, but a JSON
                    // body in a binary frame decodes the same way.
                    if !ingest(&state, id, &data) {
                        break;
                    }
                }
                Message::Ping(data) => {
                    let _ = tx.send(Message::Pong(data));
                }
                Message::Pong(_) => {}
                Message::Close(frame) => {
                    tracing::info!(connection = %id, reason = ?frame, "client initiated close");
                    break;
                }
            },
            Some(Err(e)) => {
                let err = RelayError::receive(e);
                tracing::warn!(connection = %id, error = %err, "terminating connection");
                break;
            }
            None => {
                // Stream ended — client disconnected
                tracing::info!(connection = %id, "stream ended");
                break;
            }
        }
    }

    // Cleanup: stop the writer and remove this connection from the registry.
    // Deregistration is idempotent, so losing the race against a
    // broadcaster-detected send failure is harmless.
    writer_handle.abort();
    state.registry.deregister(id);

    tracing::info!(connection = %id, "connection actor stopped");
}

/// Decode one inbound payload and push it onto the dispatch queue.
/// Returns false when the connection must be torn down.
fn ingest(state: &AppState, id: ConnectionId, payload: &[u8]) -> bool {
    let msg: ChatMessage = match serde_json::from_slice(payload) {
        Ok(msg) => msg,
        Err(e) => {
            let err = RelayError::receive(e);
            tracing::warn!(connection = %id, error = %err, "terminating connection");
            return false;
        }
    };

    tracing::debug!(connection = %id, username = %msg.username, "message queued");

    // Only fails if the broadcaster is gone, i.e. the process is tearing down.
    state.dispatch_tx.send(msg).is_ok()
}

/// Writer task: receives frames from the mpsc channel and forwards them to
/// the WebSocket sink.
async fn writer_task(
    mut ws_sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if ws_sender.send(msg).await.is_err() {
            // WebSocket send failed — connection is broken
            break;
        }
    }
}
