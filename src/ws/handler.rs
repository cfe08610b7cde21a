use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::Response,
};

use crate::relay::error::RelayError;
use crate::state::AppState;
use crate::ws::actor;

/// GET /ws
/// WebSocket upgrade endpoint. On success, spawns an actor for the
/// connection. A failed upgrade is logged and rejects only that request —
/// one bad handshake never affects other connections or the process.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_failed_upgrade(|e| {
        let err = RelayError::UpgradeFailed(e);
        tracing::warn!(error = %err, "connection attempt abandoned");
    })
    .on_upgrade(move |socket| actor::run_connection(socket, state))
}
