use thiserror::Error;

/// Per-connection failure taxonomy. Every variant is handled at the point of
/// detection — logged and resolved by tearing down the single affected
/// connection — and never propagates to a caller or aborts the process.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The WebSocket handshake could not complete; only that connection
    /// attempt is abandoned.
    #[error("websocket upgrade failed: {0}")]
    UpgradeFailed(axum::Error),

    /// A registered connection's read errored or delivered a payload that is
    /// not a chat message. Decode and transport errors are treated uniformly:
    /// both are terminal for the connection.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// The broadcaster's write to one recipient failed; that recipient is
    /// deregistered and the broadcast pass continues.
    #[error("send failed: connection writer is gone")]
    SendFailed,
}

impl RelayError {
    pub fn receive(err: impl std::fmt::Display) -> Self {
        Self::ReceiveFailed(err.to_string())
    }
}
