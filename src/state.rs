use crate::relay::registry::Registry;
use crate::relay::DispatchSender;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Live WebSocket connections eligible for broadcast
    pub registry: Registry,
    /// Sender half of the dispatch queue feeding the broadcaster
    pub dispatch_tx: DispatchSender,
    /// Directory served for static client assets
    pub assets_dir: String,
}
