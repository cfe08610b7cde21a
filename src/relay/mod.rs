pub mod broadcaster;
pub mod error;
pub mod registry;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use crate::message::ChatMessage;

/// Type alias for the sender half of a WebSocket connection's channel.
/// The broadcaster clones this to push frames to a specific client; the
/// per-connection writer task owns the receiving half.
pub type ConnectionSender = mpsc::UnboundedSender<axum::extract::ws::Message>;

/// Sender half of the dispatch queue. Every connection actor pushes decoded
/// messages here; the single broadcaster task drains the other end in FIFO
/// order.
pub type DispatchSender = mpsc::UnboundedSender<ChatMessage>;

/// Receiver half of the dispatch queue, owned by the broadcaster.
pub type DispatchReceiver = mpsc::UnboundedReceiver<ChatMessage>;

/// Create the dispatch queue connecting connection actors to the broadcaster.
pub fn new_dispatch_queue() -> (DispatchSender, DispatchReceiver) {
    mpsc::unbounded_channel()
}

/// Process-unique identity for one established connection.
/// Registry key and log correlation id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocate the next connection id from a process-wide counter.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
