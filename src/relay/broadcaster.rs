//! The single fan-out task: drains the dispatch queue in FIFO order and
//! writes each message to every registered connection.

use axum::extract::ws::Message;

use super::error::RelayError;
use super::registry::Registry;
use super::DispatchReceiver;
use crate::message::ChatMessage;

/// Run the broadcaster until the dispatch queue closes (all actor-held
/// senders dropped, which only happens at process teardown). The queue and
/// registry are injected so the fan-out core can be driven in isolation.
pub async fn run_broadcaster(mut queue: DispatchReceiver, registry: Registry) {
    while let Some(msg) = queue.recv().await {
        broadcast_to_all(&registry, &msg);
    }
    tracing::info!("dispatch queue closed, broadcaster stopping");
}

/// Deliver one message to every connection in the current registry snapshot,
/// including the author. A send failure prunes that one recipient and never
/// aborts delivery to the rest of the pass.
pub fn broadcast_to_all(registry: &Registry, msg: &ChatMessage) {
    let text = match serde_json::to_string(msg) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "failed to encode message, dropping");
            return;
        }
    };
    let frame = Message::Text(text.into());

    for (id, sender) in registry.snapshot() {
        // The sender outlives the socket: a connection mid-teardown fails
        // here as a plain send error rather than anything racier.
        if sender.send(frame.clone()).is_err() {
            let err = RelayError::SendFailed;
            tracing::warn!(connection = %id, error = %err, "dropping recipient");
            registry.deregister(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::{new_dispatch_queue, ConnectionId, ConnectionSender};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    fn msg(username: &str, text: &str) -> ChatMessage {
        ChatMessage {
            username: username.to_string(),
            text: text.to_string(),
        }
    }

    fn register_client(
        registry: &Registry,
    ) -> (
        ConnectionId,
        mpsc::UnboundedReceiver<axum::extract::ws::Message>,
    ) {
        let id = ConnectionId::next();
        let (tx, rx): (ConnectionSender, _) = mpsc::unbounded_channel();
        registry.register(id, tx);
        (id, rx)
    }

    fn decode(frame: axum::extract::ws::Message) -> ChatMessage {
        match frame {
            Message::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fan_out_reaches_every_registered_connection() {
        let registry = Registry::new();
        let (_a, mut rx_a) = register_client(&registry);
        let (_b, mut rx_b) = register_client(&registry);
        let (_c, mut rx_c) = register_client(&registry);

        let sent = msg("alice", "hi");
        broadcast_to_all(&registry, &sent);

        for rx in [&mut rx_a, &mut rx_b, &mut rx_c] {
            assert_eq!(decode(rx.recv().await.unwrap()), sent);
            // Exactly one copy each.
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn send_failure_prunes_only_the_failed_connection() {
        let registry = Registry::new();
        let (a, mut rx_a) = register_client(&registry);
        let (b, rx_b) = register_client(&registry);

        // Simulate B's writer dying: dropping the receiver closes the sender.
        drop(rx_b);

        let sent = msg("alice", "still here?");
        broadcast_to_all(&registry, &sent);

        assert_eq!(decode(rx_a.recv().await.unwrap()), sent);
        assert_eq!(registry.len(), 1);
        assert!(!registry.deregister(b), "b should already be deregistered");
        assert!(registry.snapshot().iter().any(|(id, _)| *id == a));

        // The pass after a failure keeps working.
        let next = msg("alice", "again");
        broadcast_to_all(&registry, &next);
        assert_eq!(decode(rx_a.recv().await.unwrap()), next);
    }

    #[tokio::test]
    async fn broadcaster_preserves_queue_order() {
        let registry = Registry::new();
        let (_a, mut rx_a) = register_client(&registry);
        let (queue_tx, queue_rx) = new_dispatch_queue();

        let task = tokio::spawn(run_broadcaster(queue_rx, registry));

        let m1 = msg("alice", "first");
        let m2 = msg("alice", "second");
        queue_tx.send(m1.clone()).unwrap();
        queue_tx.send(m2.clone()).unwrap();

        let first = timeout(Duration::from_secs(2), rx_a.recv())
            .await
            .expect("first message within timeout")
            .unwrap();
        let second = timeout(Duration::from_secs(2), rx_a.recv())
            .await
            .expect("second message within timeout")
            .unwrap();
        assert_eq!(decode(first), m1);
        assert_eq!(decode(second), m2);

        // Closing the queue stops the broadcaster.
        drop(queue_tx);
        timeout(Duration::from_secs(2), task)
            .await
            .expect("broadcaster exits when queue closes")
            .unwrap();
    }

    #[tokio::test]
    async fn empty_registry_broadcast_is_noop() {
        let registry = Registry::new();
        broadcast_to_all(&registry, &msg("alice", "anyone?"));
        assert!(registry.is_empty());
    }
}
