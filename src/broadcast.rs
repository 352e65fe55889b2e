//! Fan-out of one message to every other live connection
//!
//! Delivery is best effort, immediate and at most once. A peer whose write
//! fails is closed and deregistered; the remaining peers still receive the
//! message and the sender is never told.

use tracing::{debug, error};

use crate::message::Message;
use crate::registry::Registry;
use crate::types::ConnectionId;

/// Outcome of a single broadcast, for logging and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Peers the message was written to
    pub delivered: usize,
    /// Peers that failed and were dropped
    pub failed: usize,
}

/// Write `message` to every connection in `registry` except `sender`
pub async fn broadcast(
    message: &Message,
    sender: ConnectionId,
    registry: &Registry,
) -> BroadcastReport {
    let mut report = BroadcastReport::default();

    for peer in registry.snapshot() {
        if peer.id() == sender {
            continue;
        }

        match peer.send(message).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                error!("Error sending message to {}: {}", peer.id(), e);
                peer.close().await;
                registry.remove(peer.id());
                report.failed += 1;
            }
        }
    }

    debug!(
        "Broadcast from {}: delivered={}, failed={}",
        sender, report.delivered, report.failed
    );
    report
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::AsyncReadExt;
    use tokio::net::TcpStream;

    use super::*;
    use crate::connection::test_support::{accepted_connection, reset_peer};

    async fn read_chunk(peer: &mut TcpStream) -> Vec<u8> {
        let mut buf = [0u8; 64];
        let n = tokio::time::timeout(Duration::from_secs(1), peer.read(&mut buf))
            .await
            .expect("timed out waiting for broadcast")
            .unwrap();
        buf[..n].to_vec()
    }

    #[tokio::test]
    async fn test_sender_is_skipped() {
        let registry = Registry::new();
        let (a, _ra, mut peer_a) = accepted_connection().await;
        let (b, _rb, mut peer_b) = accepted_connection().await;
        registry.add(a.clone());
        registry.add(b.clone());

        let report = broadcast(&Message::from("hello"), a.id(), &registry).await;

        assert_eq!(report, BroadcastReport { delivered: 1, failed: 0 });
        assert_eq!(read_chunk(&mut peer_b).await, b"hello");

        let mut buf = [0u8; 8];
        let nothing =
            tokio::time::timeout(Duration::from_millis(100), peer_a.read(&mut buf)).await;
        assert!(nothing.is_err(), "sender must not receive its own message");
    }

    #[tokio::test]
    async fn test_failed_peer_removed_others_still_delivered() {
        let registry = Registry::new();
        let (sender, _rs, _ps) = accepted_connection().await;
        let (broken, _rb, _pb) = accepted_connection().await;
        let (ok1, _r1, mut peer1) = accepted_connection().await;
        let (ok2, _r2, mut peer2) = accepted_connection().await;
        for conn in [&sender, &broken, &ok1, &ok2] {
            registry.add(conn.clone());
        }

        // A closed connection refuses every write
        broken.close().await;

        let report = broadcast(&Message::from("ping"), sender.id(), &registry).await;

        assert_eq!(report, BroadcastReport { delivered: 2, failed: 1 });
        assert!(!registry.contains(broken.id()));
        assert_eq!(registry.len(), 3);
        assert_eq!(read_chunk(&mut peer1).await, b"ping");
        assert_eq!(read_chunk(&mut peer2).await, b"ping");
    }

    #[tokio::test]
    async fn test_write_failure_to_reset_peer_removes_it() {
        let registry = Registry::new();
        let (sender, _rs, _ps) = accepted_connection().await;
        let (broken, _rb, broken_peer) = accepted_connection().await;
        let (ok, _ro, mut ok_peer) = accepted_connection().await;
        for conn in [&sender, &broken, &ok] {
            registry.add(conn.clone());
        }

        reset_peer(broken_peer);
        assert!(!broken.is_closed());

        // The RST may land after a write or two; keep going until one fails
        let mut report = BroadcastReport::default();
        for _ in 0..100 {
            report = broadcast(&Message::from("ping"), sender.id(), &registry).await;
            if report.failed > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(report, BroadcastReport { delivered: 1, failed: 1 });
        assert!(broken.is_closed());
        assert!(!registry.contains(broken.id()));
        assert!(registry.contains(ok.id()));
        assert!(read_chunk(&mut ok_peer).await.starts_with(b"ping"));
    }

    #[tokio::test]
    async fn test_broadcast_to_empty_registry() {
        let registry = Registry::new();
        let report = broadcast(&Message::from("x"), ConnectionId::new(), &registry).await;
        assert_eq!(report, BroadcastReport::default());
    }
}
