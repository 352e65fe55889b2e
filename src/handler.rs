//! Per-connection handler
//!
//! Owns the read loop of exactly one connection for its whole lifetime:
//! every chunk read is broadcast to the other peers, and whichever way the
//! loop ends (EOF, read error, closed by a broadcaster, panic) the same
//! cleanup runs exactly once.

use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;
use tracing::{debug, error, info};

use crate::broadcast::broadcast;
use crate::connection::Connection;
use crate::message::Message;
use crate::registry::Registry;

/// Why the read loop stopped without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    /// Peer closed its side (read returned 0)
    PeerClosed,
    /// Connection was closed from the server side
    Closed,
}

/// Handle an accepted connection until it disconnects
///
/// The read loop runs in its own task so that a panic inside it is caught
/// here and turned into an ordinary disconnect.
pub async fn handle_connection(
    connection: Arc<Connection>,
    reader: OwnedReadHalf,
    registry: Registry,
    chunk_size: usize,
) {
    let id = connection.id();

    let read_task = tokio::spawn(read_loop(
        connection.clone(),
        reader,
        registry.clone(),
        chunk_size,
    ));

    match read_task.await {
        Ok(Ok(LoopExit::PeerClosed)) => debug!("Client {} closed the connection", id),
        Ok(Ok(LoopExit::Closed)) => debug!("Client {} was closed by the server", id),
        Ok(Err(e)) => error!("Client error: {}: {}", id, e),
        Err(e) if e.is_panic() => error!("Handler for {} panicked", id),
        Err(e) => error!("Handler for {} was cancelled: {}", id, e),
    }

    // Cleanup
    registry.remove(id);
    connection.close().await;
    info!("Client {} disconnected", id);
}

/// Read chunks and broadcast them until EOF, error or close
async fn read_loop(
    connection: Arc<Connection>,
    mut reader: OwnedReadHalf,
    registry: Registry,
    chunk_size: usize,
) -> std::io::Result<LoopExit> {
    let id = connection.id();
    let mut buf = vec![0u8; chunk_size];

    loop {
        let n = tokio::select! {
            result = reader.read(&mut buf) => result?,
            _ = connection.closed() => return Ok(LoopExit::Closed),
        };

        if n == 0 {
            return Ok(LoopExit::PeerClosed);
        }

        let message = Message::from(&buf[..n]);
        info!("Received from {}: {}", id, message);

        // Awaited before the next read so one client's messages keep their order
        broadcast(&message, id, &registry).await;
    }
}
