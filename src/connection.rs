//! Connection struct definition
//!
//! Represents one accepted TCP socket. The read half belongs to the
//! connection's handler task; the write half lives here so any handler can
//! deliver broadcasts to it.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Mutex, Notify};
use tracing::debug;

use crate::error::SendError;
use crate::message::Message;
use crate::types::ConnectionId;

/// A live connection to one remote peer
///
/// Shared as `Arc<Connection>` between the registry, the owning handler and
/// any in-flight broadcast snapshot.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    peer_addr: SocketAddr,
    /// Serialises writes so concurrent broadcasts never interleave bytes
    writer: Mutex<OwnedWriteHalf>,
    closed: AtomicBool,
    close_notify: Notify,
}

impl Connection {
    /// Wrap the write half of a freshly accepted socket
    pub fn new(peer_addr: SocketAddr, writer: OwnedWriteHalf) -> Self {
        Self {
            id: ConnectionId::new(),
            peer_addr,
            writer: Mutex::new(writer),
            closed: AtomicBool::new(false),
            close_notify: Notify::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Write one message to the peer
    ///
    /// Returns an error if the connection was closed or the write failed.
    pub async fn send(&self, msg: &Message) -> Result<(), SendError> {
        if self.is_closed() {
            return Err(SendError::Closed);
        }

        let mut writer = self.writer.lock().await;
        // close() may have won the race while we waited for the lock
        if self.is_closed() {
            return Err(SendError::Closed);
        }
        writer.write_all(msg.as_bytes()).await?;
        Ok(())
    }

    /// Close the connection
    ///
    /// Wakes the owning handler and shuts down the write half. Only the first
    /// call does anything; it returns `true`, later calls return `false`.
    pub async fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.close_notify.notify_waiters();

        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            debug!("Shutdown of {} failed: {}", self.id, e);
        }
        true
    }

    /// Resolves once `close()` has been called, for every waiter
    pub async fn closed(&self) {
        let notified = self.close_notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent close() cannot
        // slip between the check and the wait
        notified.as_mut().enable();
        if self.is_closed() {
            return;
        }
        notified.await;
    }
}
