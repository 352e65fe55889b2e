//! Registry of live connections
//!
//! Shared by the listener (insert on accept), every handler (remove on its own
//! disconnect) and the broadcaster (remove on a failed peer write).
//! Fan-out iterates over a snapshot, so removals during a broadcast never
//! disturb the iteration.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::connection::Connection;
use crate::types::ConnectionId;

/// Ordered set of live connections
///
/// Cheap to clone; all clones share the same membership. The lock is only
/// held for plain `Vec` operations, never across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    connections: Arc<Mutex<Vec<Arc<Connection>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a connection
    ///
    /// Returns false (and leaves the registry untouched) if a connection with
    /// the same id is already present.
    pub fn add(&self, connection: Arc<Connection>) -> bool {
        let mut connections = self.lock();
        if connections.iter().any(|c| c.id() == connection.id()) {
            return false;
        }
        connections.push(connection);
        true
    }

    /// Remove a connection by id
    ///
    /// Returns the removed entry, or `None` if it was already gone. When
    /// several tasks race to remove the same id, exactly one gets `Some`.
    pub fn remove(&self, id: ConnectionId) -> Option<Arc<Connection>> {
        let mut connections = self.lock();
        let index = connections.iter().position(|c| c.id() == id)?;
        Some(connections.remove(index))
    }

    /// Copy of the current members, in insertion order
    pub fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.lock().clone()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.lock().iter().any(|c| c.id() == id)
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.lock().iter().map(|c| c.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic elsewhere cannot leave a Vec half-updated, so poisoning is ignored
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Connection>>> {
        self.connections.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
