//! Connection identity
//!
//! Sockets are told apart by a random id assigned on accept. It never goes
//! on the wire and carries no user identity.

use std::fmt;

use uuid::Uuid;

/// Id of one accepted socket, used as the registry key and in log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

// Derived Default would hand out the nil UUID to every caller
impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_accept_gets_a_fresh_id() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
        assert_ne!(ConnectionId::default(), ConnectionId::default());
    }

    #[test]
    fn test_display_is_the_hyphenated_uuid() {
        let id = ConnectionId::new();
        assert_eq!(id.to_string(), id.as_uuid().hyphenated().to_string());
    }
}
