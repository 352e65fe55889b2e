//! Raw chunk messages
//!
//! The wire protocol has no framing: whatever a single read returns is one
//! message. Payloads are opaque bytes and only decoded (lossily) for logs.

use std::borrow::Cow;
use std::fmt;

/// Default maximum number of bytes taken from the socket per read
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// One received chunk, relayed as-is to other connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message(Vec<u8>);

impl Message {
    /// Create a message from raw bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text view for logging; invalid UTF-8 is replaced, never rejected
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl From<&[u8]> for Message {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_keeps_bytes_verbatim() {
        let msg = Message::from(&b"hello\r\n"[..]);
        assert_eq!(msg.as_bytes(), b"hello\r\n");
        assert_eq!(msg.len(), 7);
    }

    #[test]
    fn test_invalid_utf8_displays_lossily() {
        let msg = Message::new(vec![b'h', b'i', 0xff]);
        assert_eq!(msg.to_string(), "hi\u{fffd}");
    }
}
