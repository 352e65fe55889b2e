//! Error types for the chat server
//!
//! Defines listener errors, per-connection send errors and client errors.
//! Uses thiserror for ergonomic error definitions.

use std::io;

use thiserror::Error;

/// Listener-level errors
///
/// All of these are fatal to the accept loop. Per-connection transport
/// failures never surface here; handlers recover from those locally.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Host/port could not be resolved
    #[error("Failed to resolve {addr}: {source}")]
    Resolve {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Resolution succeeded but yielded nothing to bind to
    #[error("No address found for {0}")]
    NoAddress(String),

    /// Socket creation, bind or listen failed (e.g. address in use)
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// accept() failed; the accept loop is terminated
    #[error("Failed to accept connection: {0}")]
    Accept(#[source] io::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Message send errors
///
/// Occurs when writing a message to a connection.
#[derive(Debug, Error)]
pub enum SendError {
    /// The connection has already been closed
    #[error("Connection closed")]
    Closed,

    /// The underlying socket write failed
    #[error("Write failed: {0}")]
    Io(#[from] io::Error),
}

/// Chat client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not reach the server
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// IO error on an established connection
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
