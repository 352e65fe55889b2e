//! Multi-client TCP Chat Relay Library
//!
//! A small chat server that relays whatever one client sends to every other
//! connected client, plus the matching line-oriented client.
//!
//! # Features
//! - Unbounded concurrent TCP connections, one handler task each
//! - Raw chunk relay: no handshake, no framing, no usernames
//! - Failed peers are closed and dropped without disturbing the others
//! - Console + file logging via `tracing`
//!
//! # Architecture
//! - `ChatServer` accepts connections and owns the shared `Registry`
//! - `handle_connection` runs one connection's read loop under supervision
//! - `broadcast` fans a message out over a snapshot of the registry
//! - The registry is a mutex-guarded list; the lock is never held across
//!   an await, so broadcasts see a stable copy while others add/remove
//!
//! # Example
//! ```ignore
//! use chat_relay::{ChatServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = ChatServer::bind(ServerConfig::default()).await.unwrap();
//!     let shutdown = server.shutdown_handle();
//!
//!     tokio::spawn(async move {
//!         tokio::signal::ctrl_c().await.ok();
//!         shutdown.stop();
//!     });
//!
//!     server.run().await.unwrap();
//! }
//! ```

pub mod broadcast;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod logging;
pub mod message;
pub mod registry;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use broadcast::{broadcast, BroadcastReport};
pub use client::ChatClient;
pub use config::{ClientConfig, ServerConfig};
pub use connection::Connection;
pub use error::{ClientError, SendError, ServerError};
pub use handler::handle_connection;
pub use logging::init_logging;
pub use message::{Message, DEFAULT_CHUNK_SIZE};
pub use registry::Registry;
pub use server::{ChatServer, ShutdownHandle};
pub use types::ConnectionId;
