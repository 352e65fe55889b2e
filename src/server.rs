//! Chat server listener
//!
//! Binds the listening socket, owns the connection registry and spawns one
//! handler task per accepted connection. Handlers are fire-and-forget: their
//! own lifecycle governs cleanup, the listener never waits on them.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{lookup_host, TcpListener, TcpSocket, TcpStream};
use tokio::sync::Notify;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::connection::Connection;
use crate::error::ServerError;
use crate::handler::handle_connection;
use crate::registry::Registry;

/// Stops a running `ChatServer` from another task
///
/// Stopping closes the listening socket only; connections that were already
/// accepted keep running until their peers leave.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    notify: Arc<Notify>,
}

impl ShutdownHandle {
    /// Ask the accept loop to exit. Safe to call before `run()` starts.
    pub fn stop(&self) {
        self.notify.notify_one();
    }
}

/// The listening side of the chat server
pub struct ChatServer {
    listener: TcpListener,
    registry: Registry,
    config: ServerConfig,
    shutdown: Arc<Notify>,
}

impl ChatServer {
    /// Bind and listen on `config.host:config.port` with `config.backlog`
    ///
    /// Fails with `ServerError::Bind` if the address is already in use.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let addr = config.addr();

        let resolved = lookup_host(config.target())
            .await
            .map_err(|source| ServerError::Resolve {
                addr: addr.clone(),
                source,
            })?
            .next()
            .ok_or_else(|| ServerError::NoAddress(addr.clone()))?;

        let listener = listen(resolved, config.backlog)
            .map_err(|source| ServerError::Bind { addr, source })?;

        info!("Server started on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            registry: Registry::new(),
            config,
            shutdown: Arc::new(Notify::new()),
        })
    }

    /// Bind, then accept until stopped or an accept error occurs
    ///
    /// Every error is logged before it is returned.
    pub async fn start(config: ServerConfig) -> Result<(), ServerError> {
        let server = match Self::bind(config).await {
            Ok(server) => server,
            Err(e) => {
                error!("Error: {}", e);
                return Err(e);
            }
        };
        server.run().await
    }

    /// Actual bound address (useful when binding port 0)
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle onto the shared registry of live connections
    pub fn registry(&self) -> Registry {
        self.registry.clone()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            notify: self.shutdown.clone(),
        }
    }

    /// Run the accept loop
    ///
    /// Returns `Ok(())` after `ShutdownHandle::stop`, or the accept error that
    /// ended the loop. Either way the listening socket is closed on return.
    pub async fn run(self) -> Result<(), ServerError> {
        let result = self.accept_loop().await;
        self.stop();
        result
    }

    async fn accept_loop(&self) -> Result<(), ServerError> {
        loop {
            let accepted = tokio::select! {
                accepted = self.listener.accept() => accepted,
                _ = self.shutdown.notified() => return Ok(()),
            };

            match accepted {
                Ok((stream, peer_addr)) => self.spawn_handler(stream, peer_addr),
                Err(e) => {
                    error!("Error: {}", e);
                    return Err(ServerError::Accept(e));
                }
            }
        }
    }

    /// Register the connection, then launch its handler
    ///
    /// Registration comes first so the new peer can receive broadcasts
    /// before it has sent anything.
    fn spawn_handler(&self, stream: TcpStream, peer_addr: SocketAddr) {
        let (reader, writer) = stream.into_split();
        let connection = Arc::new(Connection::new(peer_addr, writer));

        self.registry.add(connection.clone());
        info!("New connection from {} ({})", peer_addr, connection.id());

        tokio::spawn(handle_connection(
            connection,
            reader,
            self.registry.clone(),
            self.config.chunk_size,
        ));
    }

    fn stop(self) {
        info!("Shutting down server...");
        drop(self.listener);
    }
}

/// Create the listening socket without SO_REUSEADDR so a second server on
/// the same address fails instead of silently sharing it
fn listen(addr: SocketAddr, backlog: u32) -> io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.bind(addr)?;
    socket.listen(backlog)
}
