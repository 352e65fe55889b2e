//! Server and client configuration
//!
//! Both structs double as `clap` argument groups so the binary can expose
//! them as subcommand flags, and implement `Default` for library use.

use std::path::PathBuf;

use clap::Args;

use crate::message::DEFAULT_CHUNK_SIZE;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
/// Pending-connection queue depth passed to listen()
pub const DEFAULT_BACKLOG: u32 = 5;

/// Listener configuration
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Host or IP address to bind
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// TCP port to bind (0 picks an ephemeral port)
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Accept backlog
    #[arg(long, default_value_t = DEFAULT_BACKLOG)]
    pub backlog: u32,

    /// Maximum bytes read from a client per message
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, value_parser = parse_chunk_size)]
    pub chunk_size: usize,

    /// Log file mirrored alongside console output
    #[arg(long, default_value = "server.log")]
    pub log_file: PathBuf,
}

impl ServerConfig {
    /// `host:port` string for logs and errors
    pub fn addr(&self) -> String {
        display_addr(&self.host, self.port)
    }

    /// Resolvable `(host, port)` pair; unlike `addr()` this accepts IPv6 literals
    pub fn target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backlog: DEFAULT_BACKLOG,
            chunk_size: DEFAULT_CHUNK_SIZE,
            log_file: PathBuf::from("server.log"),
        }
    }
}

/// Chat client configuration
#[derive(Debug, Clone, Args)]
pub struct ClientConfig {
    /// Server host
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Server port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Maximum bytes read from the server per message
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, value_parser = parse_chunk_size)]
    pub chunk_size: usize,

    /// Log file mirrored alongside console output
    #[arg(long, default_value = "client.log")]
    pub log_file: PathBuf,
}

impl ClientConfig {
    pub fn addr(&self) -> String {
        display_addr(&self.host, self.port)
    }

    pub fn target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            log_file: PathBuf::from("client.log"),
        }
    }
}

fn display_addr(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// A zero-sized read buffer would look like EOF on every read
fn parse_chunk_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("chunk size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.backlog, 5);
        assert_eq!(config.chunk_size, 1024);
    }

    #[test]
    fn test_client_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.log_file, PathBuf::from("client.log"));
    }

    #[tokio::test]
    async fn test_ipv6_literal_host_resolves() {
        let config = ServerConfig {
            host: "::1".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(config.addr(), "[::1]:8080");

        let resolved: Vec<_> = tokio::net::lookup_host(config.target())
            .await
            .unwrap()
            .collect();
        assert_eq!(resolved, vec!["[::1]:8080".parse::<std::net::SocketAddr>().unwrap()]);
    }

    #[test]
    fn test_parse_chunk_size_rejects_zero() {
        assert!(parse_chunk_size("0").is_err());
        assert!(parse_chunk_size("abc").is_err());
        assert_eq!(parse_chunk_size("512"), Ok(512));
    }
}
