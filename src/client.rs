//! Line-oriented chat client
//!
//! Connects to the server, receives broadcast chunks in a background task and
//! sends each input line as one raw write (no newline, no framing).

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::message::Message;

/// A connected chat client
#[derive(Debug)]
pub struct ChatClient {
    stream: TcpStream,
    chunk_size: usize,
    /// Optional consumer of received chunks (besides the log)
    incoming: Option<mpsc::UnboundedSender<Message>>,
}

impl ChatClient {
    /// Connect to `config.host:config.port`
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(config.target())
            .await
            .map_err(|source| ClientError::Connect {
                addr: config.addr(),
                source,
            })?;

        info!("Connected to server");

        Ok(Self {
            stream,
            chunk_size: config.chunk_size,
            incoming: None,
        })
    }

    /// Receive every chunk broadcast to this client through a channel
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.incoming = Some(tx);
        rx
    }

    /// Send input lines until the input ends or the server goes away
    ///
    /// The socket is closed when this returns.
    pub async fn run<R>(self, input: R) -> Result<(), ClientError>
    where
        R: AsyncBufRead + Unpin,
    {
        let (reader, writer) = self.stream.into_split();
        let mut receive_task: JoinHandle<()> =
            tokio::spawn(receive_loop(reader, self.chunk_size, self.incoming));

        let result = send_loop(input, writer, &mut receive_task).await;

        receive_task.abort();
        if let Err(e) = &result {
            error!("Connection error: {}", e);
        }
        result
    }
}

async fn send_loop<R>(
    input: R,
    mut writer: OwnedWriteHalf,
    receive_task: &mut JoinHandle<()>,
) -> Result<(), ClientError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut *receive_task => {
                debug!("Receive loop ended, stopping input");
                return Ok(());
            }
        };

        let Some(line) = line else {
            break;
        };
        if line.is_empty() {
            continue;
        }
        writer.write_all(line.as_bytes()).await?;
    }

    writer.shutdown().await?;
    Ok(())
}

async fn receive_loop(
    mut reader: OwnedReadHalf,
    chunk_size: usize,
    incoming: Option<mpsc::UnboundedSender<Message>>,
) {
    let mut buf = vec![0u8; chunk_size];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                info!("Disconnected from server");
                break;
            }
            Ok(n) => {
                let message = Message::from(&buf[..n]);
                info!("Server: {}", message);
                if let Some(tx) = &incoming {
                    let _ = tx.send(message);
                }
            }
            Err(e) => {
                error!("Disconnected from server: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::BufReader;
    use tokio::net::TcpListener;

    use super::*;

    async fn local_listener() -> (TcpListener, ClientConfig) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ClientConfig {
            port: listener.local_addr().unwrap().port(),
            ..ClientConfig::default()
        };
        (listener, config)
    }

    #[tokio::test]
    async fn test_lines_sent_without_newlines() {
        let (listener, config) = local_listener().await;
        let client = ChatClient::connect(&config).await.unwrap();
        let (mut server_side, _) = listener.accept().await.unwrap();

        client.run(&b"hello\n\nworld\n"[..]).await.unwrap();

        let mut received = Vec::new();
        server_side.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"helloworld");
    }

    #[tokio::test]
    async fn test_incoming_chunks_are_forwarded() {
        let (listener, config) = local_listener().await;
        let mut client = ChatClient::connect(&config).await.unwrap();
        let mut incoming = client.subscribe();
        let (mut server_side, _) = listener.accept().await.unwrap();

        // Input that stays open until the test drops it
        let (_input_tx, input_rx) = tokio::io::duplex(64);
        let running = tokio::spawn(client.run(BufReader::new(input_rx)));

        server_side.write_all(b"hi there").await.unwrap();
        let msg = tokio::time::timeout(Duration::from_secs(2), incoming.recv())
            .await
            .expect("timed out")
            .unwrap();
        assert_eq!(msg.as_bytes(), b"hi there");

        // Server going away ends the client
        drop(server_side);
        tokio::time::timeout(Duration::from_secs(2), running)
            .await
            .expect("client did not stop")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let (listener, config) = local_listener().await;
        drop(listener);

        let result = ChatClient::connect(&config).await;
        assert!(matches!(result, Err(ClientError::Connect { .. })));
    }
}
