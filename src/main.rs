//! Chat relay - Entry Point
//!
//! Runs either the chat server or the line-oriented client. Without a
//! subcommand the operator is asked which one to start.

use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing::error;

use chat_relay::{init_logging, ChatClient, ChatServer, ClientConfig, ServerConfig};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the chat server
    Server(ServerConfig),
    /// Start a chat client reading messages from stdin
    Client(ClientConfig),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let command = match cli.command {
        Some(command) => command,
        None => match prompt_choice()? {
            Some(command) => command,
            None => {
                println!("Invalid choice");
                return Ok(());
            }
        },
    };

    match command {
        Command::Server(config) => {
            init_logging(Some(config.log_file.as_path()))?;
            // start() logs whatever ended it
            if ChatServer::start(config).await.is_err() {
                std::process::exit(1);
            }
        }
        Command::Client(config) => {
            init_logging(Some(config.log_file.as_path()))?;
            let client = match ChatClient::connect(&config).await {
                Ok(client) => client,
                Err(e) => {
                    error!("Connection error: {}", e);
                    std::process::exit(1);
                }
            };
            println!("Enter your message:");
            // run() logs its own failure
            if client.run(BufReader::new(tokio::io::stdin())).await.is_err() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Interactive menu used when no subcommand is given
fn prompt_choice() -> io::Result<Option<Command>> {
    println!("1. Start Server");
    println!("2. Start Client");
    println!("Enter your choice:");
    io::stdout().flush()?;

    let mut choice = String::new();
    io::stdin().lock().read_line(&mut choice)?;

    Ok(match choice.trim() {
        "1" => Some(Command::Server(ServerConfig::default())),
        "2" => Some(Command::Client(ClientConfig::default())),
        _ => None,
    })
}
