//! sdb Server
//!
//! JSON-RPC server that gives a simulator front end expression evaluation and
//! watchpoints. Communicates via stdin/stdout for easy subprocess management.

use std::io::{self, BufRead, Write};
use anyhow::{Context, Result};
use tracing::{info, error, debug};
use sdb_core::config::{SessionConfig, CONFIG_ENV};
use sdb_core::protocol::RpcMessage;
use sdb_core::{Request, Response};

mod handler;

/// Config path from the first argument, else from the environment
fn load_config() -> Result<SessionConfig> {
    let path = std::env::args().nth(1).or_else(|| std::env::var(CONFIG_ENV).ok());
    match path {
        Some(path) => {
            info!("Loading config from {}", path);
            SessionConfig::from_file(&path).context("Cannot start sdb-server")
        }
        None => Ok(SessionConfig::default()),
    }
}

fn main() -> Result<()> {
    // Initialize logging to stderr (stdout is for JSON-RPC)
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .init();

    info!("sdb-server starting...");

    let config = load_config()?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let mut handler = handler::Handler::new(config);

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to read line: {}", e);
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        debug!("Received: {}", line);

        let (response, shutdown) = match serde_json::from_str::<RpcMessage<Request>>(&line) {
            Ok(msg) => {
                let shutdown = matches!(msg.content, Request::Shutdown);
                let result = handler.handle(&msg.content);
                (RpcMessage::new(msg.id.unwrap_or(0), result), shutdown)
            }
            Err(e) => {
                (RpcMessage::new(0, Response::failure("parse", format!("Parse error: {}", e))), false)
            }
        };

        let response_json = serde_json::to_string(&response)?;
        debug!("Sending: {}", response_json);
        writeln!(stdout, "{}", response_json)?;
        stdout.flush()?;

        if shutdown {
            break;
        }
    }

    info!("sdb-server shutting down");
    Ok(())
}
