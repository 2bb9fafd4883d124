use minesweeper_common::protocol::Command;
use minesweeper_host::{HostConfig, runtime};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // stdout carries the JSON message stream
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = HostConfig::from_env();
    info!(
        "Starting {} game, {:?} per tick",
        config.difficulty, config.tick_interval
    );

    let (handle, mut messages) = runtime::spawn(&config)?;

    let printer = tokio::spawn(async move {
        let mut stdout = io::stdout();
        while let Some(message) = messages.recv().await {
            let mut line = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    warn!("Failed to serialize message: {}", e);
                    continue;
                }
            };
            line.push('\n');

            if stdout.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Command>(line) {
            Ok(command) => handle.send(command)?,
            Err(e) => warn!("Ignoring unparsable command {:?}: {}", line, e),
        }
    }

    info!("Input closed, shutting down");
    handle.shutdown().await;
    let _ = printer.await;

    Ok(())
}
