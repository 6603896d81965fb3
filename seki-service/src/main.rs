use seki_service::AppState;
use seki_service::config::Config;
use seki_service::notifier::{GameEvent, build_notifier};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::broadcast::{self, error::TryRecvError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seki_service=debug,go_engine=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        komi = config.rules.komi,
        default_board_size = config.default_board_size,
        notifier = %config.notifier,
        "Starting seki-service on stdin"
    );
    let (notifier, mut events) = build_notifier(&config);
    let state = AppState::new(config, notifier);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let reply = seki_service::driver::handle_line(&state, line).await;
        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        if let Some(rx) = events.as_mut() {
            write_events(rx, &mut stdout).await?;
        }
        stdout.flush().await?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

/// Write out every event raised since the last reply.
async fn write_events(
    rx: &mut broadcast::Receiver<GameEvent>,
    stdout: &mut Stdout,
) -> std::io::Result<()> {
    loop {
        match rx.try_recv() {
            Ok(event) => {
                let json = serde_json::to_string(&event)?;
                stdout.write_all(json.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
            }
            Err(TryRecvError::Lagged(missed)) => {
                tracing::warn!(missed, "event buffer overflowed, oldest events dropped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
        }
    }
}
