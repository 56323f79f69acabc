//! Sternhalma terminal client.

use std::time::{Duration, Instant};
use sternhalma_core::{ConnectionStatus, SessionContext, SessionStateMachine};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod console;
mod store;
mod transport;

use config::ClientConfig;
use console::Command;
use store::FileCredentialStore;
use transport::{ConnectionEvent, WebSocketTransport};

/// How often the loop checks whether to reconnect
const RECONNECT_TICK: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they do not interleave with the board
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env();
    info!(
        server = %config.server_url,
        credentials = %config.credentials_path.display(),
        "Starting Sternhalma client..."
    );

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut transport = WebSocketTransport::new(config.server_url.clone(), events_tx);
    let mut store = FileCredentialStore::new(config.credentials_path.clone());
    let mut session = SessionStateMachine::new();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(RECONNECT_TICK);
    let mut shown_status = None;

    println!("{}", console::HELP);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                transport.connect_if_due(Instant::now());
            }
            Some(tagged) = events_rx.recv() => {
                let Some(event) = transport.handle_event(tagged) else {
                    continue;
                };
                let mut ctx = SessionContext::new(&mut transport, &mut store);
                let result = match event {
                    ConnectionEvent::Opened => session.on_connected(&mut ctx),
                    ConnectionEvent::Text(text) => session.handle_text(&mut ctx, &text),
                    ConnectionEvent::Closed => Ok(()),
                };
                if let Err(e) = result {
                    println!("! {}", e);
                }
                redraw(&session, transport.status(), &mut shown_status, false);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let command = match console::parse_command(&line) {
                    None => continue,
                    Some(Ok(command)) => command,
                    Some(Err(e)) => {
                        println!("! {}", e);
                        continue;
                    }
                };
                match command {
                    Command::Quit => break,
                    Command::Help => println!("{}", console::HELP),
                    Command::Intent(intent) => {
                        let mut ctx = SessionContext::new(&mut transport, &mut store);
                        if let Err(e) = session.handle_intent(&mut ctx, intent) {
                            warn!("Intent not applied: {}", e);
                            println!("! {}", e);
                        }
                        redraw(&session, transport.status(), &mut shown_status, true);
                    }
                }
            }
        }
    }

    info!("Goodbye");
    Ok(())
}

/// Print the screen; connection changes alone only print once
fn redraw(
    session: &SessionStateMachine,
    status: ConnectionStatus,
    shown_status: &mut Option<ConnectionStatus>,
    force: bool,
) {
    if force || *shown_status != Some(status) || status == ConnectionStatus::Connected {
        println!("{}", console::render(session, status));
    }
    *shown_status = Some(status);
}
