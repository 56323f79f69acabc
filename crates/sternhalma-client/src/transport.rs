//! Websocket connection to the game server.
//!
//! Each connection attempt runs in its own task. The task reports back to the
//! session loop over an mpsc channel and takes outbound messages from
//! another, so the session itself is never shared between tasks.

use futures_util::{SinkExt, StreamExt};
use std::time::Instant;
use sternhalma_core::{ClientMessage, ConnectionStatus, ReconnectPolicy, SessionError, Transport};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Something that happened on a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Opened,
    Text(String),
    Closed,
}

/// An event tagged with the attempt that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedEvent {
    pub attempt: u64,
    pub event: ConnectionEvent,
}

/// Session-side handle of the websocket connection
pub struct WebSocketTransport {
    url: String,
    events: mpsc::UnboundedSender<TaggedEvent>,
    outgoing: Option<mpsc::UnboundedSender<ClientMessage>>,
    policy: ReconnectPolicy,
    /// Identifies the live attempt; events from older ones are stale
    attempt: u64,
    connected: bool,
    pending: bool,
    task: Option<JoinHandle<()>>,
}

impl WebSocketTransport {
    pub fn new(url: impl Into<String>, events: mpsc::UnboundedSender<TaggedEvent>) -> Self {
        Self {
            url: url.into(),
            events,
            outgoing: None,
            policy: ReconnectPolicy::new(),
            attempt: 0,
            connected: false,
            pending: false,
            task: None,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.policy.status(self.connected)
    }

    /// Start a connection attempt if none is live and the policy allows one
    pub fn connect_if_due(&mut self, now: Instant) {
        if self.connected || self.pending || !self.policy.should_attempt(now) {
            return;
        }
        self.policy.record_attempt(now);
        self.attempt += 1;
        self.pending = true;

        let (tx, rx) = mpsc::unbounded_channel();
        self.outgoing = Some(tx);
        info!(
            url = %self.url,
            attempt = self.policy.attempts(),
            "Connecting to server"
        );
        self.task = Some(tokio::spawn(run_connection(
            self.url.clone(),
            self.attempt,
            rx,
            self.events.clone(),
        )));
    }

    /// Apply an event from a connection task.
    ///
    /// Returns the event if it belongs to the live attempt.
    pub fn handle_event(&mut self, tagged: TaggedEvent) -> Option<ConnectionEvent> {
        if tagged.attempt != self.attempt {
            debug!(attempt = tagged.attempt, "Ignoring event from stale connection");
            return None;
        }
        match &tagged.event {
            ConnectionEvent::Opened => {
                self.connected = true;
                self.pending = false;
                self.policy.record_connected();
                info!("Connected to server");
            }
            ConnectionEvent::Closed => {
                if self.connected {
                    warn!("Connection to server lost");
                }
                self.connected = false;
                self.pending = false;
                self.outgoing = None;
                if self.policy.is_exhausted() {
                    error!("Unable to connect to server");
                }
            }
            ConnectionEvent::Text(_) => {}
        }
        Some(tagged.event)
    }
}

impl Transport for WebSocketTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, message: ClientMessage) -> Result<(), SessionError> {
        if !self.connected {
            return Err(SessionError::TransportUnavailable);
        }
        let outgoing = self
            .outgoing
            .as_ref()
            .ok_or(SessionError::TransportUnavailable)?;
        outgoing
            .send(message)
            .map_err(|_| SessionError::TransportUnavailable)
    }

    fn disconnect(&mut self) {
        // Dropping the sender makes the task close the socket
        self.outgoing = None;
        self.connected = false;
        self.pending = false;
        self.attempt += 1;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        info!("Disconnected from server");
    }
}

/// Drive one websocket connection until either side closes it
async fn run_connection(
    url: String,
    attempt: u64,
    mut outgoing: mpsc::UnboundedReceiver<ClientMessage>,
    events: mpsc::UnboundedSender<TaggedEvent>,
) {
    let emit = |event| {
        let _ = events.send(TaggedEvent { attempt, event });
    };

    let ws_stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!("Connection to {} failed: {}", url, e);
            emit(ConnectionEvent::Closed);
            return;
        }
    };
    emit(ConnectionEvent::Opened);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    loop {
        tokio::select! {
            message = outgoing.recv() => {
                let Some(message) = message else {
                    let _ = ws_sender.send(Message::Close(None)).await;
                    break;
                };
                match serde_json::to_string(&message) {
                    Ok(text) => {
                        if let Err(e) = ws_sender.send(Message::Text(text)).await {
                            error!("WebSocket send failed: {}", e);
                            break;
                        }
                    }
                    Err(e) => error!("Could not encode {:?}: {}", message, e),
                }
            }
            incoming = ws_receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => emit(ConnectionEvent::Text(text)),
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Server closed the connection");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    emit(ConnectionEvent::Closed);
}
