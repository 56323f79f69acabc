//! The outbound side of the server connection.
//!
//! The session never talks to a socket directly. It goes through the
//! [`Transport`] trait, which the native client implements over a websocket
//! and the browser bindings implement as an outbox drained by JavaScript.
//!
//! [`ReconnectPolicy`] holds the reconnection rules every transport follows:
//! at least [`RECONNECT_COOLDOWN`] between attempts and at most
//! [`MAX_RECONNECT_ATTEMPTS`] failures in a row before giving up.

use crate::protocol::ClientMessage;
use crate::session::SessionError;
use std::time::{Duration, Instant};

/// Minimum delay between two connection attempts
pub const RECONNECT_COOLDOWN: Duration = Duration::from_secs(3);

/// Failed attempts after which the client stops trying
pub const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// A channel to the server
pub trait Transport {
    /// Whether messages can currently be delivered
    fn is_connected(&self) -> bool;

    /// Deliver a message, failing with `TransportUnavailable` when disconnected
    fn send(&mut self, message: ClientMessage) -> Result<(), SessionError>;

    /// Close the connection; the client reconnects on its own schedule
    fn disconnect(&mut self);
}

/// What the UI should show about the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    /// Not connected, more attempts will be made
    Connecting,
    /// Not connected and out of attempts
    Unavailable,
}

/// Cooldown and attempt cap for reconnecting
#[derive(Debug, Clone, Default)]
pub struct ReconnectPolicy {
    attempts: u32,
    last_attempt: Option<Instant>,
}

impl ReconnectPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a new attempt may start at `now`
    pub fn should_attempt(&self, now: Instant) -> bool {
        if self.attempts >= MAX_RECONNECT_ATTEMPTS {
            return false;
        }
        match self.last_attempt {
            Some(last) => now.saturating_duration_since(last) >= RECONNECT_COOLDOWN,
            None => true,
        }
    }

    /// Note that an attempt started at `now`
    pub fn record_attempt(&mut self, now: Instant) {
        self.attempts += 1;
        self.last_attempt = Some(now);
    }

    /// Note that a connection was established; the attempt count starts over
    pub fn record_connected(&mut self) {
        self.attempts = 0;
    }

    /// Attempts made since the last successful connection
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether the attempt budget is spent
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= MAX_RECONNECT_ATTEMPTS
    }

    pub fn status(&self, connected: bool) -> ConnectionStatus {
        if connected {
            ConnectionStatus::Connected
        } else if self.is_exhausted() {
            ConnectionStatus::Unavailable
        } else {
            ConnectionStatus::Connecting
        }
    }
}

/// A transport that queues messages in memory.
///
/// Used by the browser bindings, where JavaScript owns the socket and drains
/// the outbox after every call, and by tests.
#[derive(Debug, Clone, Default)]
pub struct OutboxTransport {
    connected: bool,
    outbox: Vec<ClientMessage>,
    disconnects: u32,
}

impl OutboxTransport {
    /// A transport in the given connection state
    pub fn new(connected: bool) -> Self {
        Self {
            connected,
            ..Self::default()
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Take every queued message
    pub fn drain(&mut self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// Queued messages, oldest first
    pub fn sent(&self) -> &[ClientMessage] {
        &self.outbox
    }

    /// How many times `disconnect` was called
    pub fn disconnects(&self) -> u32 {
        self.disconnects
    }
}

impl Transport for OutboxTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, message: ClientMessage) -> Result<(), SessionError> {
        if !self.connected {
            return Err(SessionError::TransportUnavailable);
        }
        self.outbox.push(message);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.disconnects += 1;
    }
}
