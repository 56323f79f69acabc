//! Reconnection credentials.
//!
//! While a player is seated in a running game the client remembers the game
//! code and the user id the server assigned, so a dropped connection can be
//! resumed with a `reconnect` request. Where they are kept is up to the
//! front end: a browser cookie, a file, or just memory.

use serde::{Deserialize, Serialize};

/// The pair needed to resume a seat in a running game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub game_code: String,
    pub user_id: String,
}

impl Credentials {
    pub fn new(game_code: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            game_code: game_code.into(),
            user_id: user_id.into(),
        }
    }
}

/// Persistent storage for [`Credentials`]
pub trait CredentialStore {
    /// The stored credentials, if any
    fn load(&self) -> Option<Credentials>;

    /// Replace the stored credentials
    fn save(&mut self, credentials: &Credentials);

    /// Forget the stored credentials
    fn clear(&mut self);
}

/// A store that lives only as long as the process
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    credentials: Option<Credentials>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<Credentials> {
        self.credentials.clone()
    }

    fn save(&mut self, credentials: &Credentials) {
        self.credentials = Some(credentials.clone());
    }

    fn clear(&mut self) {
        self.credentials = None;
    }
}
