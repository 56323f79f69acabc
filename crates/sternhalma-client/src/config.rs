//! Client configuration from the environment.

use std::path::PathBuf;

const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:8000/ws";
const DEFAULT_CREDENTIALS_PATH: &str = ".sternhalma-credentials.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Websocket endpoint of the game server
    pub server_url: String,
    /// Where reconnection credentials are kept between runs
    pub credentials_path: PathBuf,
}

impl ClientConfig {
    /// Read `SERVER_URL` and `CREDENTIALS_PATH`, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            server_url: lookup("SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.into()),
            credentials_path: lookup("CREDENTIALS_PATH")
                .unwrap_or_else(|| DEFAULT_CREDENTIALS_PATH.into())
                .into(),
        }
    }
}
