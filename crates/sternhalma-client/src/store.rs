//! Credentials kept in a small JSON file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use sternhalma_core::{CredentialStore, Credentials};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Credential file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// A [`CredentialStore`] backed by a file on disk.
///
/// The trait is infallible, so failures are logged and the store behaves as
/// if it were empty.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Option<Credentials>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(credentials)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    pub fn remove(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<Credentials> {
        self.read().unwrap_or_else(|e| {
            warn!(path = %self.path.display(), "Ignoring stored credentials: {}", e);
            None
        })
    }

    fn save(&mut self, credentials: &Credentials) {
        match self.write(credentials) {
            Ok(()) => debug!(game_code = %credentials.game_code, "Saved credentials"),
            Err(e) => warn!(path = %self.path.display(), "Could not save credentials: {}", e),
        }
    }

    fn clear(&mut self) {
        if let Err(e) = self.remove() {
            warn!(path = %self.path.display(), "Could not remove credentials: {}", e);
        }
    }
}
