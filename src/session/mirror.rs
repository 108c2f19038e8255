//! On-disk mirror of the session.
//!
//! The mirror is a best-effort cache, not durable storage. It lives under
//! two separate keys in the data directory: `credential` holds the raw
//! bearer token, `session.json` holds everything else plus the accumulated
//! fact-check log. It is read once at startup and otherwise only written.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Settings;

use super::model::{ChatMessage, FactCheckRecord};

/// Serialized session fields, minus the token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub pdf_name: Option<String>,
    #[serde(default)]
    pub current_document_id: Option<String>,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
    /// Accumulated fact-check log; not part of the in-memory session.
    #[serde(default)]
    pub fact_history: Vec<FactCheckRecord>,
}

/// Reads and writes the two mirror keys.
#[derive(Debug, Clone)]
pub struct SessionMirror {
    credential_path: PathBuf,
    session_path: PathBuf,
}

impl SessionMirror {
    pub fn new(settings: &Settings) -> Self {
        Self {
            credential_path: settings.credential_path(),
            session_path: settings.session_path(),
        }
    }

    /// Read both keys. Returns `None` when the mirror is absent; an
    /// unreadable or unparseable mirror is discarded entirely so a broken
    /// cache can never leave the client half-authenticated.
    pub fn load(&self) -> Option<(String, PersistedState)> {
        let token = match fs::read_to_string(&self.credential_path) {
            Ok(token) => token,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.discard_if_partial();
                return None;
            }
            Err(e) => {
                warn!("Discarding unreadable session mirror: {}", e);
                self.discard();
                return None;
            }
        };
        let token = token.trim().to_string();
        if token.is_empty() {
            warn!("Discarding session mirror with empty credential");
            self.discard();
            return None;
        }

        let raw = match fs::read_to_string(&self.session_path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Discarding session mirror without readable state: {}", e);
                self.discard();
                return None;
            }
        };
        match serde_json::from_str::<PersistedState>(&raw) {
            Ok(state) => Some((token, state)),
            Err(e) => {
                warn!("Discarding unparseable session mirror: {}", e);
                self.discard();
                None
            }
        }
    }

    /// Write both keys, creating the data directory if needed.
    pub fn save(&self, token: &str, state: &PersistedState) -> io::Result<()> {
        if let Some(parent) = self.credential_path.parent() {
            fs::create_dir_all(parent)?;
        }
        secure_write(&self.credential_path, token.as_bytes())?;
        let json = serde_json::to_vec(state)?;
        secure_write(&self.session_path, &json)?;
        debug!("Session mirror written");
        Ok(())
    }

    /// Remove both keys.
    pub fn remove(&self) -> io::Result<()> {
        remove_if_exists(&self.credential_path)?;
        remove_if_exists(&self.session_path)
    }

    fn discard(&self) {
        if let Err(e) = self.remove() {
            warn!("Failed to remove session mirror: {}", e);
        }
    }

    /// State without a credential is stray; drop it.
    fn discard_if_partial(&self) {
        if self.session_path.exists() {
            warn!("Discarding session state without credential");
            self.discard();
        }
    }
}

/// Session files carry the user's credential and transcript; keep them
/// owner-readable only.
fn secure_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut file = opts.open(path)?;
    file.write_all(bytes)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
