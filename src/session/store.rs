//! Durable persistence for the access token and cached profile. A single
//! JSON file under the data directory survives restarts; corrupt or missing
//! data is treated as absent and never crashes startup.

use crate::api::types::Profile;
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const STORE_FILE: &str = "session.json";

/// On-disk shape of a persisted session.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    #[serde(default)]
    pub profile: Option<Profile>,
}

/// File-backed credential store. Performs no network calls.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STORE_FILE),
        }
    }

    /// Reads the persisted session. A missing file is absent data; an
    /// unreadable or unparseable file is cleared and reported as absent.
    pub fn load(&self) -> Option<StoredSession> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!("Failed to read credential store: {err}");
                self.clear();
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(stored) => Some(stored),
            Err(err) => {
                warn!("Discarding corrupt credential store: {err}");
                self.clear();
                None
            }
        }
    }

    /// Persists the token and profile. An absent token clears the store, so
    /// a logged-out state never leaves a stale profile behind.
    pub fn save(&self, token: Option<&SecretString>, profile: Option<&Profile>) -> Result<()> {
        let Some(token) = token else {
            self.clear();
            return Ok(());
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let stored = StoredSession {
            token: token.expose_secret().to_string(),
            profile: profile.cloned(),
        };
        let raw = serde_json::to_string(&stored)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        Ok(())
    }

    /// Removes the persisted session, ignoring a file that is already gone.
    pub fn clear(&self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to clear credential store: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Role;
    use anyhow::{anyhow, Result};

    fn profile() -> Profile {
        Profile {
            id: 1,
            username: "alice".to_string(),
            role: Role::User,
            balance: 0,
            user_group_id: 0,
            created_at: String::new(),
        }
    }

    #[test]
    fn load_returns_none_when_missing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = CredentialStore::new(dir.path());
        assert!(store.load().is_none());
        Ok(())
    }

    #[test]
    fn save_and_load_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = CredentialStore::new(dir.path());
        let token = SecretString::from("T1".to_string());

        store.save(Some(&token), Some(&profile()))?;

        let stored = store.load().ok_or_else(|| anyhow!("expected session"))?;
        assert_eq!(stored.token, "T1");
        assert_eq!(
            stored.profile.map(|profile| profile.username),
            Some("alice".to_string())
        );
        Ok(())
    }

    #[test]
    fn save_without_token_clears_store() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = CredentialStore::new(dir.path());
        let token = SecretString::from("T1".to_string());

        store.save(Some(&token), None)?;
        store.save(None, Some(&profile()))?;

        assert!(store.load().is_none());
        assert!(!dir.path().join(STORE_FILE).exists());
        Ok(())
    }

    #[test]
    fn corrupt_file_is_cleared_and_reported_absent() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = CredentialStore::new(dir.path());
        fs::write(dir.path().join(STORE_FILE), "{not json")?;

        assert!(store.load().is_none());
        assert!(!dir.path().join(STORE_FILE).exists());
        Ok(())
    }

    #[test]
    fn clear_is_idempotent() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = CredentialStore::new(dir.path());
        store.clear();
        store.clear();
        Ok(())
    }
}
