//! Durable session storage.
//!
//! Persists the identity the browser client kept in local storage, under the
//! same keys (`username`, `userRole`, `sessionId`), as a JSON file in the
//! config directory.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Persisted session record. Field names mirror the browser client's
/// local storage keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub username: String,
    pub user_role: String,
    pub session_id: String,
}

/// File-backed key-value store for the session record.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the persisted session, or `None` when the store is empty.
    pub fn load(&self) -> Result<Option<StoredSession>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| SessionError::ReadStore {
            path: self.path.clone(),
            source: e,
        })?;

        let stored: StoredSession = serde_json::from_str(&content)?;
        Ok(Some(stored))
    }

    /// Writes the session record, creating parent directories as needed.
    pub fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SessionError::WriteStore {
                path: self.path.clone(),
                source: e,
            })?;
        }

        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content).map_err(|e| SessionError::WriteStore {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Removes the persisted session. Missing file is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::WriteStore {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_load_roundtrip_uses_browser_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::new(path.clone());

        store
            .save(&StoredSession {
                username: "ana".to_string(),
                user_role: "admin".to_string(),
                session_id: "sess-9".to_string(),
            })
            .unwrap();

        // On-disk keys match the browser client's local storage keys
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"userRole\""));
        assert!(raw.contains("\"sessionId\""));

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.username, "ana");
        assert_eq!(loaded.user_role, "admin");
        assert_eq!(loaded.session_id, "sess-9");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        store.clear().unwrap();
        store
            .save(&StoredSession {
                username: "ana".to_string(),
                user_role: "admin".to_string(),
                session_id: "sess-9".to_string(),
            })
            .unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }
}
