//! Explicit, injectable session context.
//!
//! The original dashboard kept identity in ambient browser storage read from
//! everywhere. Here the session is an explicit object with a defined
//! lifecycle: restored from the durable store at startup, mutated only by
//! `login`/`logout`, and propagated by reference through `AppState`.

pub mod store;

pub use store::{SessionStore, StoredSession};

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use log::warn;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::error::SessionError;

/// The logged-in identity held in memory.
struct Session {
    username: String,
    role: String,
    session_id: SecretString,
    logged_in_at: DateTime<Utc>,
}

/// Read-only view of the current session for the presentation layer.
/// The session id is deliberately absent; it only leaves the context as a
/// request header value.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub username: String,
    pub role: String,
    pub logged_in_at: DateTime<Utc>,
}

/// Holds the current session and its durable store.
pub struct SessionContext {
    store: SessionStore,
    current: RwLock<Option<Session>>,
}

impl SessionContext {
    /// Creates a context from the store, restoring any persisted session.
    /// A corrupt store file is logged and treated as logged out.
    pub fn restore(store: SessionStore) -> Self {
        let current = match store.load() {
            Ok(Some(stored)) => Some(Session {
                username: stored.username,
                role: stored.user_role,
                session_id: SecretString::from(stored.session_id),
                logged_in_at: Utc::now(),
            }),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to restore session, starting logged out: {}", e);
                None
            }
        };

        Self {
            store,
            current: RwLock::new(current),
        }
    }

    /// Records a successful login and persists it.
    pub fn login(
        &self,
        username: &str,
        role: &str,
        session_id: &str,
    ) -> Result<(), SessionError> {
        if username.trim().is_empty() {
            return Err(SessionError::LoginFailed {
                message: "username must not be empty".to_string(),
            });
        }

        self.store.save(&StoredSession {
            username: username.to_string(),
            user_role: role.to_string(),
            session_id: session_id.to_string(),
        })?;

        let mut guard = self.write_lock();
        *guard = Some(Session {
            username: username.to_string(),
            role: role.to_string(),
            session_id: SecretString::from(session_id.to_string()),
            logged_in_at: Utc::now(),
        });

        Ok(())
    }

    /// Clears the session and the durable store.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.clear()?;
        let mut guard = self.write_lock();
        *guard = None;
        Ok(())
    }

    /// Returns a snapshot of the current session, if logged in.
    pub fn current(&self) -> Option<SessionSnapshot> {
        let guard = self.read_lock();
        guard.as_ref().map(|s| SessionSnapshot {
            username: s.username.clone(),
            role: s.role.clone(),
            logged_in_at: s.logged_in_at,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_lock().is_some()
    }

    /// Returns the session id for the `X-Session-ID` request header.
    pub fn session_id_header(&self) -> Option<String> {
        let guard = self.read_lock();
        guard
            .as_ref()
            .map(|s| s.session_id.expose_secret().to_string())
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, Option<Session>> {
        match self.current.read() {
            Ok(g) => g,
            Err(poisoned) => {
                warn!("Session lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        match self.current.write() {
            Ok(g) => g,
            Err(poisoned) => {
                warn!("Session lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context_in(dir: &TempDir) -> SessionContext {
        SessionContext::restore(SessionStore::new(dir.path().join("session.json")))
    }

    #[test]
    fn test_starts_logged_out() {
        let dir = TempDir::new().unwrap();
        let ctx = context_in(&dir);
        assert!(!ctx.is_authenticated());
        assert!(ctx.current().is_none());
        assert!(ctx.session_id_header().is_none());
    }

    #[test]
    fn test_login_persists_and_restores() {
        let dir = TempDir::new().unwrap();
        let ctx = context_in(&dir);

        ctx.login("ana", "analyst", "sess-123").unwrap();
        assert!(ctx.is_authenticated());
        let snapshot = ctx.current().unwrap();
        assert_eq!(snapshot.username, "ana");
        assert_eq!(snapshot.role, "analyst");
        assert_eq!(ctx.session_id_header().as_deref(), Some("sess-123"));

        // A fresh context restores the persisted identity
        let restored = context_in(&dir);
        assert!(restored.is_authenticated());
        assert_eq!(restored.current().unwrap().username, "ana");
        assert_eq!(restored.session_id_header().as_deref(), Some("sess-123"));
    }

    #[test]
    fn test_logout_clears_store() {
        let dir = TempDir::new().unwrap();
        let ctx = context_in(&dir);

        ctx.login("ana", "analyst", "sess-123").unwrap();
        ctx.logout().unwrap();
        assert!(!ctx.is_authenticated());

        let restored = context_in(&dir);
        assert!(!restored.is_authenticated());
    }

    #[test]
    fn test_empty_username_rejected() {
        let dir = TempDir::new().unwrap();
        let ctx = context_in(&dir);

        let result = ctx.login("  ", "analyst", "sess-123");
        assert!(matches!(result, Err(SessionError::LoginFailed { .. })));
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn test_corrupt_store_starts_logged_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let ctx = SessionContext::restore(SessionStore::new(path));
        assert!(!ctx.is_authenticated());
    }
}
