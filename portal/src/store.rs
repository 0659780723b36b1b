// portal/src/store.rs
use std::fs;
use std::io;
use std::path::PathBuf;

use common::models::session::{Identity, SessionSnapshot};

// Storage keys mirror the key names the rest of the portal expects
const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

/// File-backed key-value store for the current session.
///
/// One file per key under a dedicated directory, so a restored tab can read
/// the session synchronously before the first paint. The token and identity
/// are always written and cleared as a pair.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Read the persisted session. Unavailable or unreadable storage
    /// degrades to an empty snapshot (logged out), never an error.
    pub fn read(&self) -> SessionSnapshot {
        let token = match fs::read_to_string(self.key_path(TOKEN_KEY)) {
            Ok(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(_) => None,
        };

        if token.is_none() {
            return SessionSnapshot::default();
        }

        // The caller re-derives the identity from the token when this key
        // is missing or unreadable.
        let identity = fs::read_to_string(self.key_path(USER_KEY))
            .ok()
            .and_then(|raw| serde_json::from_str::<Identity>(&raw).ok());

        SessionSnapshot { token, identity }
    }

    /// Persist the token and identity together. If either write fails the
    /// pair is cleared so the store never holds a partial session.
    pub fn write(&self, token: &str, identity: &Identity) -> io::Result<()> {
        let result = self.write_pair(token, identity);
        if result.is_err() {
            self.clear();
        }
        result
    }

    fn write_pair(&self, token: &str, identity: &Identity) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.key_path(TOKEN_KEY), token)?;
        let serialized = serde_json::to_string(identity)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(self.key_path(USER_KEY), serialized)?;
        Ok(())
    }

    /// Remove both keys. Safe to call when nothing is stored.
    pub fn clear(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = fs::remove_file(self.key_path(key)) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove session key {}: {}", key, e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn identity() -> Identity {
        Identity {
            role: "STUDENT".to_string(),
            username: "aditi.sharma@example.com".to_string(),
        }
    }

    #[test]
    fn write_then_read_returns_the_pair() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::new(dir.path());

        store.write("signed-token", &identity()).expect("write");
        let snapshot = store.read();
        assert_eq!(snapshot.token.as_deref(), Some("signed-token"));
        assert_eq!(snapshot.identity, Some(identity()));
    }

    #[test]
    fn missing_directory_reads_as_logged_out() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::new(dir.path().join("never-created"));
        assert!(store.read().is_empty());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::new(dir.path());

        store.write("signed-token", &identity()).expect("write");
        store.clear();
        assert!(store.read().is_empty());
        // A second clear on an already-empty store must be a no-op
        store.clear();
        assert!(store.read().is_empty());
    }

    #[test]
    fn token_with_corrupt_identity_surfaces_token_only() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::new(dir.path());

        store.write("signed-token", &identity()).expect("write");
        fs::write(dir.path().join("user"), "not-json").expect("corrupt user key");

        let snapshot = store.read();
        assert_eq!(snapshot.token.as_deref(), Some("signed-token"));
        assert!(snapshot.identity.is_none());
    }

    #[test]
    fn blank_token_reads_as_logged_out() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::new(dir.path());

        fs::write(dir.path().join("token"), "  \n").expect("blank token");
        assert!(store.read().is_empty());
    }
}
