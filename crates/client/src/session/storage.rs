//! Durable session persistence.
//!
//! The browser original kept the token and a denormalized user object in
//! `localStorage`; here the same pair lives in a JSON file (or in memory
//! for tests). The storage layer knows nothing about token validity - it
//! stores and returns bytes, and the session store decides what they mean.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::UserDisplay;

/// Errors from reading or writing persisted session state.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("session storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored content is not a valid session document.
    #[error("session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The persisted session document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    /// The bearer token as issued at login.
    pub token: String,
    /// Denormalized display user captured at login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDisplay>,
}

/// Durable storage for the session document.
///
/// An explicit seam so the session store is test-constructible; the CLI
/// uses [`FileTokenStorage`], tests use [`MemoryTokenStorage`].
pub trait TokenStorage {
    /// Read the stored session, `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error when storage exists but cannot be read or parsed.
    fn load(&self) -> Result<Option<StoredSession>, StorageError>;

    /// Persist the session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error when the session cannot be written.
    fn save(&self, session: &StoredSession) -> Result<(), StorageError>;

    /// Forget the stored session. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when existing storage cannot be removed.
    fn clear(&self) -> Result<(), StorageError>;
}

// =============================================================================
// File-backed storage
// =============================================================================

/// Session storage backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Create storage at the given path. The file and its parent directory
    /// are created lazily on first save.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<StoredSession>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session = serde_json::from_str(&raw)?;
        Ok(Some(session))
    }

    fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// In-memory storage
// =============================================================================

/// Session storage held in memory, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    inner: Mutex<Option<StoredSession>>,
}

impl MemoryTokenStorage {
    /// Create empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with a session.
    #[must_use]
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<StoredSession>, StorageError> {
        Ok(self.inner.lock().ok().and_then(|guard| guard.clone()))
    }

    fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = Some(session.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = None;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join("kirana-client-tests")
            .join(format!("{name}-{}", std::process::id()))
            .join("session.json")
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let storage = FileTokenStorage::new(temp_path("roundtrip"));
        storage.clear().unwrap();

        assert!(storage.load().unwrap().is_none());

        let session = StoredSession {
            token: "a.b.c".to_owned(),
            user: None,
        };
        storage.save(&session).unwrap();

        let loaded = storage.load().unwrap().unwrap();
        assert_eq!(loaded.token, "a.b.c");
        assert!(loaded.user.is_none());

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_corrupt_content() {
        let path = temp_path("corrupt");
        let storage = FileTokenStorage::new(path.clone());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(storage.load(), Err(StorageError::Corrupt(_))));

        storage.clear().unwrap();
    }

    #[test]
    fn test_clear_missing_file_is_ok() {
        let storage = FileTokenStorage::new(temp_path("missing"));
        storage.clear().unwrap();
        storage.clear().unwrap();
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryTokenStorage::new();
        assert!(storage.load().unwrap().is_none());

        storage
            .save(&StoredSession {
                token: "tok".to_owned(),
                user: None,
            })
            .unwrap();
        assert_eq!(storage.load().unwrap().unwrap().token, "tok");

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }
}
