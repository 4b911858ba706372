//! Durable credential storage.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::auth::session::PersistedSession;
use crate::error::{ClientError, ClientResult};

/// Storage backend for the persisted credential record.
pub trait CredentialStore: Send + Sync {
    /// Load the persisted session, if one exists.
    ///
    /// # Errors
    /// Returns an error if the record exists but cannot be read or decoded.
    fn load(&self) -> ClientResult<Option<PersistedSession>>;

    /// Write the persisted session.
    ///
    /// # Errors
    /// Returns an error if the record cannot be written.
    fn save(&self, session: &PersistedSession) -> ClientResult<()>;

    /// Remove the persisted session.
    ///
    /// # Errors
    /// Returns an error if the record cannot be removed.
    fn clear(&self) -> ClientResult<()>;
}

/// JSON-file credential store.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by the given file path.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> ClientResult<Option<PersistedSession>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(ClientError::Storage(err.to_string())),
        };
        let session = serde_json::from_str(&raw)
            .map_err(|err| ClientError::Storage(format!("corrupt credential record: {err}")))?;
        Ok(Some(session))
    }

    fn save(&self, session: &PersistedSession) -> ClientResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|err| ClientError::Storage(err.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(session)
            .map_err(|err| ClientError::Storage(err.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|err| ClientError::Storage(err.to_string()))
    }

    fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ClientError::Storage(err.to_string())),
        }
    }
}

/// In-memory credential store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<PersistedSession>>,
}

impl MemoryCredentialStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> ClientResult<Option<PersistedSession>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &PersistedSession) -> ClientResult<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> PersistedSession {
        PersistedSession {
            access: "a.b.c".to_string(),
            refresh: "d.e.f".to_string(),
            user: None,
        }
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryCredentialStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&sample_session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_session()));
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("session.json"));
        assert!(store.load().unwrap().is_none());
        store.save(&sample_session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_session()));
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_rejects_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileCredentialStore::new(path);
        assert!(matches!(store.load(), Err(ClientError::Storage(_))));
    }
}
