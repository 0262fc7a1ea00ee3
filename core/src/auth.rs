//! Persisted bearer-token storage.
//!
//! The request interceptor reads the token on every call, so a login or
//! logout takes effect on the next request without rebuilding the client.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use parking_lot::RwLock;

use crate::error::StorageError;

/// Source of the bearer token attached to outgoing requests.
pub trait TokenStore: Send + Sync {
    /// Current token, or `None` when the user is not logged in.
    fn access_token(&self) -> Result<Option<String>, StorageError>;

    fn set_access_token(&self, token: &str) -> Result<(), StorageError>;

    fn clear(&self) -> Result<(), StorageError>;
}

/// Process-local token store. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.token.read().clone())
    }

    fn set_access_token(&self, token: &str) -> Result<(), StorageError> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.token.write() = None;
        Ok(())
    }
}

/// Token persisted in a JSON object file, under a fixed key.
///
/// The file is shared key/value storage: other keys are preserved on write.
/// A missing file reads as "no token"; an unreadable or malformed file is an
/// error.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(&self.key).filter(|t| !t.is_empty()))
    }

    fn set_access_token(&self, token: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.insert(self.key.clone(), token.to_string());
        self.save(&entries)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        if entries.remove(&self.key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
