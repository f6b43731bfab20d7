//! Port for persisting the conversation identity.
//!
//! A single key-value slot (browser local storage in the web client, a JSON
//! file for the CLI). Failures are never fatal: the session logs them and
//! keeps the identity in memory only.

use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Errors from an identity store
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Identity storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Identity storage is corrupt: {0}")]
    Corrupt(String),

    #[error("Identity storage unavailable: {0}")]
    Unavailable(String),
}

/// Key-value slot for identity recovery across runs.
pub trait IdentityStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local store, used when nothing should outlive the process.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Ok(slots.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.remove(key);
        Ok(())
    }
}
