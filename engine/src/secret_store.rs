#[cfg(any(test, feature = "test-util"))]
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::error::SecretStoreError;

/// Name under which the API key is stored
pub const API_KEY_ENTRY: &str = "OPENAI_API_KEY";

/// A single persisted secret.
pub trait SecretStore: Send + Sync {
    /// Returns `None` when nothing is stored or the backend is unavailable.
    fn get(&self) -> Option<String>;
    fn set(&self, value: &str) -> Result<(), SecretStoreError>;
    fn delete(&self) -> Result<(), SecretStoreError>;
}

/// Stores the secret in the platform credential store (Keychain, Credential
/// Manager or Secret Service).
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, SecretStoreError> {
        Ok(keyring::Entry::new(&self.service, API_KEY_ENTRY)?)
    }
}

impl SecretStore for KeyringStore {
    fn get(&self) -> Option<String> {
        match self.entry().and_then(|e| Ok(e.get_password()?)) {
            Ok(secret) => Some(secret),
            Err(SecretStoreError(keyring::Error::NoEntry)) => {
                debug!("No {API_KEY_ENTRY} stored for {}", self.service);
                None
            }
            Err(e) => {
                warn!("{e}");
                None
            }
        }
    }

    fn set(&self, value: &str) -> Result<(), SecretStoreError> {
        self.entry()?.set_password(value)?;
        Ok(())
    }

    fn delete(&self) -> Result<(), SecretStoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store standing in for the keyring in tests. Clones share the
/// same slot. Only built with the `test-util` feature.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

#[cfg(any(test, feature = "test-util"))]
impl MemoryStore {
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(secret.into()))),
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
impl SecretStore for MemoryStore {
    fn get(&self) -> Option<String> {
        self.slot.lock().ok()?.clone()
    }

    fn set(&self, value: &str) -> Result<(), SecretStoreError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(value.to_string());
        }
        Ok(())
    }

    fn delete(&self) -> Result<(), SecretStoreError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        Ok(())
    }
}
