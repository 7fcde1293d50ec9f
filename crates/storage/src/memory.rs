use std::collections::HashMap;
use std::sync::Mutex;

use crate::gateway::{StorageError, StorageGateway, StorageKey};

/// In-memory gateway with the lifetime of the process — the stand-in for
/// browser session storage. State vanishes when the gateway is dropped.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    values: Mutex<HashMap<StorageKey, String>>,
}

impl MemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<StorageKey, String>>, StorageError> {
        self.values
            .lock()
            .map_err(|_| StorageError::Unavailable("storage mutex poisoned".to_string()))
    }
}

impl StorageGateway for MemoryGateway {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(&key).cloned())
    }

    fn set(&self, key: StorageKey, value: String) -> Result<(), StorageError> {
        self.lock()?.insert(key, value);
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        self.lock()?.remove(&key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.lock()?.clear();
        Ok(())
    }
}
