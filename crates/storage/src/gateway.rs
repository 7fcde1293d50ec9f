use std::fmt;
use thiserror::Error;

/// Errors surfaced by storage gateways.
///
/// Read-side corruption is deliberately not an error: a payload that fails
/// to deserialize reads back as absent. Write failures always propagate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Well-known keys for session-scoped storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Learner,
    SessionStart,
    Feedback,
}

impl StorageKey {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Learner => "learner-state",
            StorageKey::SessionStart => "session-start",
            StorageKey::Feedback => "feedback-entries",
        }
    }

    /// All keys, for whole-session operations.
    pub const ALL: [StorageKey; 3] = [
        StorageKey::Learner,
        StorageKey::SessionStart,
        StorageKey::Feedback,
    ];
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synchronous key-value gateway over session-scoped storage.
///
/// Values are opaque JSON strings; typed (de)serialization lives in
/// `SessionStore`. Keys are set independently with no cross-key
/// transactional guarantees.
pub trait StorageGateway: Send + Sync {
    /// Reads the raw value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the backend cannot be read.
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    /// Writes the raw value under `key`, replacing any prior value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the backend cannot be written.
    fn set(&self, key: StorageKey, value: String) -> Result<(), StorageError>;

    /// Removes the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the backend cannot be written.
    fn remove(&self, key: StorageKey) -> Result<(), StorageError>;

    /// Removes every known key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the backend cannot be written.
    fn clear(&self) -> Result<(), StorageError>;
}
