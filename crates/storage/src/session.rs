use chrono::{DateTime, Utc};
use std::sync::Arc;

use learner_core::model::{FeedbackEntry, Learner};

use crate::gateway::{StorageError, StorageGateway, StorageKey};

/// Typed repository layer over the raw gateway.
///
/// Serializes domain aggregates to JSON for storage. A payload that fails to
/// deserialize is treated exactly like one that was never written; callers
/// see `None` (or an empty log) and re-initialize. Write failures propagate.
#[derive(Clone)]
pub struct SessionStore {
    gateway: Arc<dyn StorageGateway>,
}

impl SessionStore {
    #[must_use]
    pub fn new(gateway: Arc<dyn StorageGateway>) -> Self {
        Self { gateway }
    }

    /// Loads the persisted learner aggregate, if one exists and parses.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` only when the backend itself
    /// cannot be read. Corrupt JSON reads back as `None`.
    pub fn load_learner(&self) -> Result<Option<Learner>, StorageError> {
        let Some(raw) = self.gateway.get(StorageKey::Learner)? else {
            return Ok(None);
        };
        Ok(serde_json::from_str(&raw).ok())
    }

    /// Persists the full learner aggregate.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails, or
    /// `StorageError::Unavailable` if the write fails. A lost write must be
    /// visible to the caller, never swallowed.
    pub fn save_learner(&self, learner: &Learner) -> Result<(), StorageError> {
        let raw = serde_json::to_string(learner)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.gateway.set(StorageKey::Learner, raw)
    }

    /// Loads the session start timestamp, if one was stamped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the backend cannot be read.
    pub fn session_start(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        let Some(raw) = self.gateway.get(StorageKey::SessionStart)? else {
            return Ok(None);
        };
        Ok(DateTime::parse_from_rfc3339(&raw)
            .ok()
            .map(|t| t.with_timezone(&Utc)))
    }

    /// Stamps the session start timestamp.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the write fails.
    pub fn set_session_start(&self, at: DateTime<Utc>) -> Result<(), StorageError> {
        self.gateway.set(StorageKey::SessionStart, at.to_rfc3339())
    }

    /// Loads the feedback log; absent or corrupt reads back as empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the backend cannot be read.
    pub fn load_feedback(&self) -> Result<Vec<FeedbackEntry>, StorageError> {
        let Some(raw) = self.gateway.get(StorageKey::Feedback)? else {
            return Ok(Vec::new());
        };
        Ok(serde_json::from_str(&raw).unwrap_or_default())
    }

    /// Persists the full feedback log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails, or
    /// `StorageError::Unavailable` if the write fails.
    pub fn save_feedback(&self, entries: &[FeedbackEntry]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.gateway.set(StorageKey::Feedback, raw)
    }

    /// Clears every known key, ending the stored session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the backend cannot be written.
    pub fn clear_all(&self) -> Result<(), StorageError> {
        self.gateway.clear()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
