use tracing::debug;

use learner_core::model::content::session_limits::MAX_FEEDBACK_ENTRIES;
use learner_core::model::{FeedbackContext, FeedbackEntry, FeedbackKind};
use learner_core::Clock;
use storage::SessionStore;

use crate::error::FeedbackServiceError;

/// Aggregate counts over the feedback log.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FeedbackStats {
    pub total: usize,
    pub thumbs_up: usize,
    pub thumbs_down: usize,
    pub with_comments: usize,
    /// Fraction of thumbs that are up, 0.0 when no feedback exists.
    pub sentiment: f64,
}

impl FeedbackStats {
    /// Folds a feedback log into stats. Pure.
    #[must_use]
    pub fn from_entries(entries: &[FeedbackEntry]) -> Self {
        let thumbs_up = entries
            .iter()
            .filter(|e| e.kind() == FeedbackKind::ThumbsUp)
            .count();
        let thumbs_down = entries.len() - thumbs_up;
        let with_comments = entries.iter().filter(|e| e.comment().is_some()).count();
        #[allow(clippy::cast_precision_loss)]
        let sentiment = if entries.is_empty() {
            0.0
        } else {
            thumbs_up as f64 / entries.len() as f64
        };

        Self {
            total: entries.len(),
            thumbs_up,
            thumbs_down,
            with_comments,
            sentiment,
        }
    }
}

/// Append-only feedback log with session-scoped limits.
///
/// Peripheral to the learning core: nothing here feeds back into
/// progression or scoring.
#[derive(Clone)]
pub struct FeedbackService {
    store: SessionStore,
    clock: Clock,
}

impl FeedbackService {
    #[must_use]
    pub fn new(store: SessionStore, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Appends a feedback entry, enforcing the entry cap and comment limit.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackServiceError::LimitReached` at the cap,
    /// `FeedbackServiceError::Entry` for an over-long comment, or a storage
    /// error if persisting fails.
    pub fn submit(
        &self,
        kind: FeedbackKind,
        context: FeedbackContext,
        context_id: impl Into<String>,
        comment: Option<&str>,
    ) -> Result<FeedbackEntry, FeedbackServiceError> {
        let mut entries = self.store.load_feedback()?;
        if entries.len() >= MAX_FEEDBACK_ENTRIES {
            return Err(FeedbackServiceError::LimitReached {
                max: MAX_FEEDBACK_ENTRIES,
            });
        }

        let entry = FeedbackEntry::new(kind, context, context_id, comment, self.clock.now())?;
        debug!(id = %entry.id(), "recorded feedback");
        entries.push(entry.clone());
        self.store.save_feedback(&entries)?;
        Ok(entry)
    }

    /// The full feedback log in submission order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot be read.
    pub fn all(&self) -> Result<Vec<FeedbackEntry>, FeedbackServiceError> {
        Ok(self.store.load_feedback()?)
    }

    /// Entries for a specific context target.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot be read.
    pub fn for_context(
        &self,
        context: FeedbackContext,
        context_id: &str,
    ) -> Result<Vec<FeedbackEntry>, FeedbackServiceError> {
        Ok(self
            .store
            .load_feedback()?
            .into_iter()
            .filter(|e| e.context() == context && e.context_id() == context_id)
            .collect())
    }

    /// Aggregate stats over the log.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot be read.
    pub fn stats(&self) -> Result<FeedbackStats, FeedbackServiceError> {
        Ok(FeedbackStats::from_entries(&self.store.load_feedback()?))
    }

    /// The most recent `count` entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot be read.
    pub fn recent(&self, count: usize) -> Result<Vec<FeedbackEntry>, FeedbackServiceError> {
        let mut entries = self.store.load_feedback()?;
        entries.sort_by_key(|e| std::cmp::Reverse(e.timestamp()));
        entries.truncate(count);
        Ok(entries)
    }

    /// Whether the entry cap has been reached.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot be read.
    pub fn limit_reached(&self) -> Result<bool, FeedbackServiceError> {
        Ok(self.store.load_feedback()?.len() >= MAX_FEEDBACK_ENTRIES)
    }

    /// Empties the log.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persisting fails.
    pub fn clear(&self) -> Result<(), FeedbackServiceError> {
        Ok(self.store.save_feedback(&[])?)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn service() -> FeedbackService {
        FeedbackService::new(testing::session_store(), learner_core::time::fixed_clock())
    }

    #[test]
    fn test_submit_and_list() {
        let svc = service();
        svc.submit(
            FeedbackKind::ThumbsUp,
            FeedbackContext::Module,
            "foundations-1",
            Some("clear"),
        )
        .unwrap();
        svc.submit(FeedbackKind::ThumbsDown, FeedbackContext::Quiz, "quiz-1", None)
            .unwrap();

        let all = svc.all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].comment(), Some("clear"));
    }

    #[test]
    fn test_for_context_filters() {
        let svc = service();
        svc.submit(FeedbackKind::ThumbsUp, FeedbackContext::Stage, "foundations", None)
            .unwrap();
        svc.submit(FeedbackKind::ThumbsUp, FeedbackContext::Stage, "mastery", None)
            .unwrap();

        let entries = svc
            .for_context(FeedbackContext::Stage, "foundations")
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].context_id(), "foundations");
    }

    #[test]
    fn test_entry_cap() {
        let svc = service();
        for i in 0..MAX_FEEDBACK_ENTRIES {
            svc.submit(
                FeedbackKind::ThumbsUp,
                FeedbackContext::Module,
                format!("foundations-{i}"),
                None,
            )
            .unwrap();
        }
        assert!(svc.limit_reached().unwrap());

        let err = svc
            .submit(FeedbackKind::ThumbsUp, FeedbackContext::Quiz, "quiz-1", None)
            .unwrap_err();
        assert!(matches!(err, FeedbackServiceError::LimitReached { .. }));
    }

    #[test]
    fn test_stats_sentiment() {
        let svc = service();
        for kind in [
            FeedbackKind::ThumbsUp,
            FeedbackKind::ThumbsUp,
            FeedbackKind::ThumbsUp,
            FeedbackKind::ThumbsDown,
        ] {
            svc.submit(kind, FeedbackContext::Quiz, "quiz-1", None).unwrap();
        }

        let stats = svc.stats().unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.thumbs_up, 3);
        assert_eq!(stats.thumbs_down, 1);
        assert!((stats.sentiment - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_empty_log() {
        let stats = service().stats().unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.sentiment, 0.0);
    }

    #[test]
    fn test_clear_empties_log() {
        let svc = service();
        svc.submit(FeedbackKind::ThumbsUp, FeedbackContext::Quiz, "quiz-1", None)
            .unwrap();
        svc.clear().unwrap();
        assert!(svc.all().unwrap().is_empty());
    }
}
