use std::sync::Arc;

use tracing::{debug, info};

use learner_core::model::{Learner, ModuleId, SessionId, StageId, Theme};
use learner_core::{Clock, ContentCatalog};
use storage::SessionStore;

use crate::error::LearnerError;

/// Snapshot of overall session progress, useful for UI and analytics.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ProgressSummary {
    pub session_id: SessionId,
    pub completed_stages: usize,
    pub total_stages: usize,
    pub percent_complete: f64,
    pub current_stage: Option<StageId>,
    pub session_duration_ms: i64,
    pub session_duration_minutes: i64,
    pub interaction_count: u64,
}

/// Owns the learner aggregate: single source of truth for session state.
///
/// Every mutation is a full read-modify-write of the aggregate followed by a
/// persist. There is no concurrent writer in this execution model, so no
/// versioning or compare-and-swap is needed.
#[derive(Clone)]
pub struct LearnerService {
    store: SessionStore,
    catalog: Arc<ContentCatalog>,
    clock: Clock,
}

impl LearnerService {
    #[must_use]
    pub fn new(store: SessionStore, catalog: Arc<ContentCatalog>, clock: Clock) -> Self {
        Self {
            store,
            catalog,
            clock,
        }
    }

    /// Returns the persisted learner, creating and persisting a fresh one if
    /// none exists. Idempotent: a second call returns the stored learner.
    ///
    /// # Errors
    ///
    /// Returns `LearnerError::Storage` if the backend fails.
    pub fn initialize(&self) -> Result<Learner, LearnerError> {
        if let Some(existing) = self.store.load_learner()? {
            return Ok(existing);
        }

        let first_stage = self.catalog.first_stage().id();
        let learner = Learner::new(SessionId::generate(), first_stage);
        self.store.save_learner(&learner)?;
        self.store.set_session_start(self.clock.now())?;
        info!(session_id = %learner.session_id(), "initialized learner session");
        Ok(learner)
    }

    /// Returns the persisted learner.
    ///
    /// # Errors
    ///
    /// Returns `LearnerError::NotInitialized` if no learner has been
    /// persisted. Reads never auto-initialize.
    pub fn get(&self) -> Result<Learner, LearnerError> {
        self.store.load_learner()?.ok_or(LearnerError::NotInitialized)
    }

    fn mutate(&self, apply: impl FnOnce(&mut Learner)) -> Result<Learner, LearnerError> {
        let mut learner = self.get()?;
        apply(&mut learner);
        self.store.save_learner(&learner)?;
        Ok(learner)
    }

    /// Marks a stage in progress and counts the start.
    ///
    /// # Errors
    ///
    /// Returns `LearnerError` if the learner is missing or persisting fails.
    pub fn start_stage(&self, stage: StageId) -> Result<Learner, LearnerError> {
        debug!(%stage, "start stage");
        self.mutate(|learner| learner.start_stage(stage))
    }

    /// Marks a stage completed and optionally unlocks the next one.
    ///
    /// Does not re-validate prerequisites for `next`; choosing the correct
    /// next stage is the progression engine's job.
    ///
    /// # Errors
    ///
    /// Returns `LearnerError` if the learner is missing or persisting fails.
    pub fn complete_stage(
        &self,
        stage: StageId,
        next: Option<StageId>,
    ) -> Result<Learner, LearnerError> {
        debug!(%stage, ?next, "complete stage");
        self.mutate(|learner| learner.complete_stage(stage, next))
    }

    /// Flags a module completed and counts the view.
    ///
    /// # Errors
    ///
    /// Returns `LearnerError` if the learner is missing or persisting fails.
    pub fn complete_module(&self, module: ModuleId) -> Result<Learner, LearnerError> {
        debug!(%module, "complete module");
        self.mutate(|learner| learner.complete_module(module))
    }

    /// Bumps the stage quiz-attempt counter; invoked by the quiz engine
    /// when an attempt starts.
    ///
    /// # Errors
    ///
    /// Returns `LearnerError` if the learner is missing or persisting fails.
    pub fn note_quiz_attempt(&self, stage: StageId) -> Result<Learner, LearnerError> {
        self.mutate(|learner| learner.increment_quiz_attempts(stage))
    }

    /// Appends a completed attempt to the history, bumping the pass counter
    /// when it passed. One persist covers both changes.
    ///
    /// # Errors
    ///
    /// Returns `LearnerError` if the learner is missing or persisting fails.
    pub fn record_completed_attempt(
        &self,
        attempt: learner_core::model::QuizAttempt,
    ) -> Result<Learner, LearnerError> {
        self.mutate(|learner| {
            if attempt.passed() {
                learner.increment_quiz_passes(attempt.stage_id());
            }
            learner.record_attempt(attempt);
        })
    }

    /// Sets the learner's theme preference.
    ///
    /// # Errors
    ///
    /// Returns `LearnerError` if the learner is missing or persisting fails.
    pub fn set_theme(&self, theme: Option<Theme>) -> Result<Learner, LearnerError> {
        self.mutate(|learner| learner.set_theme(theme))
    }

    /// Counts one UI interaction.
    ///
    /// # Errors
    ///
    /// Returns `LearnerError` if the learner is missing or persisting fails.
    pub fn record_interaction(&self) -> Result<Learner, LearnerError> {
        self.mutate(Learner::record_interaction)
    }

    /// Recomputes the stored session duration from the session start stamp.
    ///
    /// Leaves the learner unchanged if no start stamp exists.
    ///
    /// # Errors
    ///
    /// Returns `LearnerError` if the learner is missing or persisting fails.
    pub fn update_session_duration(&self) -> Result<Learner, LearnerError> {
        let Some(start) = self.store.session_start()? else {
            return self.get();
        };
        let elapsed_ms = (self.clock.now() - start).num_milliseconds();
        self.mutate(|learner| learner.set_session_duration(elapsed_ms.max(0)))
    }

    /// Clears all persisted session state. A subsequent `get()` fails until
    /// `initialize()` runs again.
    ///
    /// # Errors
    ///
    /// Returns `LearnerError::Storage` if the backend fails.
    pub fn reset_session(&self) -> Result<(), LearnerError> {
        info!("resetting learner session");
        self.store.clear_all()?;
        Ok(())
    }

    // ─── Queries ───────────────────────────────────────────────────────────

    /// Percentage of stages completed, in [0, 100].
    ///
    /// # Errors
    ///
    /// Returns `LearnerError` if the learner is missing.
    pub fn overall_progress(&self) -> Result<f64, LearnerError> {
        let learner = self.get()?;
        let total = self.catalog.stages().len();
        if total == 0 {
            return Ok(0.0);
        }
        #[allow(clippy::cast_precision_loss)]
        let percent = learner.completed_stages().len() as f64 / total as f64 * 100.0;
        Ok(percent)
    }

    /// Stored session duration in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `LearnerError` if the learner is missing.
    pub fn session_duration_ms(&self) -> Result<i64, LearnerError> {
        Ok(self.get()?.session_counters().session_duration_ms())
    }

    /// Aggregated progress snapshot.
    ///
    /// # Errors
    ///
    /// Returns `LearnerError` if the learner is missing.
    pub fn progress_summary(&self) -> Result<ProgressSummary, LearnerError> {
        let learner = self.get()?;
        let total = self.catalog.stages().len();
        let completed = learner.completed_stages().len();
        #[allow(clippy::cast_precision_loss)]
        let percent_complete = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        let duration_ms = learner.session_counters().session_duration_ms();

        Ok(ProgressSummary {
            session_id: learner.session_id(),
            completed_stages: completed,
            total_stages: total,
            percent_complete,
            current_stage: learner.current_stage(),
            session_duration_ms: duration_ms,
            session_duration_minutes: duration_ms / 60_000,
            interaction_count: learner.session_counters().interaction_count(),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use chrono::Duration;
    use learner_core::model::StageStatus;
    use learner_core::time::{fixed_clock, fixed_now};

    #[test]
    fn test_initialize_creates_fresh_learner() {
        let svc = testing::learner_service();
        let learner = svc.initialize().unwrap();
        assert_eq!(
            learner.stage_status(StageId::Foundations),
            StageStatus::InProgress
        );
        for stage in &StageId::ALL[1..] {
            assert_eq!(learner.stage_status(*stage), StageStatus::Locked);
        }
        for stage in StageId::ALL {
            assert_eq!(learner.session_counters().stage_starts(stage), 0);
            assert_eq!(learner.session_counters().quiz_attempts(stage), 0);
            assert_eq!(learner.session_counters().quiz_passes(stage), 0);
        }
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let svc = testing::learner_service();
        let first = svc.initialize().unwrap();
        let second = svc.initialize().unwrap();
        assert_eq!(first.session_id(), second.session_id());
    }

    #[test]
    fn test_get_before_initialize_fails() {
        let svc = testing::learner_service();
        assert!(matches!(svc.get(), Err(LearnerError::NotInitialized)));
    }

    #[test]
    fn test_start_stage_persists() {
        let svc = testing::learner_service();
        svc.initialize().unwrap();
        svc.start_stage(StageId::Foundations).unwrap();
        let learner = svc.get().unwrap();
        assert_eq!(
            learner.session_counters().stage_starts(StageId::Foundations),
            1
        );
    }

    #[test]
    fn test_complete_module_persists() {
        let svc = testing::learner_service();
        svc.initialize().unwrap();
        let module = ModuleId::new(StageId::Foundations, 1);
        svc.complete_module(module).unwrap();
        let learner = svc.get().unwrap();
        assert!(learner.module_completed(module));
        assert_eq!(learner.session_counters().module_views(module), 1);
    }

    #[test]
    fn test_reset_session_forgets_everything() {
        let svc = testing::learner_service();
        svc.initialize().unwrap();
        svc.start_stage(StageId::Foundations).unwrap();
        svc.reset_session().unwrap();
        assert!(matches!(svc.get(), Err(LearnerError::NotInitialized)));
    }

    #[test]
    fn test_update_session_duration_uses_clock() {
        let store = testing::session_store();
        let mut clock = fixed_clock();
        let svc = LearnerService::new(store.clone(), testing::catalog(), clock);
        svc.initialize().unwrap();

        clock.advance(Duration::minutes(2));
        let svc = LearnerService::new(store, testing::catalog(), clock);
        let learner = svc.update_session_duration().unwrap();
        assert_eq!(
            learner.session_counters().session_duration_ms(),
            2 * 60 * 1000
        );
        assert_eq!(svc.session_duration_ms().unwrap(), 2 * 60 * 1000);
    }

    #[test]
    fn test_progress_summary() {
        let svc = testing::learner_service();
        svc.initialize().unwrap();
        svc.complete_stage(StageId::Foundations, Some(StageId::ArchitectureMessages))
            .unwrap();
        svc.record_interaction().unwrap();

        let summary = svc.progress_summary().unwrap();
        assert_eq!(summary.completed_stages, 1);
        assert_eq!(summary.total_stages, 5);
        assert!((summary.percent_complete - 20.0).abs() < f64::EPSILON);
        assert_eq!(summary.current_stage, Some(StageId::ArchitectureMessages));
        assert_eq!(summary.interaction_count, 1);
    }

    #[test]
    fn test_session_start_stamped_on_create() {
        let store = testing::session_store();
        let svc = LearnerService::new(store.clone(), testing::catalog(), fixed_clock());
        svc.initialize().unwrap();
        assert_eq!(store.session_start().unwrap(), Some(fixed_now()));
    }
}
