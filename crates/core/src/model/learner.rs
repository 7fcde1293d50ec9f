use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::attempt::QuizAttempt;
use crate::model::ids::{ModuleId, SessionId, StageId};

//
// ─── STATUS & PREFERENCES ──────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStatus {
    Locked,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    Light,
    Dark,
}

/// Free-form learner settings. No core invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

//
// ─── SESSION COUNTERS ──────────────────────────────────────────────────────────
//

/// Per-stage and per-module counters plus scalar session totals.
///
/// Every per-stage map holds an entry for every stage from the moment the
/// counters are created, so lookups never have to treat absence specially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCounters {
    stage_starts: BTreeMap<StageId, u32>,
    quiz_attempts: BTreeMap<StageId, u32>,
    quiz_passes: BTreeMap<StageId, u32>,
    module_views: BTreeMap<ModuleId, u32>,
    session_duration_ms: i64,
    interaction_count: u64,
}

fn zeroed_stage_map() -> BTreeMap<StageId, u32> {
    StageId::ALL.into_iter().map(|id| (id, 0)).collect()
}

impl SessionCounters {
    /// Creates counters zero-initialized for every stage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stage_starts: zeroed_stage_map(),
            quiz_attempts: zeroed_stage_map(),
            quiz_passes: zeroed_stage_map(),
            module_views: BTreeMap::new(),
            session_duration_ms: 0,
            interaction_count: 0,
        }
    }

    #[must_use]
    pub fn stage_starts(&self, stage: StageId) -> u32 {
        self.stage_starts.get(&stage).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn quiz_attempts(&self, stage: StageId) -> u32 {
        self.quiz_attempts.get(&stage).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn quiz_passes(&self, stage: StageId) -> u32 {
        self.quiz_passes.get(&stage).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn module_views(&self, module: ModuleId) -> u32 {
        self.module_views.get(&module).copied().unwrap_or(0)
    }

    /// Sum of quiz attempts across all stages.
    #[must_use]
    pub fn total_quiz_attempts(&self) -> u32 {
        self.quiz_attempts.values().sum()
    }

    /// Sum of quiz passes across all stages.
    #[must_use]
    pub fn total_quiz_passes(&self) -> u32 {
        self.quiz_passes.values().sum()
    }

    #[must_use]
    pub fn session_duration_ms(&self) -> i64 {
        self.session_duration_ms
    }

    #[must_use]
    pub fn interaction_count(&self) -> u64 {
        self.interaction_count
    }
}

impl Default for SessionCounters {
    fn default() -> Self {
        Self::new()
    }
}

//
// ─── LEARNER AGGREGATE ─────────────────────────────────────────────────────────
//

/// The single mutable aggregate for a learning session.
///
/// All state changes go through the narrow mutators below; there is no
/// general-purpose partial update. The quiz attempt history is append-only
/// and never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Learner {
    session_id: SessionId,
    stage_statuses: BTreeMap<StageId, StageStatus>,
    quiz_attempts: Vec<QuizAttempt>,
    module_completions: BTreeMap<ModuleId, bool>,
    preferences: Preferences,
    session_counters: SessionCounters,
}

impl Learner {
    /// Creates a fresh learner: every stage locked except `first_stage`,
    /// which starts in progress, with zeroed counters and empty history.
    #[must_use]
    pub fn new(session_id: SessionId, first_stage: StageId) -> Self {
        let mut stage_statuses: BTreeMap<StageId, StageStatus> = StageId::ALL
            .into_iter()
            .map(|id| (id, StageStatus::Locked))
            .collect();
        stage_statuses.insert(first_stage, StageStatus::InProgress);

        Self {
            session_id,
            stage_statuses,
            quiz_attempts: Vec::new(),
            module_completions: BTreeMap::new(),
            preferences: Preferences::default(),
            session_counters: SessionCounters::new(),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn stage_status(&self, stage: StageId) -> StageStatus {
        self.stage_statuses
            .get(&stage)
            .copied()
            .unwrap_or(StageStatus::Locked)
    }

    #[must_use]
    pub fn stage_statuses(&self) -> &BTreeMap<StageId, StageStatus> {
        &self.stage_statuses
    }

    /// Chronological, append-only attempt history.
    #[must_use]
    pub fn quiz_attempts(&self) -> &[QuizAttempt] {
        &self.quiz_attempts
    }

    #[must_use]
    pub fn attempts_for_stage(&self, stage: StageId) -> Vec<&QuizAttempt> {
        self.quiz_attempts
            .iter()
            .filter(|a| a.stage_id() == stage)
            .collect()
    }

    /// Absence means "not completed", same as an explicit false.
    #[must_use]
    pub fn module_completed(&self, module: ModuleId) -> bool {
        self.module_completions.get(&module).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn module_completions(&self) -> &BTreeMap<ModuleId, bool> {
        &self.module_completions
    }

    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    #[must_use]
    pub fn session_counters(&self) -> &SessionCounters {
        &self.session_counters
    }

    // ─── Mutators ──────────────────────────────────────────────────────────

    /// Marks the stage in progress and bumps its start counter.
    ///
    /// Never downgrades a completed stage; starting one again only counts
    /// the visit.
    pub fn start_stage(&mut self, stage: StageId) {
        if self.stage_status(stage) != StageStatus::Completed {
            self.stage_statuses.insert(stage, StageStatus::InProgress);
        }
        *self.session_counters.stage_starts.entry(stage).or_insert(0) += 1;
    }

    /// Marks the stage completed and, when given, unlocks the next stage.
    ///
    /// The choice of `next` belongs to the progression rules; this mutator
    /// applies it unconditionally.
    pub fn complete_stage(&mut self, stage: StageId, next: Option<StageId>) {
        self.stage_statuses.insert(stage, StageStatus::Completed);
        if let Some(next) = next {
            self.stage_statuses.insert(next, StageStatus::InProgress);
        }
    }

    /// Flags the module completed and bumps its view counter.
    pub fn complete_module(&mut self, module: ModuleId) {
        self.module_completions.insert(module, true);
        *self.session_counters.module_views.entry(module).or_insert(0) += 1;
    }

    /// Appends a completed attempt to the history. History entries are
    /// never modified or removed afterwards.
    pub fn record_attempt(&mut self, attempt: QuizAttempt) {
        self.quiz_attempts.push(attempt);
    }

    pub fn increment_quiz_attempts(&mut self, stage: StageId) {
        *self
            .session_counters
            .quiz_attempts
            .entry(stage)
            .or_insert(0) += 1;
    }

    pub fn increment_quiz_passes(&mut self, stage: StageId) {
        *self.session_counters.quiz_passes.entry(stage).or_insert(0) += 1;
    }

    pub fn record_interaction(&mut self) {
        self.session_counters.interaction_count += 1;
    }

    pub fn set_session_duration(&mut self, duration_ms: i64) {
        self.session_counters.session_duration_ms = duration_ms;
    }

    pub fn set_theme(&mut self, theme: Option<Theme>) {
        self.preferences.theme = theme;
    }

    // ─── Queries ───────────────────────────────────────────────────────────

    /// Stages marked completed, in canonical sequence order.
    #[must_use]
    pub fn completed_stages(&self) -> Vec<StageId> {
        StageId::ALL
            .into_iter()
            .filter(|id| self.stage_status(*id) == StageStatus::Completed)
            .collect()
    }

    #[must_use]
    pub fn has_completed(&self, stage: StageId) -> bool {
        self.stage_status(stage) == StageStatus::Completed
    }

    /// First in-progress stage in canonical order, if any.
    #[must_use]
    pub fn current_stage(&self) -> Option<StageId> {
        StageId::ALL
            .into_iter()
            .find(|id| self.stage_status(*id) == StageStatus::InProgress)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn new_learner() -> Learner {
        Learner::new(SessionId::generate(), StageId::Foundations)
    }

    #[test]
    fn test_new_learner_statuses() {
        let learner = new_learner();
        assert_eq!(
            learner.stage_status(StageId::Foundations),
            StageStatus::InProgress
        );
        for stage in &StageId::ALL[1..] {
            assert_eq!(learner.stage_status(*stage), StageStatus::Locked);
        }
        assert_eq!(learner.stage_statuses().len(), StageId::ALL.len());
    }

    #[test]
    fn test_new_learner_counters_zeroed_for_every_stage() {
        let learner = new_learner();
        for stage in StageId::ALL {
            assert_eq!(learner.session_counters().stage_starts(stage), 0);
            assert_eq!(learner.session_counters().quiz_attempts(stage), 0);
            assert_eq!(learner.session_counters().quiz_passes(stage), 0);
        }
        assert_eq!(learner.session_counters().session_duration_ms(), 0);
        assert_eq!(learner.session_counters().interaction_count(), 0);
        assert!(learner.quiz_attempts().is_empty());
        assert!(learner.module_completions().is_empty());
    }

    #[test]
    fn test_start_stage_counts_and_sets_status() {
        let mut learner = new_learner();
        learner.start_stage(StageId::ArchitectureMessages);
        assert_eq!(
            learner.stage_status(StageId::ArchitectureMessages),
            StageStatus::InProgress
        );
        assert_eq!(
            learner
                .session_counters()
                .stage_starts(StageId::ArchitectureMessages),
            1
        );
    }

    #[test]
    fn test_start_stage_does_not_downgrade_completed() {
        let mut learner = new_learner();
        learner.complete_stage(StageId::Foundations, None);
        learner.start_stage(StageId::Foundations);
        assert_eq!(
            learner.stage_status(StageId::Foundations),
            StageStatus::Completed
        );
        assert_eq!(
            learner.session_counters().stage_starts(StageId::Foundations),
            1
        );
    }

    #[test]
    fn test_complete_stage_unlocks_next() {
        let mut learner = new_learner();
        learner.complete_stage(StageId::Foundations, Some(StageId::ArchitectureMessages));
        assert_eq!(
            learner.stage_status(StageId::Foundations),
            StageStatus::Completed
        );
        assert_eq!(
            learner.stage_status(StageId::ArchitectureMessages),
            StageStatus::InProgress
        );
    }

    #[test]
    fn test_complete_module_is_idempotent_flag() {
        let mut learner = new_learner();
        let module = ModuleId::new(StageId::Foundations, 1);
        learner.complete_module(module);
        learner.complete_module(module);
        assert!(learner.module_completed(module));
        assert_eq!(learner.session_counters().module_views(module), 2);
    }

    #[test]
    fn test_module_absence_means_not_completed() {
        let learner = new_learner();
        assert!(!learner.module_completed(ModuleId::new(StageId::Mastery, 3)));
    }

    #[test]
    fn test_record_attempt_appends_in_order() {
        let mut learner = new_learner();
        let first = QuizAttempt::start("quiz-1", StageId::Foundations, fixed_now());
        let second = QuizAttempt::start("quiz-1", StageId::Foundations, fixed_now());
        let first_id = first.id();
        learner.record_attempt(first);
        learner.record_attempt(second);
        assert_eq!(learner.quiz_attempts().len(), 2);
        assert_eq!(learner.quiz_attempts()[0].id(), first_id);
    }

    #[test]
    fn test_completed_and_current_stage_queries() {
        let mut learner = new_learner();
        learner.complete_stage(StageId::Foundations, Some(StageId::ArchitectureMessages));
        assert_eq!(learner.completed_stages(), vec![StageId::Foundations]);
        assert_eq!(
            learner.current_stage(),
            Some(StageId::ArchitectureMessages)
        );
        assert!(learner.has_completed(StageId::Foundations));
        assert!(!learner.has_completed(StageId::Mastery));
    }

    #[test]
    fn test_learner_serde_roundtrip() {
        let mut learner = new_learner();
        learner.start_stage(StageId::Foundations);
        learner.complete_module(ModuleId::new(StageId::Foundations, 1));
        learner.set_theme(Some(Theme::Dark));
        let json = serde_json::to_string(&learner).unwrap();
        let back: Learner = serde_json::from_str(&json).unwrap();
        assert_eq!(back, learner);
    }
}
