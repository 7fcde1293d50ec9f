use std::sync::Arc;

use tracing::info;

use learner_core::model::{Learner, Stage, StageId};
use learner_core::ContentCatalog;

use crate::error::LearnerError;
use crate::learner_service::LearnerService;

/// Decides which stage, if any, unlocks when a quiz is passed.
///
/// Unlocking is strictly sequential: passing stage N unlocks the stage with
/// sequence order N+1, without consulting prerequisite sets. Prerequisite
/// sets drive the read-only accessibility queries used for display gating
/// only. The two can disagree for multi-prerequisite stages out of linear
/// order; that asymmetry is intentional.
#[derive(Clone)]
pub struct ProgressionService {
    catalog: Arc<ContentCatalog>,
    learner: Arc<LearnerService>,
}

impl ProgressionService {
    #[must_use]
    pub fn new(catalog: Arc<ContentCatalog>, learner: Arc<LearnerService>) -> Self {
        Self { catalog, learner }
    }

    /// Applies a quiz pass for `stage`: marks it completed and unlocks the
    /// next stage in sequence. The last stage completes without a new
    /// unlock.
    ///
    /// # Errors
    ///
    /// Returns `LearnerError` if the learner is missing or persisting fails.
    pub fn apply_pass(&self, stage: StageId) -> Result<Learner, LearnerError> {
        let next = self.catalog.next_after(stage);
        info!(%stage, ?next, "quiz passed, advancing progression");
        self.learner.complete_stage(stage, next)
    }

    /// Stages whose every prerequisite the learner has completed, plus
    /// stages with no prerequisites at all.
    #[must_use]
    pub fn accessible_stages<'a>(&'a self, learner: &Learner) -> Vec<&'a Stage> {
        self.catalog
            .stages()
            .iter()
            .filter(|stage| {
                stage
                    .prerequisites()
                    .iter()
                    .all(|prereq| learner.has_completed(*prereq))
            })
            .collect()
    }

    /// Stages whose prerequisites are not yet met.
    #[must_use]
    pub fn locked_stages<'a>(&'a self, learner: &Learner) -> Vec<&'a Stage> {
        let accessible: Vec<StageId> = self
            .accessible_stages(learner)
            .iter()
            .map(|s| s.id())
            .collect();
        self.catalog
            .stages()
            .iter()
            .filter(|stage| !accessible.contains(&stage.id()))
            .collect()
    }

    /// First non-completed stage whose prerequisites are all met, if any.
    #[must_use]
    pub fn next_stage<'a>(&'a self, learner: &Learner) -> Option<&'a Stage> {
        self.catalog.stages().iter().find(|stage| {
            !learner.has_completed(stage.id())
                && stage
                    .prerequisites()
                    .iter()
                    .all(|prereq| learner.has_completed(*prereq))
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
