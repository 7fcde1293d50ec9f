use std::sync::Arc;

use learner_core::model::{Quiz, QuizAttempt};
use learner_core::{Clock, ContentCatalog};
use storage::{SessionStore, StorageGateway};

use crate::analytics_service::AnalyticsService;
use crate::error::QuizError;
use crate::feedback_service::FeedbackService;
use crate::learner_service::LearnerService;
use crate::progression::ProgressionService;
use crate::quiz_service::QuizService;

/// Assembles the service set over one storage gateway and one catalog.
///
/// The aggregate lives in injected storage, never in a module-level global,
/// so independent gateways give fully independent sessions.
#[derive(Clone)]
pub struct AppServices {
    learner: Arc<LearnerService>,
    quiz: QuizService,
    progression: ProgressionService,
    analytics: AnalyticsService,
    feedback: FeedbackService,
}

impl AppServices {
    #[must_use]
    pub fn new(gateway: Arc<dyn StorageGateway>, catalog: Arc<ContentCatalog>, clock: Clock) -> Self {
        let store = SessionStore::new(gateway);
        let learner = Arc::new(LearnerService::new(
            store.clone(),
            Arc::clone(&catalog),
            clock,
        ));
        let quiz = QuizService::new(Arc::clone(&learner), clock);
        let progression = ProgressionService::new(Arc::clone(&catalog), Arc::clone(&learner));
        let analytics = AnalyticsService::new(Arc::clone(&catalog));
        let feedback = FeedbackService::new(store, clock);

        Self {
            learner,
            quiz,
            progression,
            analytics,
            feedback,
        }
    }

    #[must_use]
    pub fn learner(&self) -> &LearnerService {
        &self.learner
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizService {
        &self.quiz
    }

    #[must_use]
    pub fn progression(&self) -> &ProgressionService {
        &self.progression
    }

    #[must_use]
    pub fn analytics(&self) -> &AnalyticsService {
        &self.analytics
    }

    #[must_use]
    pub fn feedback(&self) -> &FeedbackService {
        &self.feedback
    }

    /// Completes a quiz attempt and, on a pass, advances progression:
    /// the stage is marked completed and the next one in sequence unlocks.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` for scoring failures or when persisting either
    /// step fails.
    pub fn complete_quiz_attempt(
        &self,
        attempt: QuizAttempt,
        quiz: &Quiz,
    ) -> Result<QuizAttempt, QuizError> {
        let completed = self.quiz.complete_attempt(attempt, quiz)?;
        if completed.passed() {
            self.progression.apply_pass(completed.stage_id())?;
        }
        Ok(completed)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
