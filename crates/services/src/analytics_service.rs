use std::fmt;
use std::sync::Arc;

use learner_core::mastery::{calculate_mastery, MasteryLevel};
use learner_core::model::{FeedbackEntry, Learner, SessionId, StageId, StageStatus};
use learner_core::ContentCatalog;

use crate::error::AnalyticsError;
use crate::feedback_service::FeedbackStats;
use crate::quiz_service::QuizStats;

//
// ─── DERIVED VIEWS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SessionAnalytics {
    pub session_id: SessionId,
    pub duration_minutes: i64,
    pub completed_stages: usize,
    pub total_stages: usize,
    pub overall_progress: f64,
    pub interactions: u64,
    pub mastery_percentage: u8,
    pub mastery_level: MasteryLevel,
    pub feedback_count: usize,
    pub sentiment: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StageAnalytics {
    pub stage_id: StageId,
    pub stage_name: String,
    pub status: StageStatus,
    pub starts: u32,
    pub completed_modules: usize,
    pub total_modules: usize,
    pub module_completion: f64,
    pub quiz_attempts: u32,
    pub quiz_passes: u32,
    pub quiz_best_score: f64,
    pub quiz_average_score: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct QuizPerformance {
    pub total_attempts: u32,
    pub total_passes: u32,
    pub pass_rate: f64,
    /// Mean of each stage's best score.
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct EngagementMetrics {
    pub session_duration_minutes: i64,
    pub interaction_count: u64,
    pub module_completion_rate: f64,
    pub feedback_provided: usize,
    pub interactions_per_minute: f64,
}

/// Threshold-based badges earned during the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Milestone {
    FirstStageComplete,
    HalfwayThere,
    AllStagesComplete,
    QuizExpert,
    OneHourDedication,
    ThreeHoursOfLearning,
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Milestone::FirstStageComplete => "First Stage Complete",
            Milestone::HalfwayThere => "Halfway There",
            Milestone::AllStagesComplete => "All Stages Complete",
            Milestone::QuizExpert => "Quiz Expert",
            Milestone::OneHourDedication => "1 Hour Dedication",
            Milestone::ThreeHoursOfLearning => "3 Hours of Learning",
        };
        f.write_str(name)
    }
}

const QUIZ_EXPERT_PASSES: u32 = 3;
const DEDICATION_MINUTES: i64 = 60;
const MARATHON_MINUTES: i64 = 180;

//
// ─── ANALYTICS SERVICE ─────────────────────────────────────────────────────────
//

/// Derives aggregate metrics from learner state and the catalog.
///
/// Every method is a deterministic function of its arguments; nothing here
/// reads or writes storage, so shuffled inputs with equal content produce
/// equal outputs.
#[derive(Clone)]
pub struct AnalyticsService {
    catalog: Arc<ContentCatalog>,
}

impl AnalyticsService {
    #[must_use]
    pub fn new(catalog: Arc<ContentCatalog>) -> Self {
        Self { catalog }
    }

    /// Comprehensive session-level view.
    #[must_use]
    pub fn session_analytics(
        &self,
        learner: &Learner,
        feedback: &[FeedbackEntry],
    ) -> SessionAnalytics {
        let total_stages = self.catalog.stages().len();
        let completed_stages = learner.completed_stages().len();
        #[allow(clippy::cast_precision_loss)]
        let overall_progress = if total_stages == 0 {
            0.0
        } else {
            completed_stages as f64 / total_stages as f64 * 100.0
        };
        let mastery_percentage = calculate_mastery(learner);
        let feedback_stats = FeedbackStats::from_entries(feedback);

        SessionAnalytics {
            session_id: learner.session_id(),
            duration_minutes: learner.session_counters().session_duration_ms() / 60_000,
            completed_stages,
            total_stages,
            overall_progress,
            interactions: learner.session_counters().interaction_count(),
            mastery_percentage,
            mastery_level: MasteryLevel::from_percentage(mastery_percentage),
            feedback_count: feedback_stats.total,
            sentiment: feedback_stats.sentiment,
        }
    }

    /// Per-stage progress and quiz performance.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::UnknownStage` if the catalog has no such
    /// stage.
    pub fn stage_analytics(
        &self,
        learner: &Learner,
        stage_id: StageId,
    ) -> Result<StageAnalytics, AnalyticsError> {
        let stage = self
            .catalog
            .stage(stage_id)
            .ok_or(AnalyticsError::UnknownStage(stage_id))?;

        let total_modules = stage.modules().len();
        let completed_modules = stage
            .modules()
            .iter()
            .filter(|m| learner.module_completed(m.id()))
            .count();
        #[allow(clippy::cast_precision_loss)]
        let module_completion = if total_modules == 0 {
            0.0
        } else {
            completed_modules as f64 / total_modules as f64
        };
        let quiz_stats = QuizStats::from_attempts(&learner.attempts_for_stage(stage_id));

        Ok(StageAnalytics {
            stage_id,
            stage_name: stage.name().to_string(),
            status: learner.stage_status(stage_id),
            starts: learner.session_counters().stage_starts(stage_id),
            completed_modules,
            total_modules,
            module_completion,
            quiz_attempts: learner.session_counters().quiz_attempts(stage_id),
            quiz_passes: learner.session_counters().quiz_passes(stage_id),
            quiz_best_score: quiz_stats.best_score,
            quiz_average_score: quiz_stats.average_score,
        })
    }

    /// Stage analytics for every stage in sequence order.
    #[must_use]
    pub fn all_stage_analytics(&self, learner: &Learner) -> Vec<StageAnalytics> {
        self.catalog
            .stages()
            .iter()
            .filter_map(|stage| self.stage_analytics(learner, stage.id()).ok())
            .collect()
    }

    /// Quiz performance across the whole session.
    #[must_use]
    pub fn quiz_performance(&self, learner: &Learner) -> QuizPerformance {
        let total_attempts = learner.session_counters().total_quiz_attempts();
        let total_passes = learner.session_counters().total_quiz_passes();
        let pass_rate = if total_attempts == 0 {
            0.0
        } else {
            f64::from(total_passes) / f64::from(total_attempts)
        };

        let stage_count = self.catalog.stages().len();
        #[allow(clippy::cast_precision_loss)]
        let average_score = if stage_count == 0 {
            0.0
        } else {
            self.catalog
                .stages()
                .iter()
                .map(|stage| {
                    QuizStats::from_attempts(&learner.attempts_for_stage(stage.id())).best_score
                })
                .sum::<f64>()
                / stage_count as f64
        };

        QuizPerformance {
            total_attempts,
            total_passes,
            pass_rate,
            average_score,
        }
    }

    /// Engagement view over duration, interactions and module coverage.
    #[must_use]
    pub fn engagement(&self, learner: &Learner, feedback: &[FeedbackEntry]) -> EngagementMetrics {
        let duration_minutes = learner.session_counters().session_duration_ms() / 60_000;
        let total_modules = self.catalog.total_modules();
        let completed_modules = learner
            .module_completions()
            .values()
            .filter(|done| **done)
            .count();
        #[allow(clippy::cast_precision_loss)]
        let module_completion_rate = if total_modules == 0 {
            0.0
        } else {
            completed_modules as f64 / total_modules as f64
        };
        #[allow(clippy::cast_precision_loss)]
        let interactions_per_minute = if duration_minutes <= 0 {
            0.0
        } else {
            learner.session_counters().interaction_count() as f64 / duration_minutes as f64
        };

        EngagementMetrics {
            session_duration_minutes: duration_minutes,
            interaction_count: learner.session_counters().interaction_count(),
            module_completion_rate,
            feedback_provided: feedback.len(),
            interactions_per_minute,
        }
    }

    /// Stages completed per hour of session time; 0 when no time elapsed.
    #[must_use]
    pub fn learning_velocity(&self, learner: &Learner) -> f64 {
        let hours =
            learner.session_counters().session_duration_ms() as f64 / f64::from(3_600_000);
        if hours <= 0.0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let velocity = learner.completed_stages().len() as f64 / hours;
        velocity
    }

    /// Estimated minutes until the curriculum is done.
    ///
    /// Falls back to the catalog's static estimate until at least one stage
    /// is completed; afterwards extrapolates from the observed pace.
    #[must_use]
    pub fn estimated_completion_minutes(&self, learner: &Learner) -> f64 {
        let completed = learner.completed_stages();
        let remaining_estimate =
            f64::from(self.catalog.remaining_estimated_minutes(&completed));
        if completed.is_empty() {
            return remaining_estimate;
        }

        let elapsed_minutes =
            learner.session_counters().session_duration_ms() as f64 / 60_000.0;
        if elapsed_minutes <= 0.0 {
            return remaining_estimate;
        }

        #[allow(clippy::cast_precision_loss)]
        let per_stage = elapsed_minutes / completed.len() as f64;
        #[allow(clippy::cast_precision_loss)]
        let remaining_stages = (self.catalog.stages().len() - completed.len()) as f64;
        per_stage * remaining_stages
    }

    /// Badges earned so far, in a stable order.
    #[must_use]
    pub fn milestones(&self, learner: &Learner) -> Vec<Milestone> {
        let mut milestones = Vec::new();
        let completed = learner.completed_stages().len();
        let total = self.catalog.stages().len();
        let duration_minutes = learner.session_counters().session_duration_ms() / 60_000;

        if completed >= 1 {
            milestones.push(Milestone::FirstStageComplete);
        }
        if total > 0 && completed * 2 >= total {
            milestones.push(Milestone::HalfwayThere);
        }
        if total > 0 && completed >= total {
            milestones.push(Milestone::AllStagesComplete);
        }
        if learner.session_counters().total_quiz_passes() >= QUIZ_EXPERT_PASSES {
            milestones.push(Milestone::QuizExpert);
        }
        if duration_minutes >= DEDICATION_MINUTES {
            milestones.push(Milestone::OneHourDedication);
        }
        if duration_minutes >= MARATHON_MINUTES {
            milestones.push(Milestone::ThreeHoursOfLearning);
        }
        milestones
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
