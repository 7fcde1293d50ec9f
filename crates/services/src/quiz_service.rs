use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use learner_core::model::{ConceptId, QuestionId, Quiz, QuizAnswer, QuizAttempt, StageId};
use learner_core::Clock;

use crate::error::QuizError;
use crate::learner_service::LearnerService;

//
// ─── DERIVED STATISTICS ────────────────────────────────────────────────────────
//

/// Aggregate statistics over a stage's attempt history.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct QuizStats {
    pub total_attempts: usize,
    pub best_score: f64,
    pub average_score: f64,
    pub passed: bool,
    /// 1-based index of the first passing attempt in chronological order.
    pub passed_on_attempt: Option<usize>,
}

impl QuizStats {
    /// Folds a chronological attempt list into stats. Pure.
    #[must_use]
    pub fn from_attempts(attempts: &[&QuizAttempt]) -> Self {
        if attempts.is_empty() {
            return Self {
                total_attempts: 0,
                best_score: 0.0,
                average_score: 0.0,
                passed: false,
                passed_on_attempt: None,
            };
        }

        let best_score = attempts.iter().map(|a| a.score()).fold(0.0, f64::max);
        #[allow(clippy::cast_precision_loss)]
        let average_score =
            attempts.iter().map(|a| a.score()).sum::<f64>() / attempts.len() as f64;
        let passed_on_attempt = attempts.iter().position(|a| a.passed()).map(|i| i + 1);

        Self {
            total_attempts: attempts.len(),
            best_score,
            average_score,
            passed: passed_on_attempt.is_some(),
            passed_on_attempt,
        }
    }
}

/// Per-concept answer tally across a stage's attempt history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct ConceptTally {
    pub correct: u32,
    pub total: u32,
}

impl ConceptTally {
    /// Fraction of answers that were correct. Zero answers means an
    /// undefined accuracy; callers must exclude those, so this returns 1.0
    /// to keep an unanswered concept out of the "weak" bucket.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        f64::from(self.correct) / f64::from(self.total)
    }
}

/// Completeness check for an attempt against its quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptValidation {
    pub missing: Vec<QuestionId>,
}

impl AttemptValidation {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

const WEAK_CONCEPT_THRESHOLD: f64 = 0.5;

//
// ─── QUIZ SERVICE ──────────────────────────────────────────────────────────────
//

/// Manages the quiz attempt lifecycle and derived statistics.
///
/// Attempts move NotStarted → InProgress → Completed; completion is
/// terminal and a retake is always a brand-new attempt. All learner state
/// changes go through `LearnerService`.
#[derive(Clone)]
pub struct QuizService {
    learner: Arc<LearnerService>,
    clock: Clock,
}

impl QuizService {
    #[must_use]
    pub fn new(learner: Arc<LearnerService>, clock: Clock) -> Self {
        Self { learner, clock }
    }

    /// Starts a new in-progress attempt and counts it against the stage.
    ///
    /// Nothing prevents several in-progress attempts for the same stage;
    /// each call yields a fresh id and abandoned attempts are simply never
    /// completed.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the learner is missing or persisting fails.
    pub fn start_attempt(&self, quiz: &Quiz) -> Result<QuizAttempt, QuizError> {
        let attempt = QuizAttempt::start(quiz.id(), quiz.stage_id(), self.clock.now());
        self.learner.note_quiz_attempt(quiz.stage_id())?;
        debug!(quiz = quiz.id(), attempt = %attempt.id(), "started quiz attempt");
        Ok(attempt)
    }

    /// Records an answer on an in-progress attempt. The last answer for a
    /// question wins.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Attempt` if the attempt is already completed.
    pub fn submit_answer(
        &self,
        attempt: QuizAttempt,
        question_id: QuestionId,
        selected_option_id: impl Into<String>,
        is_correct: bool,
        time_spent_secs: Option<u32>,
    ) -> Result<QuizAttempt, QuizError> {
        let answer = QuizAnswer {
            question_id,
            selected_option_id: selected_option_id.into(),
            is_correct,
            time_spent_secs,
        };
        Ok(attempt.submit_answer(answer)?)
    }

    /// Scores and seals an attempt, then appends it to the learner history.
    ///
    /// The score always divides by the quiz's declared question count, so an
    /// attempt submitted with fewer answers than questions treats the
    /// unanswered remainder as incorrect.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::QuizMismatch` if the attempt belongs to a
    /// different quiz, `QuizError::EmptyQuiz` for a quiz with no questions,
    /// or `QuizError::Attempt` if the attempt is already completed.
    pub fn complete_attempt(
        &self,
        attempt: QuizAttempt,
        quiz: &Quiz,
    ) -> Result<QuizAttempt, QuizError> {
        if attempt.quiz_id() != quiz.id() {
            return Err(QuizError::QuizMismatch {
                expected: attempt.quiz_id().to_string(),
                got: quiz.id().to_string(),
            });
        }
        let total_questions = quiz.questions().len();
        if total_questions == 0 {
            // Never score 0/0; a question-less quiz is a content defect.
            return Err(QuizError::EmptyQuiz {
                quiz_id: quiz.id().to_string(),
            });
        }

        #[allow(clippy::cast_precision_loss)]
        let score = attempt.correct_count() as f64 / total_questions as f64;
        let passed = score >= quiz.passing_threshold();
        let completed = attempt.complete(score, passed, self.clock.now())?;

        info!(
            quiz = quiz.id(),
            attempt = %completed.id(),
            score,
            passed,
            "completed quiz attempt"
        );
        self.learner.record_completed_attempt(completed.clone())?;
        Ok(completed)
    }

    /// Stats over all recorded attempts for a stage.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Learner` if the learner is missing.
    pub fn stats(&self, stage: StageId) -> Result<QuizStats, QuizError> {
        let learner = self.learner.get()?;
        Ok(QuizStats::from_attempts(&learner.attempts_for_stage(stage)))
    }

    /// Latest attempt for a stage by start time, if any.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Learner` if the learner is missing.
    pub fn latest_attempt(&self, stage: StageId) -> Result<Option<QuizAttempt>, QuizError> {
        let learner = self.learner.get()?;
        Ok(learner
            .attempts_for_stage(stage)
            .into_iter()
            .max_by_key(|a| a.timestamp())
            .cloned())
    }

    /// Whether any recorded attempt for the stage passed.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Learner` if the learner is missing.
    pub fn has_passed(&self, stage: StageId) -> Result<bool, QuizError> {
        let learner = self.learner.get()?;
        Ok(learner.attempts_for_stage(stage).iter().any(|a| a.passed()))
    }

    /// Per-concept answer tallies across all attempts for a stage, keyed by
    /// the concept tag of each answered question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Learner` if the learner is missing.
    pub fn concept_accuracy(
        &self,
        stage: StageId,
        quiz: &Quiz,
    ) -> Result<BTreeMap<ConceptId, ConceptTally>, QuizError> {
        let learner = self.learner.get()?;
        let mut tallies: BTreeMap<ConceptId, ConceptTally> = BTreeMap::new();

        for attempt in learner.attempts_for_stage(stage) {
            for answer in attempt.answers() {
                let Some(question) = quiz.question(&answer.question_id) else {
                    continue;
                };
                let tally = tallies.entry(question.concept().clone()).or_default();
                tally.total += 1;
                if answer.is_correct {
                    tally.correct += 1;
                }
            }
        }

        Ok(tallies)
    }

    /// Concepts answered with accuracy below 0.5 across all attempts for
    /// the stage. Concepts never answered are excluded, not weak.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Learner` if the learner is missing.
    pub fn weak_concepts(&self, stage: StageId, quiz: &Quiz) -> Result<Vec<ConceptId>, QuizError> {
        let tallies = self.concept_accuracy(stage, quiz)?;
        Ok(tallies
            .into_iter()
            .filter(|(_, tally)| tally.total > 0 && tally.accuracy() < WEAK_CONCEPT_THRESHOLD)
            .map(|(concept, _)| concept)
            .collect())
    }

    /// Lists the quiz questions the attempt has not answered yet.
    #[must_use]
    pub fn validate_attempt(&self, attempt: &QuizAttempt, quiz: &Quiz) -> AttemptValidation {
        let answered: Vec<&QuestionId> =
            attempt.answers().iter().map(|a| &a.question_id).collect();
        let missing = quiz
            .questions()
            .iter()
            .map(|q| q.id().clone())
            .filter(|id| !answered.contains(&id))
            .collect();
        AttemptValidation { missing }
    }

    /// Mean seconds spent per answered question, over answers that recorded
    /// a time. Zero when no answer carries a time.
    #[must_use]
    pub fn average_time_per_question(&self, attempt: &QuizAttempt) -> f64 {
        let timed: Vec<u32> = attempt
            .answers()
            .iter()
            .filter_map(|a| a.time_spent_secs)
            .collect();
        if timed.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = f64::from(timed.iter().sum::<u32>()) / timed.len() as f64;
        mean
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
