use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::ids::{AttemptId, QuestionId, StageId};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("attempt {0} is already completed")]
    AlreadyCompleted(AttemptId),

    #[error("score must be in [0, 1], got {0}")]
    ScoreOutOfRange(f64),
}

/// One recorded answer within a quiz attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub question_id: QuestionId,
    pub selected_option_id: String,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent_secs: Option<u32>,
}

/// One quiz-taking episode, from start to completion.
///
/// An attempt is in progress while `completed_at` is unset. Completed
/// attempts are immutable; a retake is a brand-new attempt with a fresh id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    id: AttemptId,
    quiz_id: String,
    stage_id: StageId,
    timestamp: DateTime<Utc>,
    answers: Vec<QuizAnswer>,
    score: f64,
    passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
}

impl QuizAttempt {
    /// Starts a fresh in-progress attempt with no answers.
    #[must_use]
    pub fn start(quiz_id: impl Into<String>, stage_id: StageId, started_at: DateTime<Utc>) -> Self {
        Self {
            id: AttemptId::generate(),
            quiz_id: quiz_id.into(),
            stage_id,
            timestamp: started_at,
            answers: Vec::new(),
            score: 0.0,
            passed: false,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> AttemptId {
        self.id
    }

    #[must_use]
    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    #[must_use]
    pub fn stage_id(&self) -> StageId {
        self.stage_id
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn answers(&self) -> &[QuizAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Records an answer, replacing any prior answer for the same question.
    /// The last answer for a question wins.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::AlreadyCompleted` if the attempt is finished.
    pub fn submit_answer(mut self, answer: QuizAnswer) -> Result<Self, AttemptError> {
        if self.is_complete() {
            return Err(AttemptError::AlreadyCompleted(self.id));
        }
        if let Some(existing) = self
            .answers
            .iter_mut()
            .find(|a| a.question_id == answer.question_id)
        {
            *existing = answer;
        } else {
            self.answers.push(answer);
        }
        Ok(self)
    }

    /// Number of distinct questions answered correctly.
    ///
    /// Answers are deduplicated by question id with the last answer winning,
    /// so attempts rehydrated from storage with stray duplicates still score
    /// each question at most once.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        let mut latest: BTreeMap<&QuestionId, bool> = BTreeMap::new();
        for answer in &self.answers {
            latest.insert(&answer.question_id, answer.is_correct);
        }
        latest.values().filter(|correct| **correct).count()
    }

    /// Seals the attempt with its computed outcome.
    ///
    /// Invoked by the quiz engine once scoring is done; never call twice.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::AlreadyCompleted` on a finished attempt, or
    /// `AttemptError::ScoreOutOfRange` for a score outside [0, 1].
    pub fn complete(
        mut self,
        score: f64,
        passed: bool,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        if self.is_complete() {
            return Err(AttemptError::AlreadyCompleted(self.id));
        }
        if !(0.0..=1.0).contains(&score) {
            return Err(AttemptError::ScoreOutOfRange(score));
        }
        self.score = score;
        self.passed = passed;
        self.completed_at = Some(completed_at);
        Ok(self)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
