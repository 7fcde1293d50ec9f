//! Shared error types for the services crate.

use thiserror::Error;

use learner_core::model::{AttemptError, FeedbackError, StageId};
use storage::gateway::StorageError;

/// Errors emitted by `LearnerService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LearnerError {
    #[error("learner not initialized; call initialize() first")]
    NotInitialized,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz {quiz_id} has no questions")]
    EmptyQuiz { quiz_id: String },
    #[error("attempt belongs to quiz {expected}, not {got}")]
    QuizMismatch { expected: String, got: String },
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Learner(#[from] LearnerError),
}

/// Errors emitted by `AnalyticsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalyticsError {
    #[error("stage {0} not present in the content catalog")]
    UnknownStage(StageId),
}

/// Errors emitted by `FeedbackService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedbackServiceError {
    #[error("feedback limit reached ({max} entries)")]
    LimitReached { max: usize },
    #[error(transparent)]
    Entry(#[from] FeedbackError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
