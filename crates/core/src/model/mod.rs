pub mod attempt;
pub mod content;
pub mod feedback;
pub mod ids;
mod learner;

pub use attempt::{AttemptError, QuizAnswer, QuizAttempt};
pub use content::{
    ContentError, Difficulty, Module, Question, QuestionOption, Quiz, Stage,
};
pub use feedback::{FeedbackContext, FeedbackEntry, FeedbackError, FeedbackKind};
pub use ids::{
    AttemptId, ConceptId, FeedbackId, ModuleId, ParseIdError, QuestionId, SessionId, StageId,
};
pub use learner::{Learner, Preferences, SessionCounters, StageStatus, Theme};
