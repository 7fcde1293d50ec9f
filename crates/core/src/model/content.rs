use thiserror::Error;

use crate::model::ids::{ConceptId, ModuleId, QuestionId, StageId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ContentError {
    #[error("question {0} must offer at least {MIN_OPTIONS} options")]
    TooFewOptions(QuestionId),

    #[error("question {0} has no option flagged correct")]
    NoCorrectOption(QuestionId),

    #[error("question {0} has more than one option flagged correct")]
    MultipleCorrectOptions(QuestionId),

    #[error("quiz {0} has no questions")]
    EmptyQuiz(String),

    #[error("passing threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("module {module} does not belong to stage {stage}")]
    ModuleStageMismatch { module: ModuleId, stage: StageId },

    #[error("quiz {quiz} does not belong to stage {stage}")]
    QuizStageMismatch { quiz: String, stage: StageId },

    #[error("stage name cannot be empty")]
    EmptyStageName,
}

//
// ─── VALIDATION LIMITS ─────────────────────────────────────────────────────────
//

/// Minimum number of options per question.
pub const MIN_OPTIONS: usize = 2;

/// Authoring guidelines for quizzes. Advisory bounds checked by
/// `ContentCatalog::validate_authoring`, not hard construction rules.
pub mod quiz_validation {
    pub const MIN_QUESTIONS: usize = 5;
    pub const MAX_QUESTIONS: usize = 8;
    pub const MIN_OPTIONS: usize = 3;
    pub const MAX_OPTIONS: usize = 5;
    pub const PASSING_THRESHOLD: f64 = 0.7;
}

/// Hard limits on session-scoped collections.
pub mod session_limits {
    pub const MAX_QUIZ_ATTEMPTS: usize = 50;
    pub const MAX_FEEDBACK_ENTRIES: usize = 20;
    pub const MAX_COMMENT_LENGTH: usize = 140;
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One selectable answer option for a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOption {
    id: String,
    text: String,
    is_correct: bool,
}

impl QuestionOption {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_correct,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}

/// A quiz question with exactly one correct option.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<QuestionOption>,
    concept: ConceptId,
    difficulty: Difficulty,
    rationale: String,
}

impl Question {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if fewer than two options are given or the
    /// options do not contain exactly one correct answer.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<QuestionOption>,
        concept: ConceptId,
        difficulty: Difficulty,
        rationale: impl Into<String>,
    ) -> Result<Self, ContentError> {
        if options.len() < MIN_OPTIONS {
            return Err(ContentError::TooFewOptions(id));
        }
        let correct = options.iter().filter(|o| o.is_correct()).count();
        if correct == 0 {
            return Err(ContentError::NoCorrectOption(id));
        }
        if correct > 1 {
            return Err(ContentError::MultipleCorrectOptions(id));
        }

        Ok(Self {
            id,
            prompt: prompt.into(),
            options,
            concept,
            difficulty,
            rationale: rationale.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }

    /// The single option flagged correct.
    #[must_use]
    pub fn correct_option(&self) -> &QuestionOption {
        // Invariant from `new`: exactly one correct option exists.
        self.options
            .iter()
            .find(|o| o.is_correct())
            .unwrap_or(&self.options[0])
    }

    /// Returns true if the given option id is the correct answer.
    #[must_use]
    pub fn is_correct_answer(&self, option_id: &str) -> bool {
        self.correct_option().id() == option_id
    }

    #[must_use]
    pub fn concept(&self) -> &ConceptId {
        &self.concept
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn rationale(&self) -> &str {
        &self.rationale
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// The gating quiz for a stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    id: String,
    stage_id: StageId,
    questions: Vec<Question>,
    passing_threshold: f64,
}

impl Quiz {
    /// Creates a validated quiz.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::EmptyQuiz` for a quiz with no questions and
    /// `ContentError::InvalidThreshold` unless the threshold is in (0, 1].
    pub fn new(
        id: impl Into<String>,
        stage_id: StageId,
        questions: Vec<Question>,
        passing_threshold: f64,
    ) -> Result<Self, ContentError> {
        let id = id.into();
        if questions.is_empty() {
            return Err(ContentError::EmptyQuiz(id));
        }
        if !(passing_threshold > 0.0 && passing_threshold <= 1.0) {
            return Err(ContentError::InvalidThreshold(passing_threshold));
        }

        Ok(Self {
            id,
            stage_id,
            questions,
            passing_threshold,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn stage_id(&self) -> StageId {
        self.stage_id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn passing_threshold(&self) -> f64 {
        self.passing_threshold
    }
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

/// A single lesson unit within a stage. The rendered content body lives in
/// the presentation layer; the core only tracks identity and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    id: ModuleId,
    title: String,
    estimated_minutes: u32,
    related_concepts: Vec<ConceptId>,
}

impl Module {
    /// Creates a module belonging to the stage encoded in its id.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::ModuleStageMismatch` if `stage` does not match
    /// the stage prefix of `id`.
    pub fn new(
        id: ModuleId,
        stage: StageId,
        title: impl Into<String>,
        estimated_minutes: u32,
        related_concepts: Vec<ConceptId>,
    ) -> Result<Self, ContentError> {
        if id.stage() != stage {
            return Err(ContentError::ModuleStageMismatch { module: id, stage });
        }
        Ok(Self {
            id,
            title: title.into(),
            estimated_minutes,
            related_concepts,
        })
    }

    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    #[must_use]
    pub fn stage_id(&self) -> StageId {
        self.id.stage()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn estimated_minutes(&self) -> u32 {
        self.estimated_minutes
    }

    #[must_use]
    pub fn related_concepts(&self) -> &[ConceptId] {
        &self.related_concepts
    }
}

//
// ─── STAGE ─────────────────────────────────────────────────────────────────────
//

/// A top-level curriculum unit: modules plus one gating quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    id: StageId,
    name: String,
    sequence_order: u32,
    prerequisites: Vec<StageId>,
    modules: Vec<Module>,
    quiz: Quiz,
    estimated_minutes: u32,
    concepts: Vec<ConceptId>,
}

impl Stage {
    /// Creates a validated stage.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the name is empty, a module belongs to a
    /// different stage, or the quiz's stage id does not match.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: StageId,
        name: impl Into<String>,
        sequence_order: u32,
        prerequisites: Vec<StageId>,
        modules: Vec<Module>,
        quiz: Quiz,
        estimated_minutes: u32,
        concepts: Vec<ConceptId>,
    ) -> Result<Self, ContentError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ContentError::EmptyStageName);
        }
        if let Some(module) = modules.iter().find(|m| m.stage_id() != id) {
            return Err(ContentError::ModuleStageMismatch {
                module: module.id(),
                stage: id,
            });
        }
        if quiz.stage_id() != id {
            return Err(ContentError::QuizStageMismatch {
                quiz: quiz.id().to_string(),
                stage: id,
            });
        }

        Ok(Self {
            id,
            name,
            sequence_order,
            prerequisites,
            modules,
            quiz,
            estimated_minutes,
            concepts,
        })
    }

    #[must_use]
    pub fn id(&self) -> StageId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based position in the curriculum sequence.
    #[must_use]
    pub fn sequence_order(&self) -> u32 {
        self.sequence_order
    }

    #[must_use]
    pub fn prerequisites(&self) -> &[StageId] {
        &self.prerequisites
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn estimated_minutes(&self) -> u32 {
        self.estimated_minutes
    }

    #[must_use]
    pub fn concepts(&self) -> &[ConceptId] {
        &self.concepts
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
