use std::collections::BTreeSet;
use thiserror::Error;

use crate::model::content::{quiz_validation, Module, Quiz, Stage};
use crate::model::ids::{ConceptId, ModuleId, StageId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("stage {0} appears more than once")]
    DuplicateStage(StageId),

    #[error("stage {0} is missing from the catalog")]
    MissingStage(StageId),

    #[error("sequence orders must be contiguous 1..={expected}, found {found}")]
    BadSequenceOrder { expected: u32, found: u32 },

    #[error("duplicate sequence order {0}")]
    DuplicateSequenceOrder(u32),
}

/// The read-only curriculum: an ordered, validated set of stages.
///
/// Immutable at runtime. Construction checks the structural invariants the
/// rest of the core relies on, so downstream lookups can stay simple.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentCatalog {
    stages: Vec<Stage>,
}

impl ContentCatalog {
    /// Builds a catalog from stages, validating coverage and ordering.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if any stage id is duplicated or missing, or
    /// if sequence orders are not a contiguous, unique 1-based run.
    pub fn new(mut stages: Vec<Stage>) -> Result<Self, CatalogError> {
        let mut seen = BTreeSet::new();
        for stage in &stages {
            if !seen.insert(stage.id()) {
                return Err(CatalogError::DuplicateStage(stage.id()));
            }
        }
        for id in StageId::ALL {
            if !seen.contains(&id) {
                return Err(CatalogError::MissingStage(id));
            }
        }

        stages.sort_by_key(Stage::sequence_order);
        let mut orders = BTreeSet::new();
        for (i, stage) in stages.iter().enumerate() {
            let expected = u32::try_from(i).unwrap_or(u32::MAX) + 1;
            if !orders.insert(stage.sequence_order()) {
                return Err(CatalogError::DuplicateSequenceOrder(stage.sequence_order()));
            }
            if stage.sequence_order() != expected {
                return Err(CatalogError::BadSequenceOrder {
                    expected,
                    found: stage.sequence_order(),
                });
            }
        }

        Ok(Self { stages })
    }

    /// All stages, ordered by sequence.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    #[must_use]
    pub fn stage(&self, id: StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id() == id)
    }

    #[must_use]
    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.stage(id.stage())
            .and_then(|stage| stage.modules().iter().find(|m| m.id() == id))
    }

    #[must_use]
    pub fn quiz_for(&self, stage: StageId) -> Option<&Quiz> {
        self.stage(stage).map(Stage::quiz)
    }

    /// The stage with sequence order 1.
    #[must_use]
    pub fn first_stage(&self) -> &Stage {
        // Invariant from `new`: orders run 1..=N, so index 0 is order 1.
        &self.stages[0]
    }

    /// The stage immediately after `stage` by sequence order, if any.
    #[must_use]
    pub fn next_after(&self, stage: StageId) -> Option<StageId> {
        let order = self.stage(stage)?.sequence_order();
        self.stages
            .iter()
            .find(|s| s.sequence_order() == order + 1)
            .map(Stage::id)
    }

    /// Every concept tag used anywhere in the curriculum, deduplicated
    /// and sorted.
    #[must_use]
    pub fn all_concepts(&self) -> Vec<ConceptId> {
        let mut concepts: BTreeSet<ConceptId> = BTreeSet::new();
        for stage in &self.stages {
            concepts.extend(stage.concepts().iter().cloned());
        }
        concepts.into_iter().collect()
    }

    #[must_use]
    pub fn total_modules(&self) -> usize {
        self.stages.iter().map(|s| s.modules().len()).sum()
    }

    #[must_use]
    pub fn total_estimated_minutes(&self) -> u32 {
        self.stages.iter().map(Stage::estimated_minutes).sum()
    }

    /// Estimated minutes for stages not yet in `completed`.
    #[must_use]
    pub fn remaining_estimated_minutes(&self, completed: &[StageId]) -> u32 {
        self.stages
            .iter()
            .filter(|s| !completed.contains(&s.id()))
            .map(Stage::estimated_minutes)
            .sum()
    }

    /// Advisory authoring checks against the quiz guidelines.
    ///
    /// Returns a human-readable finding per violation; an empty list means
    /// the catalog meets the guidelines.
    #[must_use]
    pub fn validate_authoring(&self) -> Vec<String> {
        let mut findings = Vec::new();
        for stage in &self.stages {
            let quiz = stage.quiz();
            let count = quiz.questions().len();
            if !(quiz_validation::MIN_QUESTIONS..=quiz_validation::MAX_QUESTIONS).contains(&count) {
                findings.push(format!(
                    "quiz {} has {count} questions, expected {}..={}",
                    quiz.id(),
                    quiz_validation::MIN_QUESTIONS,
                    quiz_validation::MAX_QUESTIONS
                ));
            }
            for question in quiz.questions() {
                let options = question.options().len();
                if !(quiz_validation::MIN_OPTIONS..=quiz_validation::MAX_OPTIONS).contains(&options)
                {
                    findings.push(format!(
                        "question {} has {options} options, expected {}..={}",
                        question.id(),
                        quiz_validation::MIN_OPTIONS,
                        quiz_validation::MAX_OPTIONS
                    ));
                }
            }
        }
        findings
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::content::{Difficulty, Question, QuestionOption};
    use crate::model::ids::QuestionId;

    fn question(id: &str, concept: &str) -> Question {
        Question::new(
            QuestionId::new(id).unwrap(),
            "Prompt",
            vec![
                QuestionOption::new("a", "A", true),
                QuestionOption::new("b", "B", false),
                QuestionOption::new("c", "C", false),
            ],
            ConceptId::new(concept).unwrap(),
            Difficulty::Easy,
            "Because.",
        )
        .unwrap()
    }

    fn stage(id: StageId, order: u32, prereqs: Vec<StageId>) -> Stage {
        let quiz = Quiz::new(
            format!("quiz-{id}"),
            id,
            vec![question(&format!("{id}-q1"), "json-rpc")],
            0.7,
        )
        .unwrap();
        let module = Module::new(
            ModuleId::new(id, 1),
            id,
            "Module 1",
            15,
            vec![ConceptId::new("json-rpc").unwrap()],
        )
        .unwrap();
        Stage::new(
            id,
            format!("Stage {order}"),
            order,
            prereqs,
            vec![module],
            quiz,
            30,
            vec![ConceptId::new("json-rpc").unwrap(), ConceptId::new("transport").unwrap()],
        )
        .unwrap()
    }

    fn full_catalog() -> ContentCatalog {
        let mut stages = Vec::new();
        let mut prev: Option<StageId> = None;
        for (i, id) in StageId::ALL.into_iter().enumerate() {
            let order = u32::try_from(i).unwrap() + 1;
            let prereqs = prev.map(|p| vec![p]).unwrap_or_default();
            stages.push(stage(id, order, prereqs));
            prev = Some(id);
        }
        ContentCatalog::new(stages).unwrap()
    }

    #[test]
    fn test_catalog_requires_every_stage() {
        let stages = vec![stage(StageId::Foundations, 1, vec![])];
        let err = ContentCatalog::new(stages).unwrap_err();
        assert!(matches!(err, CatalogError::MissingStage(_)));
    }

    #[test]
    fn test_catalog_rejects_duplicate_stage() {
        let mut stages: Vec<Stage> = StageId::ALL
            .into_iter()
            .enumerate()
            .map(|(i, id)| stage(id, u32::try_from(i).unwrap() + 1, vec![]))
            .collect();
        stages.push(stage(StageId::Foundations, 6, vec![]));
        let err = ContentCatalog::new(stages).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateStage(StageId::Foundations)));
    }

    #[test]
    fn test_catalog_rejects_gapped_sequence() {
        let stages: Vec<Stage> = StageId::ALL
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                let order = if i == 4 { 7 } else { u32::try_from(i).unwrap() + 1 };
                stage(id, order, vec![])
            })
            .collect();
        let err = ContentCatalog::new(stages).unwrap_err();
        assert!(matches!(err, CatalogError::BadSequenceOrder { .. }));
    }

    #[test]
    fn test_first_and_next_stage() {
        let catalog = full_catalog();
        assert_eq!(catalog.first_stage().id(), StageId::Foundations);
        assert_eq!(
            catalog.next_after(StageId::Foundations),
            Some(StageId::ArchitectureMessages)
        );
        assert_eq!(catalog.next_after(StageId::Mastery), None);
    }

    #[test]
    fn test_module_lookup() {
        let catalog = full_catalog();
        let id = ModuleId::new(StageId::AdvancedPatterns, 1);
        assert!(catalog.module(id).is_some());
        assert!(catalog.module(ModuleId::new(StageId::AdvancedPatterns, 9)).is_none());
    }

    #[test]
    fn test_all_concepts_sorted_and_deduplicated() {
        let catalog = full_catalog();
        let concepts = catalog.all_concepts();
        assert_eq!(concepts.len(), 2);
        assert_eq!(concepts[0].as_str(), "json-rpc");
        assert_eq!(concepts[1].as_str(), "transport");
    }

    #[test]
    fn test_remaining_estimated_minutes() {
        let catalog = full_catalog();
        assert_eq!(catalog.total_estimated_minutes(), 150);
        assert_eq!(
            catalog.remaining_estimated_minutes(&[StageId::Foundations]),
            120
        );
    }

    #[test]
    fn test_validate_authoring_flags_small_quizzes() {
        let catalog = full_catalog();
        // Fixture quizzes have one question each, below the guideline.
        let findings = catalog.validate_authoring();
        assert_eq!(findings.len(), StageId::ALL.len());
    }
}
