use std::sync::Arc;

use learner_core::model::ids::{ConceptId, QuestionId};
use learner_core::model::{
    Difficulty, Module, ModuleId, Question, QuestionOption, Quiz, Stage, StageId, StageStatus,
};
use learner_core::time::fixed_clock;
use learner_core::ContentCatalog;
use services::AppServices;
use storage::MemoryGateway;

fn quiz(stage: StageId) -> Quiz {
    let questions = (0..5)
        .map(|i| {
            Question::new(
                QuestionId::new(format!("{stage}-q{i}")).unwrap(),
                format!("Question {i}"),
                vec![
                    QuestionOption::new("a", "right", true),
                    QuestionOption::new("b", "wrong", false),
                    QuestionOption::new("c", "also wrong", false),
                ],
                ConceptId::new("json-rpc").unwrap(),
                Difficulty::Medium,
                "Option a is correct.",
            )
            .unwrap()
        })
        .collect();
    Quiz::new(format!("quiz-{stage}"), stage, questions, 0.7).unwrap()
}

fn catalog() -> Arc<ContentCatalog> {
    let stages = StageId::ALL
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let prerequisites = if i == 0 {
                Vec::new()
            } else {
                vec![StageId::ALL[i - 1]]
            };
            let modules = vec![Module::new(
                ModuleId::new(*id, 1),
                *id,
                format!("{id} basics"),
                20,
                vec![ConceptId::new("json-rpc").unwrap()],
            )
            .unwrap()];
            #[allow(clippy::cast_possible_truncation)]
            let order = i as u32 + 1;
            Stage::new(
                *id,
                format!("Stage {}", i + 1),
                order,
                prerequisites,
                modules,
                quiz(*id),
                20,
                vec![ConceptId::new("json-rpc").unwrap()],
            )
            .unwrap()
        })
        .collect();
    Arc::new(ContentCatalog::new(stages).unwrap())
}

#[test]
fn curriculum_progression_persists_across_service_instances() {
    let gateway: Arc<MemoryGateway> = Arc::new(MemoryGateway::new());
    let catalog = catalog();

    {
        let app = AppServices::new(gateway.clone(), catalog.clone(), fixed_clock());
        app.learner().initialize().unwrap();
        app.learner().start_stage(StageId::Foundations).unwrap();
        app.learner()
            .complete_module(ModuleId::new(StageId::Foundations, 1))
            .unwrap();

        let quiz = quiz(StageId::Foundations);
        let mut attempt = app.quiz().start_attempt(&quiz).unwrap();
        for question in quiz.questions() {
            attempt = app
                .quiz()
                .submit_answer(attempt, question.id().clone(), "a", true, None)
                .unwrap();
        }
        let completed = app.complete_quiz_attempt(attempt, &quiz).unwrap();
        assert!(completed.passed());
    }

    // A fresh service set over the same gateway sees the same session.
    let app = AppServices::new(gateway, catalog, fixed_clock());
    let learner = app.learner().get().unwrap();
    assert_eq!(
        learner.stage_status(StageId::Foundations),
        StageStatus::Completed
    );
    assert_eq!(
        learner.stage_status(StageId::ArchitectureMessages),
        StageStatus::InProgress
    );
    assert!(learner.module_completed(ModuleId::new(StageId::Foundations, 1)));
    assert_eq!(learner.quiz_attempts().len(), 1);

    let analytics = app.analytics().session_analytics(&learner, &[]);
    assert_eq!(analytics.completed_stages, 1);
    assert_eq!(analytics.mastery_percentage, 100);
}

#[test]
fn reset_gives_each_gateway_an_independent_session() {
    let catalog = catalog();
    let app_a = AppServices::new(Arc::new(MemoryGateway::new()), catalog.clone(), fixed_clock());
    let app_b = AppServices::new(Arc::new(MemoryGateway::new()), catalog, fixed_clock());

    let a = app_a.learner().initialize().unwrap();
    let b = app_b.learner().initialize().unwrap();
    assert_ne!(a.session_id(), b.session_id());

    app_a.learner().start_stage(StageId::Foundations).unwrap();
    app_a.learner().reset_session().unwrap();

    // Only the reset gateway forgets.
    assert!(app_a.learner().get().is_err());
    assert!(app_b.learner().get().is_ok());
}
