use std::sync::Arc;

use services::{AssessmentError, AssessmentService, Clock, LearningPlanService, PlanChange};
use storage::{AssessmentResultRepository, Storage};
use tutor_core::model::{LearningStyle, MasteryLevel, Subject};
use tutor_core::time::fixed_now;
use tutor_core::{RecommendationSettings, SkillDenominator, StandardsAffinityClassifier};

fn wire(storage: &Storage) -> (AssessmentService, Arc<LearningPlanService>) {
    let clock = Clock::fixed(fixed_now());
    let plans = Arc::new(LearningPlanService::new(clock, storage.plans.clone()));
    let assessments = AssessmentService::new(clock, storage.questions.clone(), storage.results.clone())
        .with_classifier(Arc::new(StandardsAffinityClassifier::default()))
        .with_plan_updates(plans.clone());
    (assessments, plans)
}

#[tokio::test]
async fn math_assessment_updates_history_and_plan() {
    let storage = Storage::seeded(fixed_now()).unwrap();
    let (assessments, plans) = wire(&storage);
    let mut changes = plans.subscribe();

    let mut session = assessments
        .start_assessment(Subject::Mathematics)
        .await
        .unwrap();
    assert_eq!(session.questions().len(), 3);

    // Number Operations and Geometry right, Fractions wrong.
    assert!(!assessments.submit_answer(&mut session, 0).await.unwrap().is_complete());
    assert!(!assessments.submit_answer(&mut session, 2).await.unwrap().is_complete());
    let last = assessments.submit_answer(&mut session, 0).await.unwrap();
    assert!(last.progress.is_complete);

    let completed = last.completed.unwrap();
    let result = &completed.result;
    assert_eq!(result.score(), 2);
    assert_eq!(result.total_questions(), 3);
    assert_eq!(completed.result.completed_at(), fixed_now());
    assert_eq!(completed.learning_style, LearningStyle::Unknown);
    assert_eq!(
        result.recommendations(),
        [
            "Focus on strengthening fundamental concepts",
            "Practice more problems in areas of weakness",
            "Focus on improving Number Operations skills",
            "Focus on improving Geometry skills",
        ]
    );

    let latest = storage
        .results
        .latest_result(Subject::Mathematics)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&latest, result);

    let plan = plans.get_plan(Subject::Mathematics).await.unwrap().unwrap();
    assert!((plan.progress() - 2.0 / 3.0).abs() < 1e-9);
    let fractions = plan
        .focus_areas()
        .iter()
        .find(|area| area.name() == "Fractions")
        .unwrap();
    assert_eq!(fractions.mastery_level(), MasteryLevel::Beginner);
    assert!(matches!(
        changes.try_recv().unwrap(),
        PlanChange::ResultApplied { subject: Subject::Mathematics, .. }
    ));
}

#[tokio::test]
async fn per_skill_denominator_only_flags_missed_skills() {
    let storage = Storage::seeded(fixed_now()).unwrap();
    let settings = RecommendationSettings::default().with_denominator(SkillDenominator::QuestionsInSkill);
    let (assessments, _) = wire(&storage);
    let assessments = assessments.with_recommendation_settings(settings);

    let mut session = assessments.start_assessment(Subject::Mathematics).await.unwrap();
    for (index, answer) in [0, 2, 0].into_iter().enumerate() {
        assessments.record_answer(&mut session, index, answer).await.unwrap();
    }

    let result = session.result().unwrap();
    assert_eq!(result.recommendations().len(), 2);
    assert!(
        result
            .recommendations()
            .iter()
            .all(|line| !line.starts_with("Focus on improving"))
    );
}

#[tokio::test]
async fn social_studies_has_no_plan_but_is_still_recorded() {
    let storage = Storage::seeded(fixed_now()).unwrap();
    let (assessments, plans) = wire(&storage);

    let mut session = assessments
        .start_assessment(Subject::SocialStudies)
        .await
        .unwrap();
    let mut outcome = None;
    while !session.is_complete() {
        outcome = Some(assessments.submit_answer(&mut session, 0).await.unwrap());
    }
    assert!(outcome.unwrap().is_complete());

    assert!(plans.get_plan(Subject::SocialStudies).await.unwrap().is_none());
    let history = storage.results.list_results(Subject::SocialStudies).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn arts_has_no_questions() {
    let storage = Storage::seeded(fixed_now()).unwrap();
    let (assessments, _) = wire(&storage);

    let err = assessments.start_assessment(Subject::Arts).await.unwrap_err();
    assert!(matches!(
        err,
        AssessmentError::EmptyQuestionSet { subject: Subject::Arts }
    ));
}
