use rand::rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::sync::Arc;

use storage::{AssessmentResultRepository, QuestionProvider};
use tutor_core::classifier::{LearningStyleClassifier, UnclassifiedStyle};
use tutor_core::model::{AssessmentResult, LearningStyle, Subject};
use tutor_core::recommend::{RecommendationSettings, Recommender};

use super::progress::AssessmentProgress;
use super::session::{AnswerOutcome, AssessmentSession};
use crate::Clock;
use crate::error::AssessmentError;
use crate::plans::LearningPlanService;

/// A finished attempt as handed to result consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedAssessment {
    pub result_id: u64,
    pub result: AssessmentResult,
    pub learning_style: LearningStyle,
}

/// Result of answering a single question through the service.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentAnswerResult {
    pub progress: AssessmentProgress,
    pub completed: Option<CompletedAssessment>,
}

impl AssessmentAnswerResult {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed.is_some()
    }
}

/// Orchestrates assessment start, answering and hand-off of results.
#[derive(Clone)]
pub struct AssessmentService {
    clock: Clock,
    questions: Arc<dyn QuestionProvider>,
    results: Arc<dyn AssessmentResultRepository>,
    classifier: Arc<dyn LearningStyleClassifier>,
    plans: Option<Arc<LearningPlanService>>,
    settings: RecommendationSettings,
    shuffle_questions: bool,
}

impl AssessmentService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionProvider>,
        results: Arc<dyn AssessmentResultRepository>,
    ) -> Self {
        Self {
            clock,
            questions,
            results,
            classifier: Arc::new(UnclassifiedStyle),
            plans: None,
            settings: RecommendationSettings::default(),
            shuffle_questions: false,
        }
    }

    #[must_use]
    pub fn with_recommendation_settings(mut self, settings: RecommendationSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn LearningStyleClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Apply every completed result to the subject's learning plan.
    #[must_use]
    pub fn with_plan_updates(mut self, plans: Arc<LearningPlanService>) -> Self {
        self.plans = Some(plans);
        self
    }

    /// Shuffle the provider's question order before each attempt.
    #[must_use]
    pub fn with_shuffle_questions(mut self, shuffle: bool) -> Self {
        self.shuffle_questions = shuffle;
        self
    }

    /// Start a new assessment for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::EmptyQuestionSet` if the provider has no
    /// questions for the subject, or `AssessmentError::Storage` if it fails.
    pub async fn start_assessment(
        &self,
        subject: Subject,
    ) -> Result<AssessmentSession, AssessmentError> {
        let mut questions = self.questions.provide_questions(subject).await?;
        if self.shuffle_questions {
            let mut rng = rng();
            questions.as_mut_slice().shuffle(&mut rng);
        }

        let mut session = AssessmentSession::new(Recommender::new(self.settings.clone()));
        session.start(subject, questions, self.clock.now())?;
        tracing::debug!(%subject, questions = session.questions().len(), "assessment started");
        Ok(session)
    }

    /// Answer the current question; persists and classifies the result on completion.
    ///
    /// # Errors
    ///
    /// Returns the session's state errors, or storage/plan errors while
    /// handing off a completed result.
    pub async fn submit_answer(
        &self,
        session: &mut AssessmentSession,
        answer: usize,
    ) -> Result<AssessmentAnswerResult, AssessmentError> {
        let outcome = session.submit_answer(answer, self.clock.now())?;
        tracing::debug!(answer, index = session.current_index(), "answer submitted");
        self.handle_outcome(session, outcome).await
    }

    /// Set or revise the answer at `index`; see [`AssessmentSession::record_answer`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::submit_answer`], plus `AssessmentError::AnswerIndexOutOfRange`.
    pub async fn record_answer(
        &self,
        session: &mut AssessmentSession,
        index: usize,
        answer: usize,
    ) -> Result<AssessmentAnswerResult, AssessmentError> {
        let outcome = session.record_answer(index, answer, self.clock.now())?;
        tracing::debug!(index, answer, "answer recorded");
        self.handle_outcome(session, outcome).await
    }

    async fn handle_outcome(
        &self,
        session: &AssessmentSession,
        outcome: AnswerOutcome,
    ) -> Result<AssessmentAnswerResult, AssessmentError> {
        let completed = match outcome {
            AnswerOutcome::Completed(result) => Some(self.hand_off(result).await?),
            AnswerOutcome::Advanced { .. } | AnswerOutcome::Revised { .. } => None,
        };
        Ok(AssessmentAnswerResult {
            progress: session.progress(),
            completed,
        })
    }

    async fn hand_off(
        &self,
        result: AssessmentResult,
    ) -> Result<CompletedAssessment, AssessmentError> {
        let result_id = self.results.append_result(&result).await?;
        let learning_style = self.classifier.classify(&result);
        tracing::info!(
            subject = %result.subject(),
            score = result.score(),
            total = result.total_questions(),
            %learning_style,
            "assessment completed"
        );

        if let Some(plans) = &self.plans {
            plans.apply_result(&result).await?;
        }

        Ok(CompletedAssessment {
            result_id,
            result,
            learning_style,
        })
    }
}
