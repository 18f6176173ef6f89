//! Shared error types for the services crate.

use thiserror::Error;

use storage::StorageError;
use tutor_core::model::{AssessmentResultError, PlanError, Subject};
use tutor_core::recommend::RecommendationError;
use tutor_core::scoring::ScoringError;

/// Errors emitted by assessment sessions and the assessment service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("no questions available for {subject}")]
    EmptyQuestionSet { subject: Subject },
    #[error("assessment has not been started")]
    SessionNotStarted,
    #[error("assessment already completed")]
    SessionAlreadyComplete,
    #[error("answer index {index} out of range ({answered} of {total} answered)")]
    AnswerIndexOutOfRange {
        index: usize,
        answered: usize,
        total: usize,
    },
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Recommendation(#[from] RecommendationError),
    #[error(transparent)]
    Result(#[from] AssessmentResultError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Plan(#[from] PlanServiceError),
}

/// Errors emitted by `LearningPlanService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlanServiceError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
