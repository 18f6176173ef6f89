use thiserror::Error;

use crate::model::{AssessmentResultError, PlanError, QuestionError};
use crate::recommend::{RecommendationError, RecommendationSettingsError};
use crate::scoring::ScoringError;

/// Any error raised by the core domain.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Result(#[from] AssessmentResultError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Recommendation(#[from] RecommendationError),
    #[error(transparent)]
    Settings(#[from] RecommendationSettingsError),
}
