#![forbid(unsafe_code)]

pub mod assessment;
pub mod error;
pub mod plans;

pub use tutor_core::Clock;

pub use error::{AssessmentError, PlanServiceError};
pub use plans::{LearningPlanService, PlanChange, PlanUpdate, SkipReason};

pub use assessment::{
    AnswerOutcome, AssessmentAnswerResult, AssessmentProgress, AssessmentService,
    AssessmentSession, CompletedAssessment, SessionState,
};
