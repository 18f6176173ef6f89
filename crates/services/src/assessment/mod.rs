mod progress;
mod session;
mod workflow;

// Public API of the assessment subsystem.
pub use crate::error::AssessmentError;
pub use progress::AssessmentProgress;
pub use session::{AnswerOutcome, AssessmentSession, SessionState};
pub use workflow::{AssessmentAnswerResult, AssessmentService, CompletedAssessment};
