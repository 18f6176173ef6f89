mod ids;
mod plan;
mod question;
mod result;
mod style;
mod subject;

pub use ids::{GoalId, ParseIdError, QuestionId};
pub use plan::{
    FocusArea, LearningActivity, MasteryLevel, PlanError, ResourceType, SubjectPlan, WeeklyGoal,
};
pub use question::{Difficulty, Question, QuestionError};
pub use result::{AssessmentResult, AssessmentResultError, SkillBreakdown};
pub use style::LearningStyle;
pub use subject::{ParseSubjectError, Subject};
