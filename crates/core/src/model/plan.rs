use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{GoalId, Subject};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum PlanError {
    #[error("progress must be a finite value in [0, 1], got {provided}")]
    InvalidProgress { provided: f64 },

    #[error("focus area name cannot be empty")]
    EmptyFocusAreaName,

    #[error("goal title cannot be empty")]
    EmptyGoalTitle,
}

//
// ─── MASTERY ───────────────────────────────────────────────────────────────────
//

/// Ordinal proficiency: `Beginner < Developing < Proficient < Advanced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryLevel {
    Beginner,
    Developing,
    Proficient,
    Advanced,
}

impl MasteryLevel {
    /// Maps a percentage score onto a mastery level.
    ///
    /// The percentage is read on a 0-10 scale: below 4 is beginner, below 7
    /// developing, below 9 proficient, anything else advanced.
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        let scaled = percentage / 10.0;
        if scaled < 4.0 {
            Self::Beginner
        } else if scaled < 7.0 {
            Self::Developing
        } else if scaled < 9.0 {
            Self::Proficient
        } else {
            Self::Advanced
        }
    }
}

//
// ─── ACTIVITIES & FOCUS AREAS ──────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Video,
    Reading,
    Worksheet,
    Interactive,
    Practice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningActivity {
    pub title: String,
    pub description: String,
    pub duration_minutes: u32,
    pub resource_type: ResourceType,
}

impl LearningActivity {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        duration_minutes: u32,
        resource_type: ResourceType,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            duration_minutes,
            resource_type,
        }
    }
}

/// A named topic inside a subject plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusArea {
    name: String,
    description: String,
    mastery_level: MasteryLevel,
    activities: Vec<LearningActivity>,
}

impl FocusArea {
    /// # Errors
    ///
    /// Returns `PlanError::EmptyFocusAreaName` for a blank name.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        mastery_level: MasteryLevel,
        activities: Vec<LearningActivity>,
    ) -> Result<Self, PlanError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PlanError::EmptyFocusAreaName);
        }
        Ok(Self {
            name,
            description: description.into(),
            mastery_level,
            activities,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn mastery_level(&self) -> MasteryLevel {
        self.mastery_level
    }

    #[must_use]
    pub fn activities(&self) -> &[LearningActivity] {
        &self.activities
    }
}

//
// ─── WEEKLY GOALS ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyGoal {
    id: GoalId,
    title: String,
    description: String,
    is_completed: bool,
    due_date: DateTime<Utc>,
}

impl WeeklyGoal {
    /// Creates an open goal with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::EmptyGoalTitle` for a blank title.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
    ) -> Result<Self, PlanError> {
        Self::with_id(GoalId::new(), title, description, due_date)
    }

    /// # Errors
    ///
    /// Returns `PlanError::EmptyGoalTitle` for a blank title.
    pub fn with_id(
        id: GoalId,
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
    ) -> Result<Self, PlanError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(PlanError::EmptyGoalTitle);
        }
        Ok(Self {
            id,
            title,
            description: description.into(),
            is_completed: false,
            due_date,
        })
    }

    #[must_use]
    pub fn id(&self) -> GoalId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[must_use]
    pub fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }
}

//
// ─── SUBJECT PLAN ──────────────────────────────────────────────────────────────
//

/// Learning plan for a single subject.
///
/// Plans are owned by the learning plan store; callers receive copies and
/// change the stored plan only through the store's operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPlan {
    subject: Subject,
    progress: f64,
    focus_areas: Vec<FocusArea>,
    weekly_goals: Vec<WeeklyGoal>,
}

impl SubjectPlan {
    /// # Errors
    ///
    /// Returns `PlanError::InvalidProgress` if `progress` is outside `[0, 1]`.
    pub fn new(
        subject: Subject,
        progress: f64,
        focus_areas: Vec<FocusArea>,
        weekly_goals: Vec<WeeklyGoal>,
    ) -> Result<Self, PlanError> {
        validate_progress(progress)?;
        Ok(Self {
            subject,
            progress,
            focus_areas,
            weekly_goals,
        })
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub fn focus_areas(&self) -> &[FocusArea] {
        &self.focus_areas
    }

    #[must_use]
    pub fn weekly_goals(&self) -> &[WeeklyGoal] {
        &self.weekly_goals
    }

    #[must_use]
    pub fn goal(&self, id: GoalId) -> Option<&WeeklyGoal> {
        self.weekly_goals.iter().find(|g| g.id == id)
    }

    /// # Errors
    ///
    /// Returns `PlanError::InvalidProgress` if `progress` is outside `[0, 1]`.
    pub fn set_progress(&mut self, progress: f64) -> Result<(), PlanError> {
        validate_progress(progress)?;
        self.progress = progress;
        Ok(())
    }

    pub fn add_weekly_goal(&mut self, goal: WeeklyGoal) {
        self.weekly_goals.push(goal);
    }

    /// Marks the goal as completed. Returns `false` when no goal has this id.
    pub fn complete_goal(&mut self, id: GoalId) -> bool {
        match self.weekly_goals.iter_mut().find(|g| g.id == id) {
            Some(goal) => {
                goal.is_completed = true;
                true
            }
            None => false,
        }
    }

    /// Sets the mastery of the focus area called `name` (case-insensitive).
    /// Returns `false` when the plan has no such focus area.
    pub fn set_focus_mastery(&mut self, name: &str, level: MasteryLevel) -> bool {
        match self
            .focus_areas
            .iter_mut()
            .find(|area| area.name.eq_ignore_ascii_case(name))
        {
            Some(area) => {
                area.mastery_level = level;
                true
            }
            None => false,
        }
    }

    /// Share of weekly goals already completed, `0.0` when there are none.
    #[must_use]
    pub fn goal_completion(&self) -> f64 {
        if self.weekly_goals.is_empty() {
            return 0.0;
        }
        let done = self.weekly_goals.iter().filter(|g| g.is_completed).count();
        #[allow(clippy::cast_precision_loss)]
        let ratio = done as f64 / self.weekly_goals.len() as f64;
        ratio
    }
}

fn validate_progress(progress: f64) -> Result<(), PlanError> {
    if !progress.is_finite() || !(0.0..=1.0).contains(&progress) {
        return Err(PlanError::InvalidProgress { provided: progress });
    }
    Ok(())
}
