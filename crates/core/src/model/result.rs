use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::model::Subject;

/// Skill category → count, iterated in insertion order.
pub type SkillBreakdown = IndexMap<String, u32>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssessmentResultError {
    #[error("total questions must be > 0")]
    EmptyAssessment,

    #[error("score ({score}) exceeds total questions ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error("skill breakdown sums to {sum}, expected score {score}")]
    BreakdownMismatch { score: u32, sum: u32 },
}

/// Outcome of a completed assessment attempt.
///
/// A new attempt produces a new result; existing results are never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    subject: Subject,
    score: u32,
    total_questions: u32,
    completed_at: DateTime<Utc>,
    skill_breakdown: SkillBreakdown,
    skill_totals: SkillBreakdown,
    recommendations: Vec<String>,
}

impl AssessmentResult {
    /// Builds a result, checking the score against the total and the breakdown.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentResultError` if `total_questions` is zero, the score
    /// exceeds it, or the breakdown does not sum to the score.
    pub fn new(
        subject: Subject,
        score: u32,
        total_questions: u32,
        completed_at: DateTime<Utc>,
        skill_breakdown: SkillBreakdown,
        skill_totals: SkillBreakdown,
        recommendations: Vec<String>,
    ) -> Result<Self, AssessmentResultError> {
        if total_questions == 0 {
            return Err(AssessmentResultError::EmptyAssessment);
        }
        if score > total_questions {
            return Err(AssessmentResultError::ScoreExceedsTotal {
                score,
                total: total_questions,
            });
        }
        let sum = skill_breakdown
            .values()
            .fold(0_u32, |acc, v| acc.saturating_add(*v));
        if sum != score {
            return Err(AssessmentResultError::BreakdownMismatch { score, sum });
        }

        Ok(Self {
            subject,
            score,
            total_questions,
            completed_at,
            skill_breakdown,
            skill_totals,
            recommendations,
        })
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Correct answers per skill category.
    #[must_use]
    pub fn skill_breakdown(&self) -> &SkillBreakdown {
        &self.skill_breakdown
    }

    /// Number of questions asked per skill category.
    #[must_use]
    pub fn skill_totals(&self) -> &SkillBreakdown {
        &self.skill_totals
    }

    #[must_use]
    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    /// Score as a percentage of the total, in `[0, 100]`.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        f64::from(self.score) / f64::from(self.total_questions) * 100.0
    }

    /// Fraction of the questions in `skill` answered correctly, if the skill was asked.
    #[must_use]
    pub fn skill_ratio(&self, skill: &str) -> Option<f64> {
        let asked = *self.skill_totals.get(skill)?;
        if asked == 0 {
            return None;
        }
        let correct = self.skill_breakdown.get(skill).copied().unwrap_or(0);
        Some(f64::from(correct) / f64::from(asked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn breakdown(entries: &[(&str, u32)]) -> SkillBreakdown {
        entries.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect()
    }

    #[test]
    fn rejects_zero_total() {
        let err = AssessmentResult::new(
            Subject::Science,
            0,
            0,
            fixed_now(),
            SkillBreakdown::new(),
            SkillBreakdown::new(),
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err, AssessmentResultError::EmptyAssessment);
    }

    #[test]
    fn rejects_breakdown_not_matching_score() {
        let err = AssessmentResult::new(
            Subject::Science,
            2,
            3,
            fixed_now(),
            breakdown(&[("Energy", 1)]),
            breakdown(&[("Energy", 3)]),
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err, AssessmentResultError::BreakdownMismatch { score: 2, sum: 1 });
    }

    #[test]
    fn percentage_and_skill_ratio() {
        let result = AssessmentResult::new(
            Subject::Mathematics,
            3,
            4,
            fixed_now(),
            breakdown(&[("Geometry", 2), ("Fractions", 1)]),
            breakdown(&[("Geometry", 2), ("Fractions", 2)]),
            Vec::new(),
        )
        .unwrap();

        assert!((result.percentage() - 75.0).abs() < f64::EPSILON);
        assert_eq!(result.skill_ratio("Geometry"), Some(1.0));
        assert_eq!(result.skill_ratio("Fractions"), Some(0.5));
        assert_eq!(result.skill_ratio("Algebra"), None);
    }
}
