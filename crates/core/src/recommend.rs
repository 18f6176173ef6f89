use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::SkillBreakdown;
use crate::scoring::ScoreSummary;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecommendationError {
    #[error("total questions must be > 0")]
    InvalidTotal,

    #[error("score ({score}) exceeds total questions ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum RecommendationSettingsError {
    #[error("tier thresholds must satisfy 0 <= low <= high <= 100, got {low} and {high}")]
    InvalidTierThresholds { low: f64, high: f64 },

    #[error("skill ratio threshold must be in (0, 1], got {provided}")]
    InvalidSkillRatio { provided: f64 },
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// What a skill's correct count is divided by before comparing against the
/// skill ratio threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkillDenominator {
    /// Every question in the assessment. Flags almost every skill on a
    /// multi-skill assessment.
    #[default]
    TotalQuestions,
    /// Only the questions belonging to that skill.
    QuestionsInSkill,
}

/// Thresholds driving recommendation output.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationSettings {
    developing_below: f64,
    excelling_from: f64,
    skill_ratio_below: f64,
    denominator: SkillDenominator,
}

impl Default for RecommendationSettings {
    /// Below 70% is the foundation tier, 90% and up the excelling tier, and a
    /// skill is flagged below a 0.7 ratio.
    fn default() -> Self {
        Self {
            developing_below: 70.0,
            excelling_from: 90.0,
            skill_ratio_below: 0.7,
            denominator: SkillDenominator::TotalQuestions,
        }
    }
}

impl RecommendationSettings {
    /// # Errors
    ///
    /// Returns `RecommendationSettingsError` if the tier thresholds are not
    /// ordered percentages or the skill ratio is outside `(0, 1]`.
    pub fn new(
        developing_below: f64,
        excelling_from: f64,
        skill_ratio_below: f64,
        denominator: SkillDenominator,
    ) -> Result<Self, RecommendationSettingsError> {
        let ordered = developing_below.is_finite()
            && excelling_from.is_finite()
            && 0.0 <= developing_below
            && developing_below <= excelling_from
            && excelling_from <= 100.0;
        if !ordered {
            return Err(RecommendationSettingsError::InvalidTierThresholds {
                low: developing_below,
                high: excelling_from,
            });
        }
        if !skill_ratio_below.is_finite() || skill_ratio_below <= 0.0 || skill_ratio_below > 1.0 {
            return Err(RecommendationSettingsError::InvalidSkillRatio {
                provided: skill_ratio_below,
            });
        }
        Ok(Self {
            developing_below,
            excelling_from,
            skill_ratio_below,
            denominator,
        })
    }

    #[must_use]
    pub fn with_denominator(mut self, denominator: SkillDenominator) -> Self {
        self.denominator = denominator;
        self
    }

    #[must_use]
    pub fn denominator(&self) -> SkillDenominator {
        self.denominator
    }

    #[must_use]
    pub fn developing_below(&self) -> f64 {
        self.developing_below
    }

    #[must_use]
    pub fn excelling_from(&self) -> f64 {
        self.excelling_from
    }

    #[must_use]
    pub fn skill_ratio_below(&self) -> f64 {
        self.skill_ratio_below
    }
}

//
// ─── TIERS ─────────────────────────────────────────────────────────────────────
//

/// Overall performance band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceTier {
    Foundation,
    Developing,
    Excelling,
}

impl PerformanceTier {
    /// The two fixed recommendations that open every list for this tier.
    #[must_use]
    pub fn recommendations(self) -> [&'static str; 2] {
        match self {
            PerformanceTier::Foundation => [
                "Focus on strengthening fundamental concepts",
                "Practice more problems in areas of weakness",
            ],
            PerformanceTier::Developing => [
                "Continue practicing to maintain current level",
                "Challenge yourself with more advanced problems",
            ],
            PerformanceTier::Excelling => [
                "Excellent work! Keep up the good performance",
                "Consider exploring advanced topics in this subject",
            ],
        }
    }
}

//
// ─── GENERATOR ─────────────────────────────────────────────────────────────────
//

/// Turns a score and skill breakdown into ordered, human-readable advice.
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    settings: RecommendationSettings,
}

impl Recommender {
    #[must_use]
    pub fn new(settings: RecommendationSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &RecommendationSettings {
        &self.settings
    }

    /// Performance tier for `score` out of `total`.
    ///
    /// # Errors
    ///
    /// Returns `RecommendationError::InvalidTotal` when `total` is zero.
    pub fn tier(&self, score: u32, total: u32) -> Result<PerformanceTier, RecommendationError> {
        check_counts(score, total)?;
        // score/total*100 < t  <=>  score*100 < t*total, without the division rounding
        let scaled = f64::from(score) * 100.0;
        let total = f64::from(total);
        Ok(if scaled < self.settings.developing_below * total {
            PerformanceTier::Foundation
        } else if scaled < self.settings.excelling_from * total {
            PerformanceTier::Developing
        } else {
            PerformanceTier::Excelling
        })
    }

    /// Builds the recommendation list.
    ///
    /// The two tier lines come first, followed by one "Focus on improving"
    /// line per weak skill in `breakdown` order. `skill_totals` is only read
    /// with [`SkillDenominator::QuestionsInSkill`]; a skill missing from it
    /// falls back to `total`.
    ///
    /// # Errors
    ///
    /// Returns `RecommendationError::InvalidTotal` when `total` is zero and
    /// `RecommendationError::ScoreExceedsTotal` when `score > total`.
    pub fn generate(
        &self,
        score: u32,
        total: u32,
        breakdown: &SkillBreakdown,
        skill_totals: Option<&SkillBreakdown>,
    ) -> Result<Vec<String>, RecommendationError> {
        let tier = self.tier(score, total)?;
        let mut recommendations: Vec<String> = tier
            .recommendations()
            .iter()
            .map(|line| (*line).to_owned())
            .collect();

        for (skill, correct) in breakdown {
            let denominator = match self.settings.denominator {
                SkillDenominator::TotalQuestions => total,
                SkillDenominator::QuestionsInSkill => skill_totals
                    .and_then(|totals| totals.get(skill).copied())
                    .filter(|asked| *asked > 0)
                    .unwrap_or(total),
            };
            let ratio = f64::from(*correct) / f64::from(denominator);
            if ratio < self.settings.skill_ratio_below {
                recommendations.push(format!("Focus on improving {skill} skills"));
            }
        }

        Ok(recommendations)
    }

    /// Convenience over [`Recommender::generate`] for a scoring summary.
    ///
    /// # Errors
    ///
    /// See [`Recommender::generate`].
    pub fn for_summary(&self, summary: &ScoreSummary) -> Result<Vec<String>, RecommendationError> {
        self.generate(
            summary.score,
            summary.total_questions,
            &summary.breakdown,
            Some(&summary.skill_totals),
        )
    }
}

/// Recommendations with default thresholds and the whole-assessment denominator.
///
/// # Errors
///
/// Returns `RecommendationError::InvalidTotal` when `total` is zero.
pub fn recommend(
    score: u32,
    total: u32,
    breakdown: &SkillBreakdown,
) -> Result<Vec<String>, RecommendationError> {
    Recommender::default().generate(score, total, breakdown, None)
}

fn check_counts(score: u32, total: u32) -> Result<(), RecommendationError> {
    if total == 0 {
        return Err(RecommendationError::InvalidTotal);
    }
    if score > total {
        return Err(RecommendationError::ScoreExceedsTotal { score, total });
    }
    Ok(())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
