use crate::model::{AssessmentResult, LearningStyle};

/// Derives a learning style from a finished assessment.
///
/// Implementations are expected to be pure; the assessment services call
/// them once per completed attempt.
pub trait LearningStyleClassifier: Send + Sync {
    fn classify(&self, result: &AssessmentResult) -> LearningStyle;
}

/// Classifier that never commits to a style.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnclassifiedStyle;

impl LearningStyleClassifier for UnclassifiedStyle {
    fn classify(&self, _result: &AssessmentResult) -> LearningStyle {
        LearningStyle::Unknown
    }
}

/// Picks the style whose affinity standards scored best.
///
/// Each style is backed by two curriculum standards (visual: Viewing and
/// Visual Arts, auditory: Listening and Music, kinesthetic: Drama and Dance).
/// The style score is the mean correct count over its standards. With no
/// correct answer in any of them the result is `Unknown`; ties go to the
/// earlier style in that list.
#[derive(Debug, Clone)]
pub struct StandardsAffinityClassifier {
    affinities: Vec<(LearningStyle, Vec<String>)>,
}

impl Default for StandardsAffinityClassifier {
    fn default() -> Self {
        Self::new(vec![
            (LearningStyle::Visual, vec!["Viewing".into(), "Visual Arts".into()]),
            (LearningStyle::Auditory, vec!["Listening".into(), "Music".into()]),
            (LearningStyle::Kinesthetic, vec!["Drama".into(), "Dance".into()]),
        ])
    }
}

impl StandardsAffinityClassifier {
    /// Custom affinity table; order decides ties.
    #[must_use]
    pub fn new(affinities: Vec<(LearningStyle, Vec<String>)>) -> Self {
        Self { affinities }
    }

    fn style_score(result: &AssessmentResult, standards: &[String]) -> f64 {
        if standards.is_empty() {
            return 0.0;
        }
        let correct: u32 = standards
            .iter()
            .map(|s| result.skill_breakdown().get(s).copied().unwrap_or(0))
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let mean = f64::from(correct) / standards.len() as f64;
        mean
    }
}

impl LearningStyleClassifier for StandardsAffinityClassifier {
    fn classify(&self, result: &AssessmentResult) -> LearningStyle {
        let mut best = (LearningStyle::Unknown, 0.0_f64);
        for (style, standards) in &self.affinities {
            let score = Self::style_score(result, standards);
            if score > best.1 {
                best = (*style, score);
            }
        }
        best.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SkillBreakdown, Subject};
    use crate::time::fixed_now;

    fn result_with(entries: &[(&str, u32)], total: u32) -> AssessmentResult {
        let breakdown: SkillBreakdown =
            entries.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect();
        let score = breakdown.values().sum();
        AssessmentResult::new(
            Subject::Arts,
            score,
            total,
            fixed_now(),
            breakdown.clone(),
            breakdown,
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn unclassified_is_always_unknown() {
        let result = result_with(&[("Music", 3)], 3);
        assert_eq!(UnclassifiedStyle.classify(&result), LearningStyle::Unknown);
    }

    #[test]
    fn picks_strongest_affinity() {
        let result = result_with(&[("Music", 2), ("Dance", 1), ("Viewing", 1)], 6);
        let style = StandardsAffinityClassifier::default().classify(&result);
        assert_eq!(style, LearningStyle::Auditory);
    }

    #[test]
    fn no_evidence_is_unknown() {
        let result = result_with(&[("Fractions", 4)], 5);
        let style = StandardsAffinityClassifier::default().classify(&result);
        assert_eq!(style, LearningStyle::Unknown);
    }

    #[test]
    fn ties_resolve_in_table_order() {
        let result = result_with(&[("Drama", 1), ("Visual Arts", 1)], 2);
        let style = StandardsAffinityClassifier::default().classify(&result);
        assert_eq!(style, LearningStyle::Visual);
    }
}
