use thiserror::Error;

use crate::model::{Question, SkillBreakdown};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoringError {
    #[error("{answers} answers submitted for {questions} questions")]
    TooManyAnswers { answers: usize, questions: usize },

    #[error("question set too large to score: {len}")]
    TooManyQuestions { len: usize },
}

//
// ─── SCORE SUMMARY ─────────────────────────────────────────────────────────────
//

/// Output of [`score`].
///
/// `breakdown` only holds skill categories with at least one correct answer,
/// in the order they were first credited. `skill_totals` counts every
/// question per category, in the order the categories appear in the set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScoreSummary {
    pub score: u32,
    pub total_questions: u32,
    pub breakdown: SkillBreakdown,
    pub skill_totals: SkillBreakdown,
}

impl ScoreSummary {
    /// Percentage of `total_questions` answered correctly, `None` for an empty set.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        (self.total_questions > 0)
            .then(|| f64::from(self.score) / f64::from(self.total_questions) * 100.0)
    }
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Scores `answers` against `questions`, pairing them by position.
///
/// Questions past the end of `answers` are unanswered: they count towards
/// `total_questions` and `skill_totals` but never towards the score. An
/// answer index that is not a valid option is simply incorrect.
///
/// # Errors
///
/// Returns `ScoringError::TooManyAnswers` if there are more answers than questions.
pub fn score(questions: &[Question], answers: &[usize]) -> Result<ScoreSummary, ScoringError> {
    if answers.len() > questions.len() {
        return Err(ScoringError::TooManyAnswers {
            answers: answers.len(),
            questions: questions.len(),
        });
    }
    let total_questions = u32::try_from(questions.len())
        .map_err(|_| ScoringError::TooManyQuestions { len: questions.len() })?;

    let mut summary = ScoreSummary {
        total_questions,
        ..ScoreSummary::default()
    };

    for question in questions {
        *summary
            .skill_totals
            .entry(question.skill_category().to_owned())
            .or_insert(0) += 1;
    }

    for (question, answer) in questions.iter().zip(answers) {
        if question.is_correct(*answer) {
            summary.score += 1;
            *summary
                .breakdown
                .entry(question.skill_category().to_owned())
                .or_insert(0) += 1;
        }
    }

    Ok(summary)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
