use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("a question needs at least 2 options, got {count}")]
    TooFewOptions { count: usize },

    #[error("correct answer index {index} is out of range for {count} options")]
    CorrectAnswerOutOfRange { index: usize, count: usize },

    #[error("skill category cannot be empty")]
    EmptySkillCategory,
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Multiple-choice question with a single correct option.
///
/// Fields are private so a constructed question always satisfies its
/// invariants: non-empty text, at least two options and a correct index that
/// points at one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    correct_answer: usize,
    explanation: String,
    difficulty: Difficulty,
    skill_category: String,
}

impl Question {
    /// Creates a question with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text or skill category is blank, fewer
    /// than two options are given, or `correct_answer` is not a valid option index.
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
        explanation: impl Into<String>,
        difficulty: Difficulty,
        skill_category: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        Self::with_id(
            QuestionId::new(),
            text,
            options,
            correct_answer,
            explanation,
            difficulty,
            skill_category,
        )
    }

    /// Creates a question with a caller-supplied id.
    ///
    /// # Errors
    ///
    /// Same as [`Question::new`].
    pub fn with_id(
        id: QuestionId,
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
        explanation: impl Into<String>,
        difficulty: Difficulty,
        skill_category: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                count: options.len(),
            });
        }
        if correct_answer >= options.len() {
            return Err(QuestionError::CorrectAnswerOutOfRange {
                index: correct_answer,
                count: options.len(),
            });
        }
        let skill_category = skill_category.into();
        if skill_category.trim().is_empty() {
            return Err(QuestionError::EmptySkillCategory);
        }

        Ok(Self {
            id,
            text,
            options,
            correct_answer,
            explanation: explanation.into(),
            difficulty,
            skill_category,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn skill_category(&self) -> &str {
        &self.skill_category
    }

    /// Whether `answer` selects the correct option. Out-of-range answers are
    /// never correct.
    #[must_use]
    pub fn is_correct(&self, answer: usize) -> bool {
        answer == self.correct_answer
    }
}
