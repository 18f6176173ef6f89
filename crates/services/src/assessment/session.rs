use chrono::{DateTime, Utc};
use std::fmt;

use tutor_core::model::{AssessmentResult, Question, Subject};
use tutor_core::recommend::Recommender;
use tutor_core::scoring;

use super::progress::AssessmentProgress;
use crate::error::AssessmentError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Complete,
}

/// What happened after an answer was recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    /// The answer was appended; `next_index` is the question now being asked.
    Advanced { next_index: usize },
    /// An earlier answer was replaced; the current question is unchanged.
    Revised { index: usize },
    /// The last question was answered.
    Completed(AssessmentResult),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One in-progress assessment attempt.
///
/// Questions are fixed once the session starts and `answers[i]` always pairs
/// with `questions[i]`. While the session is in progress the current question
/// is `questions[answers.len()]`; answering the last one scores the attempt
/// and makes the session terminal.
pub struct AssessmentSession {
    subject: Option<Subject>,
    questions: Vec<Question>,
    answers: Vec<usize>,
    state: SessionState,
    recommender: Recommender,
    started_at: Option<DateTime<Utc>>,
    result: Option<AssessmentResult>,
}

impl AssessmentSession {
    /// Creates a session that has not been started yet.
    #[must_use]
    pub fn new(recommender: Recommender) -> Self {
        Self {
            subject: None,
            questions: Vec::new(),
            answers: Vec::new(),
            state: SessionState::NotStarted,
            recommender,
            started_at: None,
            result: None,
        }
    }

    /// Begins (or restarts) the session with `questions` for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::EmptyQuestionSet` if `questions` is empty; the
    /// session is left as it was.
    pub fn start(
        &mut self,
        subject: Subject,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<(), AssessmentError> {
        if questions.is_empty() {
            return Err(AssessmentError::EmptyQuestionSet { subject });
        }

        self.subject = Some(subject);
        self.questions = questions;
        self.answers.clear();
        self.state = SessionState::InProgress;
        self.started_at = Some(started_at);
        self.result = None;
        Ok(())
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    #[must_use]
    pub fn subject(&self) -> Option<Subject> {
        self.subject
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[usize] {
        &self.answers
    }

    /// Index of the question being asked, equal to the number of answers so far.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.answers.len()
    }

    /// The question being asked, `None` unless the session is in progress.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::InProgress => self.questions.get(self.answers.len()),
            SessionState::NotStarted | SessionState::Complete => None,
        }
    }

    /// The final result once the session is complete.
    #[must_use]
    pub fn result(&self) -> Option<&AssessmentResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn progress(&self) -> AssessmentProgress {
        AssessmentProgress {
            total: self.questions.len(),
            answered: self.answers.len(),
            remaining: self.questions.len().saturating_sub(self.answers.len()),
            is_complete: self.is_complete(),
        }
    }

    /// Answers the current question and moves on.
    ///
    /// Any index is accepted; one that is not a valid option is scored as incorrect.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::SessionNotStarted` before `start`, and
    /// `AssessmentError::SessionAlreadyComplete` once every question is answered.
    pub fn submit_answer(
        &mut self,
        answer: usize,
        answered_at: DateTime<Utc>,
    ) -> Result<AnswerOutcome, AssessmentError> {
        self.ensure_in_progress()?;
        self.append_answer(answer, answered_at)
    }

    /// Sets the answer for the question at `index`.
    ///
    /// An already answered question has its answer replaced. `index` equal to
    /// the number of answers appends exactly like [`Self::submit_answer`].
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::AnswerIndexOutOfRange` if `index` would leave a
    /// gap or lies past the last question, plus the state errors of
    /// [`Self::submit_answer`].
    pub fn record_answer(
        &mut self,
        index: usize,
        answer: usize,
        answered_at: DateTime<Utc>,
    ) -> Result<AnswerOutcome, AssessmentError> {
        self.ensure_in_progress()?;

        if index >= self.questions.len() || index > self.answers.len() {
            return Err(AssessmentError::AnswerIndexOutOfRange {
                index,
                answered: self.answers.len(),
                total: self.questions.len(),
            });
        }

        if let Some(slot) = self.answers.get_mut(index) {
            *slot = answer;
            return Ok(AnswerOutcome::Revised { index });
        }

        self.append_answer(answer, answered_at)
    }

    /// Scores the answers given so far without ending the session.
    ///
    /// Unanswered questions count as incorrect.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::SessionNotStarted` before `start`.
    pub fn interim_result(&self, at: DateTime<Utc>) -> Result<AssessmentResult, AssessmentError> {
        if self.state == SessionState::NotStarted {
            return Err(AssessmentError::SessionNotStarted);
        }
        self.build_result(at)
    }

    /// Consumes the session, returning its final result if it completed.
    #[must_use]
    pub fn into_result(self) -> Option<AssessmentResult> {
        self.result
    }

    fn ensure_in_progress(&self) -> Result<(), AssessmentError> {
        match self.state {
            SessionState::NotStarted => Err(AssessmentError::SessionNotStarted),
            SessionState::Complete => Err(AssessmentError::SessionAlreadyComplete),
            SessionState::InProgress => Ok(()),
        }
    }

    fn append_answer(
        &mut self,
        answer: usize,
        answered_at: DateTime<Utc>,
    ) -> Result<AnswerOutcome, AssessmentError> {
        self.answers.push(answer);

        if self.answers.len() < self.questions.len() {
            return Ok(AnswerOutcome::Advanced {
                next_index: self.answers.len(),
            });
        }

        let result = match self.build_result(answered_at) {
            Ok(result) => result,
            Err(err) => {
                self.answers.pop();
                return Err(err);
            }
        };
        self.state = SessionState::Complete;
        self.result = Some(result.clone());
        Ok(AnswerOutcome::Completed(result))
    }

    fn build_result(&self, completed_at: DateTime<Utc>) -> Result<AssessmentResult, AssessmentError> {
        let subject = self.subject.ok_or(AssessmentError::SessionNotStarted)?;
        let summary = scoring::score(&self.questions, &self.answers)?;
        let recommendations = self.recommender.for_summary(&summary)?;
        Ok(AssessmentResult::new(
            subject,
            summary.score,
            summary.total_questions,
            completed_at,
            summary.breakdown,
            summary.skill_totals,
            recommendations,
        )?)
    }
}

impl Default for AssessmentSession {
    fn default() -> Self {
        Self::new(Recommender::default())
    }
}

impl fmt::Debug for AssessmentSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssessmentSession")
            .field("subject", &self.subject)
            .field("state", &self.state)
            .field("questions_len", &self.questions.len())
            .field("answers_len", &self.answers.len())
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
