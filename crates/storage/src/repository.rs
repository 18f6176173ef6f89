use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tutor_core::model::{AssessmentResult, Question, Subject, SubjectPlan};

use crate::seed::{self, SeedError};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("storage lock poisoned: {0}")]
    Poisoned(String),

    #[error(transparent)]
    Seed(#[from] SeedError),
}

/// Supplies the ordered question set for a subject.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Questions for `subject`, in the order they should be asked.
    ///
    /// An empty list is a valid answer; callers decide whether that is an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn provide_questions(&self, subject: Subject) -> Result<Vec<Question>, StorageError>;
}

/// One learning plan per subject.
#[async_trait]
pub trait LearningPlanRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn get_plan(&self, subject: Subject) -> Result<Option<SubjectPlan>, StorageError>;

    /// Insert or replace the plan for `plan.subject()`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the plan cannot be stored.
    async fn upsert_plan(&self, plan: &SubjectPlan) -> Result<(), StorageError>;

    /// All plans, ordered by subject.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn list_plans(&self) -> Result<Vec<SubjectPlan>, StorageError>;
}

/// Append-only history of completed assessments.
#[async_trait]
pub trait AssessmentResultRepository: Send + Sync {
    /// Store a result and return its sequence number.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn append_result(&self, result: &AssessmentResult) -> Result<u64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown id.
    async fn get_result(&self, id: u64) -> Result<AssessmentResult, StorageError>;

    /// Most recently appended result for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn latest_result(&self, subject: Subject)
    -> Result<Option<AssessmentResult>, StorageError>;

    /// Every result for `subject`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn list_results(&self, subject: Subject) -> Result<Vec<AssessmentResult>, StorageError>;
}

/// Simple in-memory repository implementation for tests and the CLI.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<HashMap<Subject, Vec<Question>>>>,
    plans: Arc<Mutex<HashMap<Subject, SubjectPlan>>>,
    results: Arc<Mutex<Vec<AssessmentResult>>>,
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Poisoned(err.to_string())
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-filled with the built-in question bank and starter plans.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Seed` if the built-in content is invalid.
    pub fn seeded(now: DateTime<Utc>) -> Result<Self, StorageError> {
        let repo = Self::new();
        {
            let mut questions = repo.questions.lock().map_err(poisoned)?;
            *questions = seed::question_bank()?;
        }
        {
            let mut plans = repo.plans.lock().map_err(poisoned)?;
            for plan in seed::learning_plans(now)? {
                plans.insert(plan.subject(), plan);
            }
        }
        tracing::debug!("seeded in-memory repository");
        Ok(repo)
    }

    /// Replace the question set for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Poisoned` if the lock is poisoned.
    pub fn set_questions(
        &self,
        subject: Subject,
        questions: Vec<Question>,
    ) -> Result<(), StorageError> {
        let mut guard = self.questions.lock().map_err(poisoned)?;
        guard.insert(subject, questions);
        Ok(())
    }
}

#[async_trait]
impl QuestionProvider for InMemoryRepository {
    async fn provide_questions(&self, subject: Subject) -> Result<Vec<Question>, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        Ok(guard.get(&subject).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl LearningPlanRepository for InMemoryRepository {
    async fn get_plan(&self, subject: Subject) -> Result<Option<SubjectPlan>, StorageError> {
        let guard = self.plans.lock().map_err(poisoned)?;
        Ok(guard.get(&subject).cloned())
    }

    async fn upsert_plan(&self, plan: &SubjectPlan) -> Result<(), StorageError> {
        let mut guard = self.plans.lock().map_err(poisoned)?;
        guard.insert(plan.subject(), plan.clone());
        Ok(())
    }

    async fn list_plans(&self) -> Result<Vec<SubjectPlan>, StorageError> {
        let guard = self.plans.lock().map_err(poisoned)?;
        let mut plans: Vec<SubjectPlan> = guard.values().cloned().collect();
        plans.sort_by_key(SubjectPlan::subject);
        Ok(plans)
    }
}

#[async_trait]
impl AssessmentResultRepository for InMemoryRepository {
    async fn append_result(&self, result: &AssessmentResult) -> Result<u64, StorageError> {
        let mut guard = self.results.lock().map_err(poisoned)?;
        guard.push(result.clone());
        Ok(guard.len() as u64)
    }

    async fn get_result(&self, id: u64) -> Result<AssessmentResult, StorageError> {
        let guard = self.results.lock().map_err(poisoned)?;
        let index = usize::try_from(id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .ok_or(StorageError::NotFound)?;
        guard.get(index).cloned().ok_or(StorageError::NotFound)
    }

    async fn latest_result(
        &self,
        subject: Subject,
    ) -> Result<Option<AssessmentResult>, StorageError> {
        let guard = self.results.lock().map_err(poisoned)?;
        Ok(guard.iter().rev().find(|r| r.subject() == subject).cloned())
    }

    async fn list_results(&self, subject: Subject) -> Result<Vec<AssessmentResult>, StorageError> {
        let guard = self.results.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|r| r.subject() == subject)
            .cloned()
            .collect())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionProvider>,
    pub plans: Arc<dyn LearningPlanRepository>,
    pub results: Arc<dyn AssessmentResultRepository>,
}

impl Storage {
    /// In-memory storage holding the built-in sample content.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Seed` if the built-in content is invalid.
    pub fn seeded(now: DateTime<Utc>) -> Result<Self, StorageError> {
        Ok(Self::from_repository(InMemoryRepository::seeded(now)?))
    }

    fn from_repository(repo: InMemoryRepository) -> Self {
        let questions: Arc<dyn QuestionProvider> = Arc::new(repo.clone());
        let plans: Arc<dyn LearningPlanRepository> = Arc::new(repo.clone());
        let results: Arc<dyn AssessmentResultRepository> = Arc::new(repo);
        Self {
            questions,
            plans,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::model::{Difficulty, SkillBreakdown};
    use tutor_core::time::fixed_now;

    fn result(subject: Subject, score: u32) -> AssessmentResult {
        let mut breakdown = SkillBreakdown::new();
        if score > 0 {
            breakdown.insert("Skill".to_owned(), score);
        }
        AssessmentResult::new(
            subject,
            score,
            3,
            fixed_now(),
            breakdown,
            SkillBreakdown::new(),
            Vec::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn unknown_subject_provides_no_questions() {
        let repo = InMemoryRepository::new();
        let questions = repo.provide_questions(Subject::Arts).await.unwrap();
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn set_questions_keeps_order() {
        let repo = InMemoryRepository::new();
        let questions: Vec<Question> = (0..3)
            .map(|i| {
                Question::new(
                    format!("Q{i}"),
                    vec!["a".into(), "b".into()],
                    0,
                    "",
                    Difficulty::Beginner,
                    "Skill",
                )
                .unwrap()
            })
            .collect();
        repo.set_questions(Subject::Arts, questions.clone()).unwrap();

        let provided = repo.provide_questions(Subject::Arts).await.unwrap();
        assert_eq!(provided, questions);
    }

    #[tokio::test]
    async fn seeded_repository_has_math_plan() {
        let repo = InMemoryRepository::seeded(fixed_now()).unwrap();
        let plan = repo.get_plan(Subject::Mathematics).await.unwrap().unwrap();
        assert!((plan.progress() - 0.4).abs() < f64::EPSILON);
        assert_eq!(plan.focus_areas().len(), 3);
        assert!(repo.get_plan(Subject::Arts).await.unwrap().is_none());

        let plans = repo.list_plans().await.unwrap();
        let subjects: Vec<Subject> = plans.iter().map(SubjectPlan::subject).collect();
        assert_eq!(
            subjects,
            [Subject::Mathematics, Subject::English, Subject::Science]
        );
    }

    #[tokio::test]
    async fn results_are_kept_in_append_order() {
        let repo = InMemoryRepository::new();
        let first = repo.append_result(&result(Subject::English, 1)).await.unwrap();
        repo.append_result(&result(Subject::Science, 3)).await.unwrap();
        repo.append_result(&result(Subject::English, 2)).await.unwrap();

        assert_eq!(repo.get_result(first).await.unwrap().score(), 1);
        assert!(matches!(
            repo.get_result(0).await,
            Err(StorageError::NotFound)
        ));

        let latest = repo.latest_result(Subject::English).await.unwrap().unwrap();
        assert_eq!(latest.score(), 2);
        assert_eq!(repo.list_results(Subject::English).await.unwrap().len(), 2);
        assert!(repo.latest_result(Subject::Arts).await.unwrap().is_none());
    }
}
