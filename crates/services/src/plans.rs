use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};

use storage::LearningPlanRepository;
use tutor_core::model::{AssessmentResult, GoalId, MasteryLevel, Subject, SubjectPlan, WeeklyGoal};
use tutor_core::time::one_week_after;

use crate::Clock;
use crate::error::PlanServiceError;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Why a plan operation left the store untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    PlanNotFound,
    GoalNotFound,
}

/// Outcome of a plan mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanUpdate {
    Applied,
    Skipped(SkipReason),
}

impl PlanUpdate {
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Notification sent to subscribers after a plan was changed.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanChange {
    ProgressUpdated { subject: Subject, progress: f64 },
    GoalAdded { subject: Subject, goal_id: GoalId },
    GoalCompleted { subject: Subject, goal_id: GoalId },
    ResultApplied { subject: Subject, progress: f64 },
}

impl PlanChange {
    #[must_use]
    pub fn subject(&self) -> Subject {
        match self {
            Self::ProgressUpdated { subject, .. }
            | Self::GoalAdded { subject, .. }
            | Self::GoalCompleted { subject, .. }
            | Self::ResultApplied { subject, .. } => *subject,
        }
    }
}

/// Owns learning plan mutations and publishes every applied change.
pub struct LearningPlanService {
    clock: Clock,
    plans: Arc<dyn LearningPlanRepository>,
    changes: broadcast::Sender<PlanChange>,
    // Serialises load, edit and upsert across plan mutations.
    write_lock: Mutex<()>,
}

impl LearningPlanService {
    #[must_use]
    pub fn new(clock: Clock, plans: Arc<dyn LearningPlanRepository>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            clock,
            plans,
            changes,
            write_lock: Mutex::new(()),
        }
    }

    /// Receive a `PlanChange` for every mutation applied after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PlanChange> {
        self.changes.subscribe()
    }

    /// # Errors
    ///
    /// Returns `PlanServiceError::Storage` if the repository fails.
    pub async fn get_plan(&self, subject: Subject) -> Result<Option<SubjectPlan>, PlanServiceError> {
        Ok(self.plans.get_plan(subject).await?)
    }

    /// # Errors
    ///
    /// Returns `PlanServiceError::Storage` if the repository fails.
    pub async fn list_plans(&self) -> Result<Vec<SubjectPlan>, PlanServiceError> {
        Ok(self.plans.list_plans().await?)
    }

    /// Set the progress fraction of the subject's plan.
    ///
    /// # Errors
    ///
    /// Returns `PlanServiceError::Plan` if `progress` is not a finite value in
    /// `[0, 1]`, or `PlanServiceError::Storage` if the repository fails.
    pub async fn update_progress(
        &self,
        subject: Subject,
        progress: f64,
    ) -> Result<PlanUpdate, PlanServiceError> {
        let _guard = self.write_lock.lock().await;
        let Some(mut plan) = self.load(subject, "update_progress").await? else {
            return Ok(PlanUpdate::Skipped(SkipReason::PlanNotFound));
        };
        plan.set_progress(progress)?;
        self.plans.upsert_plan(&plan).await?;

        tracing::info!(%subject, progress, "plan progress updated");
        self.publish(PlanChange::ProgressUpdated { subject, progress });
        Ok(PlanUpdate::Applied)
    }

    /// Append `goal` to the subject's plan.
    ///
    /// # Errors
    ///
    /// Returns `PlanServiceError::Storage` if the repository fails.
    pub async fn add_weekly_goal(
        &self,
        subject: Subject,
        goal: WeeklyGoal,
    ) -> Result<PlanUpdate, PlanServiceError> {
        let _guard = self.write_lock.lock().await;
        let Some(mut plan) = self.load(subject, "add_weekly_goal").await? else {
            return Ok(PlanUpdate::Skipped(SkipReason::PlanNotFound));
        };
        let goal_id = goal.id();
        plan.add_weekly_goal(goal);
        self.plans.upsert_plan(&plan).await?;

        tracing::info!(%subject, %goal_id, "weekly goal added");
        self.publish(PlanChange::GoalAdded { subject, goal_id });
        Ok(PlanUpdate::Applied)
    }

    /// Build a goal due one week from now and append it to the subject's plan.
    ///
    /// # Errors
    ///
    /// Returns `PlanServiceError::Plan` for an empty title, or
    /// `PlanServiceError::Storage` if the repository fails.
    pub async fn create_weekly_goal(
        &self,
        subject: Subject,
        title: &str,
        description: &str,
    ) -> Result<(GoalId, PlanUpdate), PlanServiceError> {
        let goal = WeeklyGoal::new(title, description, one_week_after(self.clock.now()))?;
        let id = goal.id();
        let update = self.add_weekly_goal(subject, goal).await?;
        Ok((id, update))
    }

    /// Flag a weekly goal as completed.
    ///
    /// # Errors
    ///
    /// Returns `PlanServiceError::Storage` if the repository fails.
    pub async fn mark_goal_completed(
        &self,
        subject: Subject,
        goal_id: GoalId,
    ) -> Result<PlanUpdate, PlanServiceError> {
        let _guard = self.write_lock.lock().await;
        let Some(mut plan) = self.load(subject, "mark_goal_completed").await? else {
            return Ok(PlanUpdate::Skipped(SkipReason::PlanNotFound));
        };
        if !plan.complete_goal(goal_id) {
            tracing::warn!(%subject, %goal_id, "mark_goal_completed: no such goal");
            return Ok(PlanUpdate::Skipped(SkipReason::GoalNotFound));
        }
        self.plans.upsert_plan(&plan).await?;

        tracing::info!(%subject, %goal_id, "weekly goal completed");
        self.publish(PlanChange::GoalCompleted { subject, goal_id });
        Ok(PlanUpdate::Applied)
    }

    /// Fold a completed assessment into the subject's plan.
    ///
    /// Progress becomes the result's percentage as a fraction. Focus areas
    /// named after an assessed skill take the mastery of that skill's ratio.
    ///
    /// # Errors
    ///
    /// Returns `PlanServiceError::Storage` if the repository fails.
    pub async fn apply_result(
        &self,
        result: &AssessmentResult,
    ) -> Result<PlanUpdate, PlanServiceError> {
        let subject = result.subject();
        let _guard = self.write_lock.lock().await;
        let Some(mut plan) = self.load(subject, "apply_result").await? else {
            return Ok(PlanUpdate::Skipped(SkipReason::PlanNotFound));
        };

        let progress = result.percentage() / 100.0;
        plan.set_progress(progress)?;
        for skill in result.skill_totals().keys() {
            if let Some(ratio) = result.skill_ratio(skill) {
                let level = MasteryLevel::from_percentage(ratio * 100.0);
                if plan.set_focus_mastery(skill, level) {
                    tracing::debug!(%subject, skill = %skill, ?level, "focus area mastery updated");
                }
            }
        }
        self.plans.upsert_plan(&plan).await?;

        tracing::info!(%subject, progress, "assessment applied to plan");
        self.publish(PlanChange::ResultApplied { subject, progress });
        Ok(PlanUpdate::Applied)
    }

    async fn load(
        &self,
        subject: Subject,
        operation: &'static str,
    ) -> Result<Option<SubjectPlan>, PlanServiceError> {
        let plan = self.plans.get_plan(subject).await?;
        if plan.is_none() {
            tracing::warn!(%subject, operation, "no learning plan for subject");
        }
        Ok(plan)
    }

    fn publish(&self, change: PlanChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::InMemoryRepository;
    use tutor_core::model::{PlanError, SkillBreakdown};
    use tutor_core::time::fixed_now;

    fn service() -> LearningPlanService {
        let repo = InMemoryRepository::seeded(fixed_now()).unwrap();
        LearningPlanService::new(Clock::fixed(fixed_now()), Arc::new(repo))
    }

    fn completed_flags(plan: &SubjectPlan) -> Vec<bool> {
        plan.weekly_goals().iter().map(WeeklyGoal::is_completed).collect()
    }

    #[tokio::test]
    async fn seeded_math_plan_is_available() {
        let svc = service();
        let plan = svc.get_plan(Subject::Mathematics).await.unwrap().unwrap();
        assert!((plan.progress() - 0.4).abs() < f64::EPSILON);
        assert_eq!(plan.focus_areas().len(), 3);
        assert_eq!(svc.list_plans().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn progress_updates_are_validated() {
        let svc = service();
        let update = svc.update_progress(Subject::English, 0.75).await.unwrap();
        assert!(update.is_applied());
        let plan = svc.get_plan(Subject::English).await.unwrap().unwrap();
        assert!((plan.progress() - 0.75).abs() < f64::EPSILON);

        for bad in [-0.1, 1.5, f64::NAN] {
            let err = svc.update_progress(Subject::English, bad).await.unwrap_err();
            assert!(matches!(
                err,
                PlanServiceError::Plan(PlanError::InvalidProgress { .. })
            ));
        }
        let plan = svc.get_plan(Subject::English).await.unwrap().unwrap();
        assert!((plan.progress() - 0.75).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn missing_plan_is_skipped() {
        let svc = service();
        let mut changes = svc.subscribe();

        let update = svc.update_progress(Subject::Arts, 0.5).await.unwrap();
        assert_eq!(update, PlanUpdate::Skipped(SkipReason::PlanNotFound));
        let (_, update) = svc
            .create_weekly_goal(Subject::Arts, "Sketch", "Draw every day")
            .await
            .unwrap();
        assert_eq!(update, PlanUpdate::Skipped(SkipReason::PlanNotFound));
        let update = svc
            .mark_goal_completed(Subject::Arts, GoalId::new())
            .await
            .unwrap();
        assert_eq!(update, PlanUpdate::Skipped(SkipReason::PlanNotFound));

        let mut breakdown = SkillBreakdown::new();
        breakdown.insert("Drawing".to_owned(), 1);
        let arts = AssessmentResult::new(
            Subject::Arts,
            1,
            2,
            fixed_now(),
            breakdown.clone(),
            breakdown,
            Vec::new(),
        )
        .unwrap();
        let update = svc.apply_result(&arts).await.unwrap();
        assert_eq!(update, PlanUpdate::Skipped(SkipReason::PlanNotFound));

        assert!(svc.get_plan(Subject::Arts).await.unwrap().is_none());
        assert!(changes.try_recv().is_err());
    }

    /// Plan store that yields inside every read so overlapping mutations interleave.
    struct YieldingPlans(InMemoryRepository);

    #[async_trait::async_trait]
    impl LearningPlanRepository for YieldingPlans {
        async fn get_plan(
            &self,
            subject: Subject,
        ) -> Result<Option<SubjectPlan>, storage::StorageError> {
            let plan = self.0.get_plan(subject).await;
            tokio::task::yield_now().await;
            plan
        }

        async fn upsert_plan(&self, plan: &SubjectPlan) -> Result<(), storage::StorageError> {
            tokio::task::yield_now().await;
            self.0.upsert_plan(plan).await
        }

        async fn list_plans(&self) -> Result<Vec<SubjectPlan>, storage::StorageError> {
            self.0.list_plans().await
        }
    }

    #[tokio::test]
    async fn overlapping_goal_adds_are_both_kept() {
        let repo = InMemoryRepository::seeded(fixed_now()).unwrap();
        let svc = LearningPlanService::new(
            Clock::fixed(fixed_now()),
            Arc::new(YieldingPlans(repo.clone())),
        );
        let mut changes = svc.subscribe();
        let before = svc.get_plan(Subject::Mathematics).await.unwrap().unwrap();

        let (first, second) = tokio::join!(
            svc.create_weekly_goal(Subject::Mathematics, "A", ""),
            svc.create_weekly_goal(Subject::Mathematics, "B", ""),
        );
        let (first_id, first_update) = first.unwrap();
        let (second_id, second_update) = second.unwrap();
        assert!(first_update.is_applied());
        assert!(second_update.is_applied());

        let after = repo.get_plan(Subject::Mathematics).await.unwrap().unwrap();
        assert_eq!(after.weekly_goals().len(), before.weekly_goals().len() + 2);
        assert!(after.goal(first_id).is_some());
        assert!(after.goal(second_id).is_some());

        for _ in 0..2 {
            assert!(matches!(
                changes.try_recv().unwrap(),
                PlanChange::GoalAdded { .. }
            ));
        }
    }

    #[tokio::test]
    async fn unknown_goal_leaves_flags_unchanged() {
        let svc = service();
        let before = svc.get_plan(Subject::Science).await.unwrap().unwrap();

        let update = svc
            .mark_goal_completed(Subject::Science, GoalId::new())
            .await
            .unwrap();
        assert_eq!(update, PlanUpdate::Skipped(SkipReason::GoalNotFound));

        let after = svc.get_plan(Subject::Science).await.unwrap().unwrap();
        assert_eq!(completed_flags(&before), completed_flags(&after));
    }

    #[tokio::test]
    async fn created_goal_is_due_in_a_week_and_can_be_completed() {
        let svc = service();
        let mut changes = svc.subscribe();

        let (goal_id, update) = svc
            .create_weekly_goal(Subject::Mathematics, "Times Tables", "Recite the 7s")
            .await
            .unwrap();
        assert!(update.is_applied());
        assert_eq!(
            changes.try_recv().unwrap(),
            PlanChange::GoalAdded {
                subject: Subject::Mathematics,
                goal_id
            }
        );

        svc.mark_goal_completed(Subject::Mathematics, goal_id)
            .await
            .unwrap();
        let change = changes.try_recv().unwrap();
        assert_eq!(change.subject(), Subject::Mathematics);

        let plan = svc.get_plan(Subject::Mathematics).await.unwrap().unwrap();
        let goal = plan.goal(goal_id).unwrap();
        assert!(goal.is_completed());
        assert_eq!(goal.due_date(), one_week_after(fixed_now()));
        assert_eq!(plan.weekly_goals().len(), 3);
    }

    #[tokio::test]
    async fn applying_a_result_updates_progress_and_mastery() {
        let svc = service();
        let mut changes = svc.subscribe();

        let mut breakdown = SkillBreakdown::new();
        breakdown.insert("Number Operations".to_owned(), 1);
        breakdown.insert("Geometry".to_owned(), 1);
        let totals: SkillBreakdown = [("Number Operations", 1), ("Geometry", 1), ("Fractions", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect();
        let result = AssessmentResult::new(
            Subject::Mathematics,
            2,
            3,
            fixed_now(),
            breakdown,
            totals,
            Vec::new(),
        )
        .unwrap();

        assert!(svc.apply_result(&result).await.unwrap().is_applied());

        let plan = svc.get_plan(Subject::Mathematics).await.unwrap().unwrap();
        assert!((plan.progress() - 2.0 / 3.0).abs() < 1e-9);
        let mastery = |name: &str| {
            plan.focus_areas()
                .iter()
                .find(|a| a.name() == name)
                .map(|a| a.mastery_level())
        };
        assert_eq!(mastery("Number Operations"), Some(MasteryLevel::Advanced));
        assert_eq!(mastery("Geometry"), Some(MasteryLevel::Advanced));
        assert_eq!(mastery("Fractions"), Some(MasteryLevel::Beginner));

        assert!(matches!(
            changes.try_recv().unwrap(),
            PlanChange::ResultApplied {
                subject: Subject::Mathematics,
                ..
            }
        ));
    }
}
