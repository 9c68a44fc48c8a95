//! Lifecycle of scheduled review tests.
//!
//! A review is created pending when an attempt is scored, and leaves the
//! pending state exactly once: completed (terminal, kept for history) or
//! cancelled (terminal, deleted). Completing below the mastery threshold
//! schedules the next review in the chain.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use edu_db::{NewScheduledTest, ScheduledTest, ScheduledTestStore, StoreError};
use edu_srs::{MASTERY_THRESHOLD, ScheduleRecommendation, normalize_score, normalize_topics};
use serde::Serialize;
use uuid::Uuid;

use super::{ReviewScheduler, ScoredAttempt};
use crate::metrics;

/// Upper bound on the question count of a review test
pub const MAX_REVIEW_QUESTIONS: i32 = 5;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Result of completing a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionOutcome {
    /// Whether a follow-up review was scheduled
    pub rechained: bool,
    /// Id of the follow-up review, when one was scheduled
    pub new_test_id: Option<Uuid>,
}

/// Pending reviews bucketed by due date
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpcomingReviews {
    /// Due before today
    pub overdue: Vec<ScheduledTest>,
    /// Due within the next 24 hours
    pub today: Vec<ScheduledTest>,
    /// Due in 1 to 7 days
    pub this_week: Vec<ScheduledTest>,
    /// Due in more than 7 days
    pub later: Vec<ScheduledTest>,
}

impl UpcomingReviews {
    /// Number of reviews across all buckets
    pub fn total(&self) -> usize {
        self.overdue.len() + self.today.len() + self.this_week.len() + self.later.len()
    }
}

/// Drives scheduled review tests from creation to completion or cancellation
pub struct ReviewLifecycle {
    scheduler: ReviewScheduler,
    store: Arc<dyn ScheduledTestStore>,
}

impl fmt::Debug for ReviewLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewLifecycle")
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl ReviewLifecycle {
    /// Lifecycle over `store`, scheduling with `scheduler`
    pub fn new(scheduler: ReviewScheduler, store: Arc<dyn ScheduledTestStore>) -> Self {
        Self { scheduler, store }
    }

    /// Scheduler used for new reviews
    pub const fn scheduler(&self) -> &ReviewScheduler {
        &self.scheduler
    }

    /// Schedule the review for a scored attempt and return its id
    pub async fn on_attempt_scored(&self, attempt: &ScoredAttempt) -> Result<Uuid, StoreError> {
        self.on_attempt_scored_at(attempt, Utc::now()).await
    }

    /// [`Self::on_attempt_scored`] with an explicit clock
    pub async fn on_attempt_scored_at(
        &self,
        attempt: &ScoredAttempt,
        now: DateTime<Utc>,
    ) -> Result<Uuid, StoreError> {
        let recommendation = self.scheduler.recommend_at(attempt, now).await;
        let priority = recommendation.priority;

        let test = NewScheduledTest {
            learner_id: attempt.learner_id,
            subject: attempt.subject,
            topics: normalize_topics(&attempt.topics),
            difficulty: attempt.difficulty,
            question_count: review_question_count(attempt.question_count),
            scheduled_for: recommendation.recommended_date,
            created_at: now,
            reason: recommendation.reason,
            priority,
            original_score: normalize_score(attempt.score),
            study_tips: recommendation.study_tips,
            estimated_improvement: recommendation.estimated_improvement,
        };
        let scheduled_for = test.scheduled_for;

        let id = self.store.create(test).await?;

        metrics::record_review_scheduled(priority);
        tracing::info!(
            learner_id = %attempt.learner_id,
            test_id = %id,
            subject = %attempt.subject,
            %priority,
            %scheduled_for,
            "Scheduled review test"
        );

        Ok(id)
    }

    /// Practice-submission boundary: a failure to schedule is logged and
    /// counted, never surfaced to the learner.
    pub async fn schedule_review_for_attempt(&self, attempt: &ScoredAttempt) -> Option<Uuid> {
        match self.on_attempt_scored(attempt).await {
            Ok(id) => Some(id),
            Err(err) => {
                metrics::record_schedule_failure();
                tracing::error!(
                    learner_id = %attempt.learner_id,
                    subject = %attempt.subject,
                    error = %err,
                    "Failed to schedule review test"
                );
                None
            }
        }
    }

    /// Complete a pending review, rechaining below the mastery threshold.
    ///
    /// If the follow-up cannot be stored the error propagates, but the
    /// completion itself stays recorded.
    pub async fn on_scheduled_test_completed(
        &self,
        test_id: Uuid,
        learner_id: Uuid,
        final_score: f64,
    ) -> Result<CompletionOutcome, StoreError> {
        let final_score = normalize_score(final_score);
        let completed = self
            .store
            .mark_completed(test_id, learner_id, final_score)
            .await?;

        if final_score >= MASTERY_THRESHOLD {
            metrics::record_review_completed(false);
            tracing::info!(%learner_id, %test_id, final_score, "Review chain mastered");
            return Ok(CompletionOutcome {
                rechained: false,
                new_test_id: None,
            });
        }

        let next = ScoredAttempt {
            learner_id,
            subject: completed.subject,
            topics: completed.topics,
            difficulty: completed.difficulty,
            score: final_score,
            question_count: completed.question_count,
        };

        let new_test_id = self.on_attempt_scored(&next).await.inspect_err(|err| {
            tracing::error!(
                %learner_id,
                %test_id,
                error = %err,
                "Review completed but the follow-up could not be scheduled"
            );
        })?;

        metrics::record_review_completed(true);
        tracing::info!(%learner_id, %test_id, %new_test_id, final_score, "Review rechained");

        Ok(CompletionOutcome {
            rechained: true,
            new_test_id: Some(new_test_id),
        })
    }

    /// Pending reviews of a learner, soonest first
    pub async fn pending_reviews(&self, learner_id: Uuid) -> Result<Vec<ScheduledTest>, StoreError> {
        self.store.find_pending(learner_id).await
    }

    /// Pending reviews of a learner bucketed relative to now
    pub async fn categorize_upcoming(&self, learner_id: Uuid) -> Result<UpcomingReviews, StoreError> {
        let pending = self.store.find_pending(learner_id).await?;
        Ok(categorize_at(pending, Utc::now()))
    }

    /// Cancel a pending review. Completed reviews cannot be cancelled.
    pub async fn cancel_scheduled_test(
        &self,
        test_id: Uuid,
        learner_id: Uuid,
    ) -> Result<(), StoreError> {
        self.store.delete(test_id, learner_id).await?;

        metrics::record_review_cancelled();
        tracing::info!(%learner_id, %test_id, "Cancelled review test");
        Ok(())
    }

    /// A single review owned by `learner_id`
    pub async fn get_scheduled_test(
        &self,
        test_id: Uuid,
        learner_id: Uuid,
    ) -> Result<ScheduledTest, StoreError> {
        self.store.find(test_id, learner_id).await
    }

    /// Completed reviews, most recent first
    pub async fn review_history(
        &self,
        learner_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ScheduledTest>, StoreError> {
        self.store.find_completed(learner_id, limit).await
    }

    /// Recommendation for an attempt without persisting anything
    pub async fn preview(&self, attempt: &ScoredAttempt) -> ScheduleRecommendation {
        self.scheduler.recommend(attempt).await
    }
}

/// Question count of the review of an attempt with `question_count` questions
pub fn review_question_count(question_count: i32) -> i32 {
    question_count.clamp(1, MAX_REVIEW_QUESTIONS)
}

/// Whole days from `now` until `scheduled_for`, rounded down (negative when overdue)
pub fn days_until(scheduled_for: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (scheduled_for - now)
        .num_milliseconds()
        .div_euclid(MILLIS_PER_DAY)
}

/// Bucket pending reviews relative to `now`, preserving their order
pub fn categorize_at(tests: Vec<ScheduledTest>, now: DateTime<Utc>) -> UpcomingReviews {
    let mut upcoming = UpcomingReviews::default();

    for test in tests {
        match days_until(test.scheduled_for, now) {
            d if d < 0 => upcoming.overdue.push(test),
            0 => upcoming.today.push(test),
            1..=7 => upcoming.this_week.push(test),
            _ => upcoming.later.push(test),
        }
    }

    upcoming
}
