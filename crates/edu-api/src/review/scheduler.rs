use std::{fmt, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use edu_srs::{
    BandPolicy, Refinement, ScheduleRecommendation, apply_refinement, normalize_score,
    normalize_topics,
};

use super::ScoredAttempt;
use crate::{
    advisor::{Advisor, AdvisorError, RefinementRequest},
    metrics,
};

/// Default bound for one refinement, retry included
pub const DEFAULT_REFINEMENT_TIMEOUT: Duration = Duration::from_secs(3);

/// Computes review recommendations: the band policy, optionally refined by an advisor.
///
/// Recommending never fails. Any advisor error, a malformed answer, or running
/// past the refinement timeout yields the unmodified base-band recommendation.
#[derive(Clone)]
pub struct ReviewScheduler {
    policy: BandPolicy,
    advisor: Option<Arc<dyn Advisor>>,
    refinement_timeout: Duration,
}

impl ReviewScheduler {
    /// Scheduler without refinement
    pub const fn new(policy: BandPolicy) -> Self {
        Self {
            policy,
            advisor: None,
            refinement_timeout: DEFAULT_REFINEMENT_TIMEOUT,
        }
    }

    /// Refine recommendations through `advisor`, bounded by `timeout`
    pub fn with_advisor(mut self, advisor: Arc<dyn Advisor>, timeout: Duration) -> Self {
        self.advisor = Some(advisor);
        self.refinement_timeout = timeout;
        self
    }

    /// Band policy behind the base recommendation
    pub const fn policy(&self) -> &BandPolicy {
        &self.policy
    }

    /// Whether recommendations go through an advisor
    pub const fn has_advisor(&self) -> bool {
        self.advisor.is_some()
    }

    /// Recommendation for an attempt scored now
    pub async fn recommend(&self, attempt: &ScoredAttempt) -> ScheduleRecommendation {
        self.recommend_at(attempt, Utc::now()).await
    }

    /// Recommendation for an attempt scored at `now`
    pub async fn recommend_at(
        &self,
        attempt: &ScoredAttempt,
        now: DateTime<Utc>,
    ) -> ScheduleRecommendation {
        let topics = normalize_topics(&attempt.topics);
        let base = self.policy.recommend_at(
            attempt.score,
            attempt.subject,
            &topics,
            attempt.difficulty,
            now,
        );

        let Some(advisor) = &self.advisor else {
            return base;
        };

        let request = RefinementRequest {
            subject: attempt.subject,
            topics,
            score: normalize_score(attempt.score),
            difficulty: attempt.difficulty,
            base_delay_days: base.delay_days,
        };

        let outcome = tokio::time::timeout(
            self.refinement_timeout,
            refine_with_retry(advisor.as_ref(), &request),
        )
        .await
        .unwrap_or(Err(AdvisorError::Timeout));

        match outcome {
            Ok(refinement) => {
                metrics::record_refinement("applied");
                let refined = apply_refinement(base, refinement, now);
                tracing::debug!(
                    learner_id = %attempt.learner_id,
                    delay_days = refined.delay_days,
                    "Applied advisory refinement"
                );
                refined
            }
            Err(err) => {
                metrics::record_refinement(err.kind());
                tracing::warn!(
                    learner_id = %attempt.learner_id,
                    subject = %attempt.subject,
                    error = %err,
                    "Refinement unavailable, using base recommendation"
                );
                base
            }
        }
    }
}

impl fmt::Debug for ReviewScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewScheduler")
            .field("policy", &self.policy)
            .field("has_advisor", &self.has_advisor())
            .field("refinement_timeout", &self.refinement_timeout)
            .finish()
    }
}

async fn refine_with_retry(
    advisor: &dyn Advisor,
    request: &RefinementRequest,
) -> Result<Refinement, AdvisorError> {
    match refine_checked(advisor, request).await {
        Err(err) if err.is_retryable() => {
            tracing::debug!(error = %err, "Retrying advisory refinement");
            refine_checked(advisor, request).await
        }
        outcome => outcome,
    }
}

/// An answer whose adjustment cannot be applied counts as malformed.
async fn refine_checked(
    advisor: &dyn Advisor,
    request: &RefinementRequest,
) -> Result<Refinement, AdvisorError> {
    let refinement = advisor.refine(request).await?;
    if refinement.is_well_formed() {
        Ok(refinement)
    } else {
        Err(AdvisorError::Malformed(format!(
            "timing adjustment out of range: {}",
            refinement.timing_adjustment_days
        )))
    }
}
