//! Review scheduling: turning scored attempts into scheduled review tests and
//! driving those tests through their lifecycle.

pub mod lifecycle;
pub mod model;
mod routes;
pub mod scheduler;

pub use lifecycle::{CompletionOutcome, MAX_REVIEW_QUESTIONS, ReviewLifecycle, UpcomingReviews};
pub use routes::routes;
pub use scheduler::ReviewScheduler;

use edu_srs::{Difficulty, Subject};
use uuid::Uuid;

/// A graded practice attempt, as handed over by the practice-submission flow
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAttempt {
    pub learner_id: Uuid,
    pub subject: Subject,
    pub topics: Vec<String>,
    pub difficulty: Difficulty,
    /// Percentage score in [0, 100]
    pub score: f64,
    /// Number of questions in the attempt
    pub question_count: i32,
}
