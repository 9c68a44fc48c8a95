//! Persistence contract for scheduled review tests.
//!
//! Every operation is scoped by learner id: a record owned by another learner
//! is indistinguishable from a missing one. Completion and deletion are
//! check-and-set operations that only succeed on pending records, so a second
//! completion or a cancellation after completion fails with
//! [`StoreError::NotFound`].

mod memory;
mod postgres;

pub use memory::MemoryScheduledTestStore;
pub use postgres::PgScheduledTestStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewScheduledTest, ScheduledTest};

#[derive(Error, Debug)]
pub enum StoreError {
    /// Missing, owned by another learner, or no longer pending
    #[error("scheduled test not found")]
    NotFound,
    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),
}

#[async_trait]
pub trait ScheduledTestStore: Send + Sync {
    /// Persist a new pending review and return its id
    async fn create(&self, test: NewScheduledTest) -> Result<Uuid, StoreError>;

    /// Pending reviews of a learner, ordered by `scheduled_for` ascending
    async fn find_pending(&self, learner_id: Uuid) -> Result<Vec<ScheduledTest>, StoreError>;

    /// A single review, pending or completed
    async fn find(&self, test_id: Uuid, learner_id: Uuid) -> Result<ScheduledTest, StoreError>;

    /// Completed reviews, most recently completed first
    async fn find_completed(
        &self,
        learner_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ScheduledTest>, StoreError>;

    /// Complete a pending review and return the updated record
    async fn mark_completed(
        &self,
        test_id: Uuid,
        learner_id: Uuid,
        final_score: f64,
    ) -> Result<ScheduledTest, StoreError>;

    /// Delete a pending review
    async fn delete(&self, test_id: Uuid, learner_id: Uuid) -> Result<(), StoreError>;
}
