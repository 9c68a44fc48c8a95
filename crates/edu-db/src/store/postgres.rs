use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ScheduledTestStore, StoreError};
use crate::{
    models::{NewScheduledTest, ScheduledTest},
    repositories::scheduled_test,
};

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgScheduledTestStore {
    pool: PgPool,
}

impl PgScheduledTestStore {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ScheduledTestStore for PgScheduledTestStore {
    async fn create(&self, test: NewScheduledTest) -> Result<Uuid, StoreError> {
        Ok(scheduled_test::insert(&self.pool, &test).await?)
    }

    async fn find_pending(&self, learner_id: Uuid) -> Result<Vec<ScheduledTest>, StoreError> {
        Ok(scheduled_test::list_pending(&self.pool, learner_id).await?)
    }

    async fn find(&self, test_id: Uuid, learner_id: Uuid) -> Result<ScheduledTest, StoreError> {
        scheduled_test::find_by_id(&self.pool, test_id, learner_id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn find_completed(
        &self,
        learner_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ScheduledTest>, StoreError> {
        Ok(scheduled_test::list_completed(&self.pool, learner_id, limit).await?)
    }

    async fn mark_completed(
        &self,
        test_id: Uuid,
        learner_id: Uuid,
        final_score: f64,
    ) -> Result<ScheduledTest, StoreError> {
        scheduled_test::mark_completed(&self.pool, test_id, learner_id, final_score)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, test_id: Uuid, learner_id: Uuid) -> Result<(), StoreError> {
        if scheduled_test::delete_pending(&self.pool, test_id, learner_id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }
}
