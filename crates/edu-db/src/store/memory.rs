use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ScheduledTestStore, StoreError};
use crate::models::{NewScheduledTest, ScheduledTest};

/// In-process store, used when no database is configured and in tests.
/// The write lock makes completion and deletion atomic check-and-set operations.
#[derive(Debug, Default)]
pub struct MemoryScheduledTestStore {
    tests: RwLock<HashMap<Uuid, ScheduledTest>>,
}

impl MemoryScheduledTestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, pending and completed
    pub async fn len(&self) -> usize {
        self.tests.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tests.read().await.is_empty()
    }
}

#[async_trait]
impl ScheduledTestStore for MemoryScheduledTestStore {
    async fn create(&self, test: NewScheduledTest) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        self.tests.write().await.insert(id, test.into_record(id));
        Ok(id)
    }

    async fn find_pending(&self, learner_id: Uuid) -> Result<Vec<ScheduledTest>, StoreError> {
        let tests = self.tests.read().await;
        let mut pending: Vec<ScheduledTest> = tests
            .values()
            .filter(|t| t.learner_id == learner_id && !t.is_completed)
            .cloned()
            .collect();

        pending.sort_by(|a, b| {
            a.scheduled_for
                .cmp(&b.scheduled_for)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(pending)
    }

    async fn find(&self, test_id: Uuid, learner_id: Uuid) -> Result<ScheduledTest, StoreError> {
        self.tests
            .read()
            .await
            .get(&test_id)
            .filter(|t| t.learner_id == learner_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_completed(
        &self,
        learner_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ScheduledTest>, StoreError> {
        let tests = self.tests.read().await;
        let mut completed: Vec<ScheduledTest> = tests
            .values()
            .filter(|t| t.learner_id == learner_id && t.is_completed)
            .cloned()
            .collect();

        completed.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        completed.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(completed)
    }

    async fn mark_completed(
        &self,
        test_id: Uuid,
        learner_id: Uuid,
        final_score: f64,
    ) -> Result<ScheduledTest, StoreError> {
        let mut tests = self.tests.write().await;
        let test = tests
            .get_mut(&test_id)
            .filter(|t| t.learner_id == learner_id && !t.is_completed)
            .ok_or(StoreError::NotFound)?;

        test.is_completed = true;
        test.completed_at = Some(Utc::now().max(test.created_at));
        test.final_score = Some(final_score);
        Ok(test.clone())
    }

    async fn delete(&self, test_id: Uuid, learner_id: Uuid) -> Result<(), StoreError> {
        let mut tests = self.tests.write().await;
        let deletable = tests
            .get(&test_id)
            .is_some_and(|t| t.learner_id == learner_id && !t.is_completed);

        if !deletable {
            return Err(StoreError::NotFound);
        }

        tests.remove(&test_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use edu_srs::{Difficulty, Priority, Subject};

    use super::*;

    fn new_test(learner_id: Uuid, due_in_hours: i64) -> NewScheduledTest {
        let now = Utc::now();
        NewScheduledTest {
            learner_id,
            subject: Subject::Math,
            topics: vec!["Algebra".to_string()],
            difficulty: Difficulty::Medium,
            question_count: 5,
            scheduled_for: now + Duration::hours(due_in_hours),
            created_at: now,
            reason: "Adequate understanding of Algebra".to_string(),
            priority: Priority::Medium,
            original_score: 74.0,
            study_tips: vec![],
            estimated_improvement: String::new(),
        }
    }

    #[tokio::test]
    async fn test_find_pending_is_ordered_and_scoped() {
        let store = MemoryScheduledTestStore::new();
        let learner = Uuid::new_v4();
        let other = Uuid::new_v4();

        let later = store.create(new_test(learner, 72)).await.unwrap();
        let sooner = store.create(new_test(learner, 6)).await.unwrap();
        store.create(new_test(other, 1)).await.unwrap();

        let pending = store.find_pending(learner).await.unwrap();
        let ids: Vec<Uuid> = pending.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![sooner, later]);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_mark_completed_only_once() {
        let store = MemoryScheduledTestStore::new();
        let learner = Uuid::new_v4();
        let id = store.create(new_test(learner, 12)).await.unwrap();

        let completed = store.mark_completed(id, learner, 88.0).await.unwrap();
        assert!(completed.is_completed);
        assert_eq!(completed.final_score, Some(88.0));
        assert!(completed.completed_at.unwrap() >= completed.created_at);

        let again = store.mark_completed(id, learner, 90.0).await;
        assert!(matches!(again, Err(StoreError::NotFound)));

        assert!(store.find_pending(learner).await.unwrap().is_empty());
        assert_eq!(store.find_completed(learner, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_other_learner_cannot_touch_record() {
        let store = MemoryScheduledTestStore::new();
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let id = store.create(new_test(owner, 24)).await.unwrap();

        assert!(matches!(store.find(id, intruder).await, Err(StoreError::NotFound)));
        assert!(matches!(
            store.mark_completed(id, intruder, 50.0).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(store.delete(id, intruder).await, Err(StoreError::NotFound)));
        assert!(store.find(id, owner).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_rejects_completed_records() {
        let store = MemoryScheduledTestStore::new();
        let learner = Uuid::new_v4();
        let id = store.create(new_test(learner, 24)).await.unwrap();

        store.mark_completed(id, learner, 70.0).await.unwrap();
        assert!(matches!(store.delete(id, learner).await, Err(StoreError::NotFound)));

        let pending = store.create(new_test(learner, 24)).await.unwrap();
        store.delete(pending, learner).await.unwrap();
        assert!(matches!(store.delete(pending, learner).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_find_completed_respects_limit() {
        let store = MemoryScheduledTestStore::new();
        let learner = Uuid::new_v4();

        for _ in 0..3 {
            let id = store.create(new_test(learner, 1)).await.unwrap();
            store.mark_completed(id, learner, 60.0).await.unwrap();
        }

        assert_eq!(store.find_completed(learner, 2).await.unwrap().len(), 2);
        assert!(store.find_completed(learner, 0).await.unwrap().is_empty());
    }
}
