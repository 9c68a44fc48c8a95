use edu_srs::{Difficulty, Subject};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::ScoredAttempt;
use crate::{
    error::ApiError,
    validation::{validate_payload, validate_score, validate_topics},
};

const fn default_question_count() -> i32 {
    10
}

/// A scored practice attempt submitted for review scheduling
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AttemptSubmission {
    pub subject: Subject,
    #[serde(default)]
    pub topics: Vec<String>,
    pub difficulty: Difficulty,
    pub score: f64,
    #[serde(default = "default_question_count")]
    #[validate(range(min = 1, max = 100))]
    pub question_count: i32,
}

impl AttemptSubmission {
    pub fn validate_all(&self) -> Result<(), ApiError> {
        validate_payload(self)?;
        validate_score(self.score, "score")?;
        validate_topics(&self.topics)
    }

    pub fn into_attempt(self, learner_id: Uuid) -> ScoredAttempt {
        ScoredAttempt {
            learner_id,
            subject: self.subject,
            topics: self.topics,
            difficulty: self.difficulty,
            score: self.score,
            question_count: self.question_count,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionSubmission {
    pub final_score: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScheduledAttemptResponse {
    /// `None` when the review could not be scheduled
    pub scheduled_test_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn submission(value: serde_json::Value) -> Result<AttemptSubmission, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_attempt_defaults() {
        let payload = submission(json!({
            "subject": "biology",
            "difficulty": "hard",
            "score": 67.5
        }))
        .unwrap();

        assert_eq!(payload.question_count, 10);
        assert!(payload.topics.is_empty());
        assert!(payload.validate_all().is_ok());
    }

    #[test]
    fn test_attempt_rejects_unknown_fields() {
        let result = submission(json!({
            "subject": "biology",
            "difficulty": "hard",
            "score": 67.5,
            "priority": "low"
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_attempt_validation() {
        let mut payload = submission(json!({
            "subject": "physics",
            "topics": ["Optics"],
            "difficulty": "easy",
            "score": 120.0,
            "question_count": 8
        }))
        .unwrap();
        assert!(matches!(payload.validate_all(), Err(ApiError::Validation(_))));

        payload.score = 88.0;
        payload.question_count = 0;
        assert!(matches!(payload.validate_all(), Err(ApiError::Validation(_))));

        payload.question_count = 101;
        assert!(payload.validate_all().is_err());

        payload.question_count = 100;
        assert!(payload.validate_all().is_ok());
    }

    #[test]
    fn test_into_attempt_keeps_fields() {
        let learner_id = Uuid::new_v4();
        let attempt = submission(json!({
            "subject": "geography",
            "topics": ["Rivers", "Climate"],
            "difficulty": "mixed",
            "score": 59.0,
            "question_count": 12
        }))
        .unwrap()
        .into_attempt(learner_id);

        assert_eq!(attempt.learner_id, learner_id);
        assert_eq!(attempt.subject, Subject::Geography);
        assert_eq!(attempt.topics, vec!["Rivers", "Climate"]);
        assert_eq!(attempt.question_count, 12);
    }
}
