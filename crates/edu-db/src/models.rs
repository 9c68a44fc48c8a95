use std::str::FromStr;

use chrono::{DateTime, Utc};
use edu_srs::{Difficulty, ParseEnumError, Priority, Subject};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, postgres::PgRow};
use uuid::Uuid;

/// Scheduled review test - a pending or completed future review for a learner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTest {
    /// Unique identifier
    pub id: Uuid,
    /// Learner who owns the review (indexed)
    pub learner_id: Uuid,
    /// Subject of the reviewed material
    pub subject: Subject,
    /// Curriculum units under review (order irrelevant)
    pub topics: Vec<String>,
    /// Difficulty of the questions to generate
    pub difficulty: Difficulty,
    /// Target number of questions when the review is taken
    pub question_count: i32,
    /// When the review becomes due
    pub scheduled_for: DateTime<Utc>,
    /// When the review was scheduled
    pub created_at: DateTime<Utc>,
    /// Why this schedule was chosen
    pub reason: String,
    pub priority: Priority,
    /// Score of the attempt that triggered this review, in [0, 100]
    pub original_score: f64,
    pub is_completed: bool,
    /// Set once, when the review is completed
    pub completed_at: Option<DateTime<Utc>>,
    /// Score obtained on the review, in [0, 100]
    pub final_score: Option<f64>,
    pub study_tips: Vec<String>,
    pub estimated_improvement: String,
}

/// Insert struct for ScheduledTest
/// Completion fields always start empty, the id is assigned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScheduledTest {
    pub learner_id: Uuid,
    pub subject: Subject,
    pub topics: Vec<String>,
    pub difficulty: Difficulty,
    pub question_count: i32,
    pub scheduled_for: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub reason: String,
    pub priority: Priority,
    pub original_score: f64,
    pub study_tips: Vec<String>,
    pub estimated_improvement: String,
}

impl NewScheduledTest {
    /// Build the pending record stored under `id`
    pub fn into_record(self, id: Uuid) -> ScheduledTest {
        ScheduledTest {
            id,
            learner_id: self.learner_id,
            subject: self.subject,
            topics: self.topics,
            difficulty: self.difficulty,
            question_count: self.question_count,
            scheduled_for: self.scheduled_for,
            created_at: self.created_at,
            reason: self.reason,
            priority: self.priority,
            original_score: self.original_score,
            is_completed: false,
            completed_at: None,
            final_score: None,
            study_tips: self.study_tips,
            estimated_improvement: self.estimated_improvement,
        }
    }
}

impl<'r> FromRow<'r, PgRow> for ScheduledTest {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            learner_id: row.try_get("learner_id")?,
            subject: decode_text_enum(row, "subject")?,
            topics: row.try_get("topics")?,
            difficulty: decode_text_enum(row, "difficulty")?,
            question_count: row.try_get("question_count")?,
            scheduled_for: row.try_get("scheduled_for")?,
            created_at: row.try_get("created_at")?,
            reason: row.try_get("reason")?,
            priority: decode_text_enum(row, "priority")?,
            original_score: row.try_get("original_score")?,
            is_completed: row.try_get("is_completed")?,
            completed_at: row.try_get("completed_at")?,
            final_score: row.try_get("final_score")?,
            study_tips: row.try_get("study_tips")?,
            estimated_improvement: row.try_get("estimated_improvement")?,
        })
    }
}

/// Enumerations are stored as lowercase TEXT columns
fn decode_text_enum<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = ParseEnumError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: ParseEnumError| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
