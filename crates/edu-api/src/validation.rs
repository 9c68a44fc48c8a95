use validator::Validate;

use crate::error::ApiError;

/// Maximum number of topics accepted for one attempt
pub const MAX_TOPICS: usize = 20;

/// Maximum length of a single topic, in characters
pub const MAX_TOPIC_LENGTH: usize = 200;

/// Default and maximum page size for review history
pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
pub const MAX_HISTORY_LIMIT: i64 = 100;

/// Run the derived `validator` rules of a request payload
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))
}

/// Validate a percentage score
///
/// # Examples
/// ```
/// use edu_api::validation::validate_score;
///
/// assert!(validate_score(87.5, "score").is_ok());
/// assert!(validate_score(101.0, "score").is_err());
/// ```
pub fn validate_score(score: f64, field: &str) -> Result<(), ApiError> {
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return Err(ApiError::Validation(format!(
            "{field} must be a number between 0 and 100, got {score}"
        )));
    }

    Ok(())
}

/// Validate the topic list of an attempt. An empty list is allowed.
pub fn validate_topics(topics: &[String]) -> Result<(), ApiError> {
    if topics.len() > MAX_TOPICS {
        return Err(ApiError::Validation(format!(
            "At most {MAX_TOPICS} topics can be reviewed at once"
        )));
    }

    for topic in topics {
        let trimmed = topic.trim();

        if trimmed.is_empty() {
            return Err(ApiError::Validation("Topics cannot be blank".to_string()));
        }

        if trimmed.chars().count() > MAX_TOPIC_LENGTH {
            return Err(ApiError::Validation(format!(
                "Topic must be at most {MAX_TOPIC_LENGTH} characters long"
            )));
        }
    }

    Ok(())
}

/// Resolve the history page size
pub fn validate_history_limit(limit: Option<i64>) -> Result<i64, ApiError> {
    match limit {
        None => Ok(DEFAULT_HISTORY_LIMIT),
        Some(limit) if (1..=MAX_HISTORY_LIMIT).contains(&limit) => Ok(limit),
        Some(limit) => Err(ApiError::Validation(format!(
            "limit must be between 1 and {MAX_HISTORY_LIMIT}, got {limit}"
        ))),
    }
}
