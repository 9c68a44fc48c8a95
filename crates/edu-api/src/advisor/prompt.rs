use edu_srs::Refinement;
use sha2::{Digest, Sha256};

use super::{AdvisorError, RefinementRequest};

/// Render the advisory prompt for a request. Topics are sorted so that the
/// same topic set always yields the same prompt (and cache key).
pub fn build_prompt(request: &RefinementRequest) -> String {
    let mut topics = request.topics.clone();
    topics.sort();

    format!(
        "A student scored {score:.1}% on a {difficulty} {subject} practice test covering: {topics}.\n\
         The scheduling policy proposes a review in {delay:.2} days.\n\
         Reply with a single JSON object and nothing else, using exactly these fields:\n\
         {{\"timing_adjustment_days\": number (signed days added to the proposed delay), \
         \"study_tips\": [string], \"learning_strategy\": string, \"focus_areas\": [string], \
         \"estimated_improvement\": string}}",
        score = request.score,
        difficulty = request.difficulty,
        subject = request.subject,
        topics = topics.join(", "),
        delay = request.base_delay_days,
    )
}

/// Cache key for a prompt: hex-encoded SHA-256
pub fn prompt_key(prompt: &str) -> String {
    hex::encode(Sha256::digest(prompt.as_bytes()))
}

/// Extract and decode the refinement object from generated text.
///
/// The text may wrap the object in prose or a fenced code block; the span from
/// the first `{` to the last `}` is decoded strictly.
pub fn parse_refinement(text: &str) -> Result<Refinement, AdvisorError> {
    let start = text
        .find('{')
        .ok_or_else(|| AdvisorError::Malformed("no JSON object in response".to_string()))?;
    let end = text
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| AdvisorError::Malformed("unterminated JSON object".to_string()))?;

    let refinement: Refinement = serde_json::from_str(&text[start..=end])
        .map_err(|e| AdvisorError::Malformed(e.to_string()))?;

    if !refinement.is_well_formed() {
        return Err(AdvisorError::Malformed(
            "timing adjustment is not a finite number of days within range".to_string(),
        ));
    }

    Ok(refinement)
}

#[cfg(test)]
mod tests {
    use edu_srs::{Difficulty, Subject};

    use super::*;

    fn request(topics: &[&str]) -> RefinementRequest {
        RefinementRequest {
            subject: Subject::Chemistry,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            score: 64.0,
            difficulty: Difficulty::Hard,
            base_delay_days: 1.8,
        }
    }

    #[test]
    fn test_prompt_is_stable_for_topic_order() {
        let a = build_prompt(&request(&["Acids", "Bases"]));
        let b = build_prompt(&request(&["Bases", "Acids"]));

        assert_eq!(a, b);
        assert_eq!(prompt_key(&a), prompt_key(&b));
        assert!(a.contains("64.0%"));
        assert!(a.contains("hard chemistry"));
        assert!(a.contains("1.80 days"));
    }

    #[test]
    fn test_prompt_key_is_sha256_hex() {
        let key = prompt_key("hello");
        assert_eq!(key.len(), 64);
        assert_eq!(
            key,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_parse_plain_json() {
        let refinement =
            parse_refinement(r#"{"timing_adjustment_days": -0.5, "study_tips": ["Redo titrations"]}"#)
                .unwrap();

        assert_eq!(refinement.timing_adjustment_days, -0.5);
        assert_eq!(refinement.study_tips, vec!["Redo titrations"]);
    }

    #[test]
    fn test_parse_fenced_json_with_prose() {
        let text = "Here is my suggestion:\n```json\n{\"timing_adjustment_days\": 1, \"focus_areas\": [\"pH scale\"]}\n```\nGood luck!";
        let refinement = parse_refinement(text).unwrap();

        assert_eq!(refinement.timing_adjustment_days, 1.0);
        assert_eq!(refinement.focus_areas, vec!["pH scale"]);
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(matches!(
            parse_refinement("I cannot help with that."),
            Err(AdvisorError::Malformed(_))
        ));
        assert!(matches!(
            parse_refinement(r#"{"study_tips": []}"#),
            Err(AdvisorError::Malformed(_))
        ));
        assert!(matches!(
            parse_refinement(r#"{"timing_adjustment_days": 1, "priority": "low"}"#),
            Err(AdvisorError::Malformed(_))
        ));
        assert!(matches!(
            parse_refinement(r#"{"timing_adjustment_days": "soon"}"#),
            Err(AdvisorError::Malformed(_))
        ));
        assert!(matches!(parse_refinement("} {"), Err(AdvisorError::Malformed(_))));
    }

    #[test]
    fn test_parse_rejects_out_of_range_adjustment() {
        assert!(matches!(
            parse_refinement(r#"{"timing_adjustment_days": 1e9}"#),
            Err(AdvisorError::Malformed(_))
        ));
        assert!(matches!(
            parse_refinement(r#"{"timing_adjustment_days": -400}"#),
            Err(AdvisorError::Malformed(_))
        ));
        assert!(parse_refinement(r#"{"timing_adjustment_days": 365}"#).is_ok());
    }
}
