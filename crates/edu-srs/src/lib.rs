//! Review scheduling policy for practice tests.
//!
//! This crate turns the score of a completed practice attempt into a
//! [`ScheduleRecommendation`]: when the learner should take a review test, how
//! urgent it is, why, and what to study in the meantime. Everything here is
//! pure and synchronous; the optional advisory refinement is fetched elsewhere
//! and applied with [`apply_refinement`].

mod policy;
mod types;

pub use policy::{BandPolicy, BandRule, ScoreBand};
pub use types::{Difficulty, ParseEnumError, Priority, Subject};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Minimum delay between an attempt and its review, in days (6 hours).
pub const MIN_DELAY_DAYS: f64 = 0.25;

/// Final score at or above which a review chain stops.
pub const MASTERY_THRESHOLD: f64 = 95.0;

/// Largest timing adjustment, in days, an advisory refinement may carry.
pub const MAX_ADJUSTMENT_DAYS: f64 = 365.0;

/// Topic used when an attempt carries no topics.
pub const DEFAULT_TOPIC: &str = "General";

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Recommendation produced for a scored attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecommendation {
    /// When the review becomes due
    pub recommended_date: DateTime<Utc>,
    /// Urgency, decided by the score band alone
    pub priority: Priority,
    /// Human-readable explanation of the band choice
    pub reason: String,
    /// Suggestions for what to practise before the review
    pub study_tips: Vec<String>,
    /// Expected gain from the review, as shown to the learner
    pub estimated_improvement: String,
    /// Final delay, in days, between the attempt and `recommended_date`
    pub delay_days: f64,
    /// Topics the advisor singled out, empty without refinement
    #[serde(default)]
    pub focus_areas: Vec<String>,
    /// Advisory learning strategy, if any
    #[serde(default)]
    pub learning_strategy: Option<String>,
    /// Whether an advisory refinement was applied
    #[serde(default)]
    pub refined: bool,
}

/// Advisory adjustment of a base recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Refinement {
    /// Signed number of days added to the base delay
    pub timing_adjustment_days: f64,
    /// Replacement study tips; ignored when empty
    #[serde(default)]
    pub study_tips: Vec<String>,
    #[serde(default)]
    pub learning_strategy: Option<String>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    /// Replacement improvement estimate; ignored when blank
    #[serde(default)]
    pub estimated_improvement: Option<String>,
}

impl Refinement {
    /// A refinement can only be applied when its adjustment is finite and
    /// within [`MAX_ADJUSTMENT_DAYS`] either way.
    pub fn is_well_formed(&self) -> bool {
        self.timing_adjustment_days.is_finite()
            && self.timing_adjustment_days.abs() <= MAX_ADJUSTMENT_DAYS
    }
}

/// Apply an advisory refinement to a base recommendation computed at `now`.
///
/// The final delay is `max(MIN_DELAY_DAYS, base + adjustment)`. Priority and
/// reason are never touched; tips, focus areas, strategy and the improvement
/// estimate are only replaced when the refinement provides non-empty values.
/// A malformed refinement, or one whose due date is not representable,
/// leaves the base recommendation unchanged.
pub fn apply_refinement(
    base: ScheduleRecommendation,
    refinement: Refinement,
    now: DateTime<Utc>,
) -> ScheduleRecommendation {
    if !refinement.is_well_formed() {
        return base;
    }

    let delay_days = (base.delay_days + refinement.timing_adjustment_days).max(MIN_DELAY_DAYS);
    let Some(recommended_date) = checked_due_date(now, delay_days) else {
        return base;
    };

    let study_tips = non_empty(refinement.study_tips).unwrap_or(base.study_tips);
    let estimated_improvement = refinement
        .estimated_improvement
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(base.estimated_improvement);
    let learning_strategy = refinement
        .learning_strategy
        .filter(|s| !s.trim().is_empty())
        .or(base.learning_strategy);

    ScheduleRecommendation {
        recommended_date,
        priority: base.priority,
        reason: base.reason,
        study_tips,
        estimated_improvement,
        delay_days,
        focus_areas: non_empty(refinement.focus_areas).unwrap_or(base.focus_areas),
        learning_strategy,
        refined: true,
    }
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    let items: Vec<String> = items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();

    (!items.is_empty()).then_some(items)
}

/// Clamp a score into [0, 100]; NaN counts as 0.
pub fn normalize_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// Trim and deduplicate topics, preserving first occurrence order.
/// An empty result becomes [`DEFAULT_TOPIC`].
pub fn normalize_topics<S: AsRef<str>>(topics: &[S]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(topics.len());

    for topic in topics {
        let topic = topic.as_ref().trim();
        if !topic.is_empty() && !normalized.iter().any(|t| t == topic) {
            normalized.push(topic.to_string());
        }
    }

    if normalized.is_empty() {
        normalized.push(DEFAULT_TOPIC.to_string());
    }

    normalized
}

/// Convert a fractional number of days into a chrono duration (millisecond precision).
pub fn days_to_duration(days: f64) -> Duration {
    Duration::milliseconds((days * MILLIS_PER_DAY).round() as i64)
}

/// `now` shifted by `days`, or `None` when the result overflows.
pub fn checked_due_date(now: DateTime<Utc>, days: f64) -> Option<DateTime<Utc>> {
    let millis = days * MILLIS_PER_DAY;
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    let delta = Duration::try_milliseconds(millis.round() as i64)?;
    now.checked_add_signed(delta)
}

fn topics_label(topics: &[String]) -> String {
    normalize_topics(topics).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(now: DateTime<Utc>, score: f64) -> ScheduleRecommendation {
        BandPolicy::default().recommend_at(
            score,
            Subject::Biology,
            &["Nutrition in Plants".to_string()],
            Difficulty::Medium,
            now,
        )
    }

    fn refinement(adjustment: f64) -> Refinement {
        Refinement {
            timing_adjustment_days: adjustment,
            study_tips: vec![],
            learning_strategy: None,
            focus_areas: vec![],
            estimated_improvement: None,
        }
    }

    #[test]
    fn test_days_to_duration() {
        assert_eq!(days_to_duration(0.25), Duration::hours(6));
        assert_eq!(days_to_duration(0.5), Duration::hours(12));
        assert_eq!(days_to_duration(2.0), Duration::days(2));
    }

    #[test]
    fn test_normalize_topics() {
        let topics = vec![" Algebra ", "Geometry", "Algebra", "  "];
        assert_eq!(normalize_topics(&topics), vec!["Algebra", "Geometry"]);

        let empty: Vec<String> = vec![];
        assert_eq!(normalize_topics(&empty), vec![DEFAULT_TOPIC]);
    }

    #[test]
    fn test_refinement_shifts_delay() {
        let now = Utc::now();
        let refined = apply_refinement(base(now, 85.0), refinement(2.0), now);

        assert!((refined.delay_days - 9.5).abs() < 1e-9);
        assert_eq!(refined.recommended_date, now + days_to_duration(9.5));
        assert!(refined.refined);
    }

    #[test]
    fn test_refinement_respects_floor() {
        let now = Utc::now();
        let refined = apply_refinement(base(now, 30.0), refinement(-10.0), now);

        assert_eq!(refined.delay_days, MIN_DELAY_DAYS);
        assert_eq!(refined.recommended_date, now + Duration::hours(6));
    }

    #[test]
    fn test_refinement_never_changes_priority_or_reason() {
        let now = Utc::now();
        let original = base(now, 65.0);
        let refined = apply_refinement(original.clone(), refinement(20.0), now);

        assert_eq!(refined.priority, original.priority);
        assert_eq!(refined.reason, original.reason);
    }

    #[test]
    fn test_refinement_overrides_non_empty_fields_only() {
        let now = Utc::now();
        let original = base(now, 75.0);

        let mut with_tips = refinement(0.0);
        with_tips.study_tips = vec!["Draw the leaf cross-section".into(), " ".into()];
        with_tips.focus_areas = vec!["Photosynthesis".into()];
        with_tips.learning_strategy = Some("Spaced retrieval practice".into());
        with_tips.estimated_improvement = Some("   ".into());

        let refined = apply_refinement(original.clone(), with_tips, now);
        assert_eq!(refined.study_tips, vec!["Draw the leaf cross-section"]);
        assert_eq!(refined.focus_areas, vec!["Photosynthesis"]);
        assert_eq!(
            refined.learning_strategy.as_deref(),
            Some("Spaced retrieval practice")
        );
        assert_eq!(refined.estimated_improvement, original.estimated_improvement);
    }

    #[test]
    fn test_malformed_refinement_is_ignored() {
        let now = Utc::now();
        let original = base(now, 72.0);

        let refined = apply_refinement(original.clone(), refinement(f64::NAN), now);
        assert_eq!(refined, original);

        let refined = apply_refinement(original.clone(), refinement(f64::INFINITY), now);
        assert_eq!(refined, original);
    }

    #[test]
    fn test_out_of_range_adjustment_is_ignored() {
        let now = Utc::now();
        let original = base(now, 75.0);

        let refined = apply_refinement(original.clone(), refinement(1.0e9), now);
        assert_eq!(refined, original);

        let refined = apply_refinement(original.clone(), refinement(-1.0e9), now);
        assert_eq!(refined, original);

        let refined = apply_refinement(original.clone(), refinement(MAX_ADJUSTMENT_DAYS), now);
        assert!(refined.refined);
        assert!((refined.delay_days - (original.delay_days + MAX_ADJUSTMENT_DAYS)).abs() < 1e-9);
    }

    #[test]
    fn test_checked_due_date() {
        let now = Utc::now();
        assert_eq!(checked_due_date(now, 0.25), Some(now + Duration::hours(6)));
        assert_eq!(checked_due_date(now, 1.0e12), None);
        assert_eq!(checked_due_date(now, f64::INFINITY), None);
        assert_eq!(checked_due_date(DateTime::<Utc>::MAX_UTC, 1.0), None);
    }

    #[test]
    fn test_refinement_rejects_unknown_fields() {
        let json = r#"{"timing_adjustment_days": 1.5, "priority": "low"}"#;
        assert!(serde_json::from_str::<Refinement>(json).is_err());

        let json = r#"{"timing_adjustment_days": -0.5, "study_tips": ["Revise"]}"#;
        let parsed: Refinement = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.timing_adjustment_days, -0.5);
        assert_eq!(parsed.study_tips, vec!["Revise"]);
    }
}
