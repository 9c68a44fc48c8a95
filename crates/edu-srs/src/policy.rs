//! Score-band review policy.
//!
//! A practice score is mapped onto one of five bands. Each band owns a
//! half-open score interval (lower bound inclusive) and decides the base delay
//! until the next review, its priority, the rationale shown to the learner and
//! the default study tips.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Difficulty, Priority, ScheduleRecommendation, Subject, days_to_duration, normalize_score,
    topics_label,
};

/// The five score bands, from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    /// [90, 100]
    Mastery,
    /// [80, 90)
    Good,
    /// [70, 80)
    Adequate,
    /// [60, 70)
    BelowExpectations,
    /// [0, 60)
    NeedsAttention,
}

impl ScoreBand {
    /// Priority is a function of the band alone.
    pub const fn priority(self) -> Priority {
        match self {
            Self::Mastery => Priority::Low,
            Self::Good | Self::Adequate => Priority::Medium,
            Self::BelowExpectations | Self::NeedsAttention => Priority::High,
        }
    }

    /// Short rationale keyword for the band
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Mastery => "mastery",
            Self::Good => "good performance",
            Self::Adequate => "adequate",
            Self::BelowExpectations => "below expectations",
            Self::NeedsAttention => "needs immediate attention",
        }
    }

    pub const fn estimated_improvement(self) -> &'static str {
        match self {
            Self::Mastery => "Maintain 90%+ with periodic review",
            Self::Good => "Expected to reach 90%+ after one focused review",
            Self::Adequate => "Expected improvement of 10-15% after targeted review",
            Self::BelowExpectations => "Expected improvement of 15-20% with regular practice",
            Self::NeedsAttention => "Expected improvement of 20-30% after revisiting fundamentals",
        }
    }

    fn reason(self, topics: &str, subject: Subject, score: f64) -> String {
        match self {
            Self::Mastery => format!(
                "Excellent mastery of {topics} in {subject} ({score:.1}%). A longer interval will reinforce long-term retention."
            ),
            Self::Good => format!(
                "Good performance on {topics} in {subject} ({score:.1}%). A review within the next week will consolidate it."
            ),
            Self::Adequate => format!(
                "Adequate understanding of {topics} in {subject} ({score:.1}%). Reviewing in a few days will close the remaining gaps."
            ),
            Self::BelowExpectations => format!(
                "Performance on {topics} in {subject} is below expectations ({score:.1}%). Review soon to strengthen weak areas."
            ),
            Self::NeedsAttention => format!(
                "{topics} in {subject} needs immediate attention ({score:.1}%). Revisit the fundamentals within the next 12 hours."
            ),
        }
    }

    fn study_tips(self) -> Vec<String> {
        let tips: &[&str] = match self {
            Self::Mastery | Self::Good => &[
                "Do a short mixed-question set to keep the material fresh",
                "Try explaining the key ideas to someone else",
                "Attempt harder or applied problems on the same topics",
            ],
            Self::Adequate | Self::BelowExpectations => &[
                "Re-read your notes on the questions you missed",
                "Work through solved examples before attempting new ones",
                "Write a one-page summary of each topic",
            ],
            Self::NeedsAttention => &[
                "Start again from the core definitions and basic concepts",
                "Practise with easy questions before moving on",
                "Ask a teacher or tutor to go over the parts you found confusing",
            ],
        };

        tips.iter().map(|tip| (*tip).to_string()).collect()
    }
}

/// Delay rule for a scored band: `base_days + (score - floor) * slope`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandRule {
    /// Inclusive lower score bound of the band
    pub floor: f64,
    /// Delay at the lower bound, in days
    pub base_days: f64,
    /// Additional days per score point above the floor
    pub slope: f64,
}

impl BandRule {
    pub const fn new(floor: f64, base_days: f64, slope: f64) -> Self {
        Self {
            floor,
            base_days,
            slope,
        }
    }

    fn delay_for(&self, score: f64) -> f64 {
        self.base_days + (score - self.floor) * self.slope
    }
}

/// Tunable band constants. [`BandPolicy::default`] holds the production values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPolicy {
    pub mastery: BandRule,
    pub good: BandRule,
    pub adequate: BandRule,
    pub below_expectations: BandRule,
    /// Fixed delay below the lowest rule's floor
    pub needs_attention_days: f64,
}

impl Default for BandPolicy {
    fn default() -> Self {
        Self {
            mastery: BandRule::new(90.0, 10.0, 0.4),
            good: BandRule::new(80.0, 5.0, 0.5),
            adequate: BandRule::new(70.0, 3.0, 0.2),
            below_expectations: BandRule::new(60.0, 1.0, 0.2),
            needs_attention_days: 0.5,
        }
    }
}

impl BandPolicy {
    /// Select the band owning `score`. Bounds are checked from the top down, so
    /// a score equal to a floor belongs to the upper band.
    pub fn band_for(&self, score: f64) -> ScoreBand {
        let score = normalize_score(score);

        if score >= self.mastery.floor {
            ScoreBand::Mastery
        } else if score >= self.good.floor {
            ScoreBand::Good
        } else if score >= self.adequate.floor {
            ScoreBand::Adequate
        } else if score >= self.below_expectations.floor {
            ScoreBand::BelowExpectations
        } else {
            ScoreBand::NeedsAttention
        }
    }

    /// Base delay in days before any refinement.
    pub fn base_delay_days(&self, score: f64) -> f64 {
        let score = normalize_score(score);

        match self.band_for(score) {
            ScoreBand::Mastery => self.mastery.delay_for(score),
            ScoreBand::Good => self.good.delay_for(score),
            ScoreBand::Adequate => self.adequate.delay_for(score),
            ScoreBand::BelowExpectations => self.below_expectations.delay_for(score),
            ScoreBand::NeedsAttention => self.needs_attention_days,
        }
    }

    /// Build the base-band recommendation for an attempt scored at `now`.
    pub fn recommend_at(
        &self,
        score: f64,
        subject: Subject,
        topics: &[String],
        difficulty: Difficulty,
        now: DateTime<Utc>,
    ) -> ScheduleRecommendation {
        let score = normalize_score(score);
        let band = self.band_for(score);
        let delay_days = self.base_delay_days(score);

        let mut study_tips = band.study_tips();
        if difficulty == Difficulty::Hard && band != ScoreBand::Mastery {
            study_tips.push("Mix in some medium-difficulty questions to rebuild confidence".into());
        }

        ScheduleRecommendation {
            recommended_date: now + days_to_duration(delay_days),
            priority: band.priority(),
            reason: band.reason(&topics_label(topics), subject, score),
            study_tips,
            estimated_improvement: band.estimated_improvement().to_string(),
            delay_days,
            focus_areas: Vec::new(),
            learning_strategy: None,
            refined: false,
        }
    }

    /// Same as [`BandPolicy::recommend_at`] using the current time.
    pub fn recommend(
        &self,
        score: f64,
        subject: Subject,
        topics: &[String],
        difficulty: Difficulty,
    ) -> ScheduleRecommendation {
        self.recommend_at(score, subject, topics, difficulty, Utc::now())
    }
}
