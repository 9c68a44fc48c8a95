use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing one of the enumerated review attributes fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    /// Which attribute was being parsed (e.g. "subject")
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Curriculum subject a practice test or review belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    /// Mathematics
    Math,
    /// Physics
    Physics,
    /// Chemistry
    Chemistry,
    /// Biology
    Biology,
    /// English language and literature
    English,
    /// History
    History,
    /// Geography
    Geography,
}

impl Subject {
    /// All subjects, in display order
    pub const ALL: [Self; 7] = [
        Self::Math,
        Self::Physics,
        Self::Chemistry,
        Self::Biology,
        Self::English,
        Self::History,
        Self::Geography,
    ];

    /// Lowercase wire name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Math => "math",
            Self::Physics => "physics",
            Self::Chemistry => "chemistry",
            Self::Biology => "biology",
            Self::English => "english",
            Self::History => "history",
            Self::Geography => "geography",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|subject| subject.as_str() == normalized)
            .ok_or_else(|| ParseEnumError::new("subject", s))
    }
}

/// Difficulty level of the questions in a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Easy questions only
    Easy,
    /// Medium questions only
    Medium,
    /// Hard questions only
    Hard,
    /// A blend of levels
    Mixed,
}

impl Difficulty {
    /// Lowercase wire name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "mixed" => Ok(Self::Mixed),
            _ => Err(ParseEnumError::new("difficulty", s)),
        }
    }
}

/// How urgently a review should be taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Maintenance review
    Low,
    /// Consolidation review
    Medium,
    /// Remediation review
    High,
}

impl Priority {
    /// Lowercase wire name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseEnumError::new("priority", s)),
        }
    }
}
