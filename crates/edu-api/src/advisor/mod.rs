//! Optional advisory refinement of review recommendations.
//!
//! An advisor looks at a scored attempt and the base-band delay and may suggest
//! a timing adjustment and better study tips. Any [`AdvisorError`] is handled
//! by the scheduler, which falls back to the base recommendation.

mod http;
mod prompt;

pub use http::HttpAdvisor;
pub use prompt::{build_prompt, parse_refinement, prompt_key};

use async_trait::async_trait;
use edu_srs::{Difficulty, Refinement, Subject};
use serde::Serialize;
use thiserror::Error;

/// Input of an advisory refinement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefinementRequest {
    pub subject: Subject,
    pub topics: Vec<String>,
    pub score: f64,
    pub difficulty: Difficulty,
    /// Delay proposed by the band policy, in days
    pub base_delay_days: f64,
}

/// Why a refinement is unavailable
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("advisor request timed out")]
    Timeout,
    #[error("advisor network error: {0}")]
    Network(String),
    #[error("advisor api error: status={status}")]
    Api { status: u16 },
    #[error("malformed advisor response: {0}")]
    Malformed(String),
}

impl AdvisorError {
    /// Short label used as a metrics tag
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Network(_) => "network",
            Self::Api { .. } => "api",
            Self::Malformed(_) => "malformed",
        }
    }

    /// Whether a second attempt may succeed; 4xx other than 429 is final
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status } => *status >= 500 || *status == 429,
            _ => true,
        }
    }
}

/// Source of advisory refinements
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Suggest a refinement of the base recommendation described by `request`
    async fn refine(&self, request: &RefinementRequest) -> Result<Refinement, AdvisorError>;
}
