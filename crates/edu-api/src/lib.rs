//! HTTP service for scheduled review tests: configuration, advisory
//! refinement, the review lifecycle and its axum routes.

pub mod advisor;
pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod review;
pub mod router;
pub mod state;
pub mod tracing;
pub mod validation;

pub use config::ApiConfig;
pub use state::ApiState;
