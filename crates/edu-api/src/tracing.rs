//! Tracing and logging configuration for the review service
//!
//! Development gets pretty, human-readable output at DEBUG; production gets
//! flattened JSON at INFO for log aggregation. `RUST_LOG` overrides either
//! default (e.g. `RUST_LOG=edu_api=trace,tower_http=debug`).

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

const DEVELOPMENT_FILTER: &str = "debug,edu_api=debug,tower_http=debug,sqlx=warn,hyper=info";
const PRODUCTION_FILTER: &str = "info,edu_api=info,tower_http=info,sqlx=warn";

/// Default filter directives for an environment
pub const fn default_filter(env: &Environment) -> &'static str {
    match env {
        Environment::Development => DEVELOPMENT_FILTER,
        Environment::Production => PRODUCTION_FILTER,
    }
}

/// Install the global subscriber for `env`. Must be called once, before serving.
pub fn init_tracing(env: &Environment) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(env)));

    let layer = if env.is_development() {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .pretty()
            .with_filter(env_filter)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .flatten_event(true)
            .with_target(true)
            .with_filter(env_filter)
            .boxed()
    };

    tracing_subscriber::registry().with(layer).init();

    tracing::info!(environment = ?env, "Tracing initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_parse() {
        for env in [Environment::Development, Environment::Production] {
            assert!(EnvFilter::try_new(default_filter(&env)).is_ok());
        }
    }
}
