use std::sync::Arc;

use anyhow::Context;
use edu_db::{MemoryScheduledTestStore, PgScheduledTestStore, ScheduledTestStore};
use edu_srs::BandPolicy;

use crate::{
    ApiConfig,
    advisor::HttpAdvisor,
    cache::RefinementCache,
    config::Environment,
    review::{ReviewLifecycle, ReviewScheduler},
};

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct ApiState {
    /// Review lifecycle over the configured store and scheduler
    pub reviews: Arc<ReviewLifecycle>,
    /// Deployment environment the service runs in
    pub environment: Environment,
}

impl ApiState {
    /// State around an already built lifecycle
    pub fn new(reviews: ReviewLifecycle, environment: Environment) -> Self {
        Self {
            reviews: Arc::new(reviews),
            environment,
        }
    }

    /// Build the state from configuration: connect and migrate the database
    /// when one is configured, and wire the advisor when its URL is set.
    pub async fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn ScheduledTestStore> = match &config.database_url {
            Some(url) => {
                let pool = edu_db::create_pool(url, config.database_max_connections).await?;
                edu_db::ensure_db_and_migrate(url, &pool).await?;
                tracing::info!("Connected to PostgreSQL, migrations applied");
                Arc::new(PgScheduledTestStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, scheduled reviews are kept in memory");
                Arc::new(MemoryScheduledTestStore::new())
            }
        };

        let mut scheduler = ReviewScheduler::new(BandPolicy::default());

        if let Some(url) = &config.advisor_url {
            let cache =
                RefinementCache::new(config.advisor_cache_capacity, config.advisor_cache_ttl());
            let advisor = HttpAdvisor::new(
                url.clone(),
                config.advisor_api_key.clone(),
                config.advisor_timeout(),
                cache,
            )
            .context("failed to build advisor client")?;

            tracing::info!(?advisor, "Advisory refinement enabled");
            scheduler = scheduler.with_advisor(Arc::new(advisor), config.advisor_timeout());
        } else {
            tracing::info!("ADVISOR_URL not set, using base-band recommendations only");
        }

        Ok(Self::new(ReviewLifecycle::new(scheduler, store), config.env))
    }
}
