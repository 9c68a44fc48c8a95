use std::{fmt, time::Duration};

use serde::Deserialize;

/// Deployment environment, read from `ENV`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Service configuration, deserialized from environment variables by `envy`
/// (`PORT` maps to `port`, `ADVISOR_URL` to `advisor_url`, ...).
#[derive(Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Without a database URL the service keeps reviews in memory
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    /// Base URL of the advisory refinement service; refinement is off when unset
    #[serde(default)]
    pub advisor_url: Option<String>,
    #[serde(default)]
    pub advisor_api_key: Option<String>,
    /// Upper bound for one refinement, retry included
    #[serde(default = "default_advisor_timeout_ms")]
    pub advisor_timeout_ms: u64,
    #[serde(default = "default_advisor_cache_capacity")]
    pub advisor_cache_capacity: u64,
    #[serde(default = "default_advisor_cache_ttl_secs")]
    pub advisor_cache_ttl_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_advisor_timeout_ms() -> u64 {
    3000
}

const fn default_advisor_cache_capacity() -> u64 {
    256
}

const fn default_advisor_cache_ttl_secs() -> u64 {
    3600
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<Self>().map(Self::normalized)
    }

    /// Treat empty optional variables (`DATABASE_URL=`) as unset
    fn normalized(mut self) -> Self {
        self.database_url = self.database_url.filter(|s| !s.trim().is_empty());
        self.advisor_url = self.advisor_url.filter(|s| !s.trim().is_empty());
        self.advisor_api_key = self.advisor_api_key.filter(|s| !s.trim().is_empty());
        self
    }

    pub const fn advisor_timeout(&self) -> Duration {
        Duration::from_millis(self.advisor_timeout_ms)
    }

    pub const fn advisor_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.advisor_cache_ttl_secs)
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("env", &self.env)
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "***REDACTED***"),
            )
            .field("database_max_connections", &self.database_max_connections)
            .field("advisor_url", &self.advisor_url)
            .field(
                "advisor_api_key",
                &self.advisor_api_key.as_ref().map(|_| "***REDACTED***"),
            )
            .field("advisor_timeout_ms", &self.advisor_timeout_ms)
            .field("advisor_cache_capacity", &self.advisor_cache_capacity)
            .field("advisor_cache_ttl_secs", &self.advisor_cache_ttl_secs)
            .finish()
    }
}
