use std::{fmt, time::Duration};

use async_trait::async_trait;
use edu_srs::Refinement;
use serde::{Deserialize, Serialize};

use super::{Advisor, AdvisorError, RefinementRequest, build_prompt, parse_refinement, prompt_key};
use crate::cache::RefinementCache;

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    text: String,
}

/// Advisor backed by a text-generation HTTP endpoint.
///
/// Posts `{"prompt": ...}` to the configured URL and expects `{"text": ...}`
/// back. Successful refinements are cached by prompt hash.
pub struct HttpAdvisor {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    cache: RefinementCache,
}

impl HttpAdvisor {
    /// Client for `url`; each HTTP call is bounded by `request_timeout`
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        request_timeout: Duration,
        cache: RefinementCache,
    ) -> Result<Self, AdvisorError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AdvisorError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            api_key,
            cache,
        })
    }

    /// Cache of successful refinements
    pub const fn cache(&self) -> &RefinementCache {
        &self.cache
    }

    async fn generate(&self, prompt: &str) -> Result<String, AdvisorError> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&GenerationRequest { prompt });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::Api {
                status: status.as_u16(),
            });
        }

        let body: GenerationResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::Malformed(e.to_string()))?;

        Ok(body.text)
    }
}

impl fmt::Debug for HttpAdvisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpAdvisor")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***REDACTED***"))
            .field("cache", &self.cache)
            .finish()
    }
}

fn map_reqwest_error(err: reqwest::Error) -> AdvisorError {
    if err.is_timeout() {
        AdvisorError::Timeout
    } else {
        AdvisorError::Network(err.to_string())
    }
}

#[async_trait]
impl Advisor for HttpAdvisor {
    async fn refine(&self, request: &RefinementRequest) -> Result<Refinement, AdvisorError> {
        let prompt = build_prompt(request);
        let key = prompt_key(&prompt);

        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let text = self.generate(&prompt).await?;
        let refinement = parse_refinement(&text)?;

        self.cache.insert(key, refinement.clone()).await;
        Ok(refinement)
    }
}
